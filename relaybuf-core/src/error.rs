//! Error handling for relay operations
//!
//! A single error type covers every fallible operation in the relay: buffer
//! construction, line configuration validation and link faults reported by
//! hardware adapters. The steady-state drive loop itself never returns an
//! error; overflow and underflow are normal conditions handled in place.
//!
//! # Platform Compatibility
//!
//! - **MCU/Embedded** (`no_std`): compact variants with no heap usage. Display
//!   renders `"Error 0x4001: Invalid capacity"`, and `defmt::Format` is
//!   available with the `defmt` feature.
//! - **Host** (`std`): rich messages derived with `thiserror`, plus
//!   [`RelayError::with_context`] for annotating errors at call sites.
//!
//! # Error Code System
//!
//! - **Configuration** (0x4000-0x4FFF): buffer capacity and line settings
//! - **Hardware** (0x6000-0x6FFF): faults reported by the UART peripheral
//!
//! ```rust
//! use relaybuf_core::buffer::{RelayCfg, SlotMode};
//!
//! let err = RelayCfg::new(1).validate().unwrap_err();
//! assert_eq!(err.error_code(), 0x4001);
//! assert_eq!(err.error_category(), 0x4000);
//! assert!(err.is_config_error());
//! ```

#[cfg(feature = "std")]
use thiserror::Error;

use crate::buffer::SlotMode;
use crate::link::Direction;

/// Unified error type for relay operations
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "std", derive(Error))]
pub enum RelayError {
    /// Buffer capacity leaves no usable slot for the selected slot mode
    #[cfg_attr(
        feature = "std",
        error("Invalid relay capacity {capacity} for {slot_mode} slot mode")
    )]
    InvalidCapacity { capacity: usize, slot_mode: SlotMode },

    /// Line configuration the relay cannot operate on
    ///
    /// The relay needs 8N1 framing with CTS-only flow control: the inbound
    /// direction must never be throttled and the outbound direction must
    /// respect the receiver's flow-control signal.
    #[cfg_attr(feature = "std", error("Unsupported line configuration: {description}"))]
    UnsupportedLine {
        parameter: u8, // LINE_PARAM_* constants
        #[cfg(feature = "std")]
        description: String,
        #[cfg(not(feature = "std"))]
        _description: (),
    },

    /// Fault reported by the serial peripheral behind a link
    #[cfg_attr(
        feature = "std",
        error("Link fault on {direction} link (0x{error_code:04X}): {description}")
    )]
    LinkFault {
        direction: Direction,
        error_code: u16,
        #[cfg(feature = "std")]
        description: String,
        #[cfg(not(feature = "std"))]
        _description: (),
    },
}

#[cfg(not(feature = "std"))]
impl core::fmt::Display for RelayError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let message = match self {
            RelayError::InvalidCapacity { .. } => "Invalid capacity",
            RelayError::UnsupportedLine { .. } => "Unsupported line configuration",
            RelayError::LinkFault { .. } => "Link fault",
        };
        write!(f, "Error 0x{:04X}: {}", self.error_code(), message)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for RelayError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            RelayError::InvalidCapacity {
                capacity,
                slot_mode,
            } => defmt::write!(
                f,
                "InvalidCapacity(capacity={}, slot_mode={})",
                capacity,
                slot_mode
            ),
            RelayError::UnsupportedLine { parameter, .. } => {
                defmt::write!(f, "UnsupportedLine(parameter={})", parameter)
            }
            RelayError::LinkFault {
                direction,
                error_code,
                ..
            } => defmt::write!(
                f,
                "LinkFault(direction={}, code={=u16:#x})",
                direction,
                error_code
            ),
        }
    }
}

impl RelayError {
    // Parameter codes for UnsupportedLine
    pub const LINE_PARAM_BAUD_RATE: u8 = 0;
    pub const LINE_PARAM_DATA_BITS: u8 = 1;
    pub const LINE_PARAM_STOP_BITS: u8 = 2;
    pub const LINE_PARAM_PARITY: u8 = 3;
    pub const LINE_PARAM_FLOW_CONTROL: u8 = 4;

    /// Creates a capacity error for the given slot mode
    pub const fn invalid_capacity(capacity: usize, slot_mode: SlotMode) -> Self {
        RelayError::InvalidCapacity {
            capacity,
            slot_mode,
        }
    }

    /// Creates a line configuration error
    ///
    /// The description is kept in std builds and discarded on embedded targets.
    pub fn unsupported_line(parameter: u8, description: &str) -> Self {
        #[cfg(not(feature = "std"))]
        let _ = description;

        RelayError::UnsupportedLine {
            parameter,
            #[cfg(feature = "std")]
            description: description.to_string(),
            #[cfg(not(feature = "std"))]
            _description: (),
        }
    }

    /// Creates a link fault for a peripheral-specific error code
    pub fn link_fault(direction: Direction, error_code: u16) -> Self {
        RelayError::LinkFault {
            direction,
            error_code,
            #[cfg(feature = "std")]
            description: String::new(),
            #[cfg(not(feature = "std"))]
            _description: (),
        }
    }

    /// Returns true for capacity and line configuration errors
    pub fn is_config_error(&self) -> bool {
        self.error_category() == 0x4000
    }

    /// Returns true if this error was reported by a serial peripheral
    pub fn is_link_fault(&self) -> bool {
        matches!(self, RelayError::LinkFault { .. })
    }

    /// Returns a numeric error code
    ///
    /// - **Configuration**: 0x4000-0x4FFF
    /// - **Hardware**: 0x6000-0x6FFF
    pub const fn error_code(&self) -> u32 {
        match self {
            RelayError::InvalidCapacity { .. } => 0x4001,
            RelayError::UnsupportedLine { .. } => 0x4002,
            RelayError::LinkFault { .. } => 0x6001,
        }
    }

    /// Returns the error category (upper nibble of the error code)
    pub const fn error_category(&self) -> u32 {
        self.error_code() & 0xF000
    }

    /// Prepends context to the error description (std only)
    ///
    /// ```rust
    /// # #[cfg(feature = "std")]
    /// # {
    /// use relaybuf_core::{Direction, RelayError};
    ///
    /// let err = RelayError::link_fault(Direction::Inbound, 0x6201)
    ///     .with_context("UART0 overrun");
    /// assert!(err.to_string().ends_with("UART0 overrun"));
    /// # }
    /// ```
    #[cfg(feature = "std")]
    pub fn with_context<S: Into<String>>(self, context: S) -> Self {
        fn prepend(existing: String, context: String) -> String {
            if existing.is_empty() {
                context
            } else {
                format!("{context}: {existing}")
            }
        }

        match self {
            RelayError::UnsupportedLine {
                parameter,
                description,
            } => RelayError::UnsupportedLine {
                parameter,
                description: prepend(description, context.into()),
            },
            RelayError::LinkFault {
                direction,
                error_code,
                description,
            } => RelayError::LinkFault {
                direction,
                error_code,
                description: prepend(description, context.into()),
            },
            other @ RelayError::InvalidCapacity { .. } => other,
        }
    }
}

/// Result type alias for relay operations
pub type RelayResult<T> = Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_categories() {
        let capacity = RelayError::invalid_capacity(1, SlotMode::ReserveOne);
        assert_eq!(capacity.error_code(), 0x4001);
        assert_eq!(capacity.error_category(), 0x4000);
        assert!(capacity.is_config_error());
        assert!(!capacity.is_link_fault());

        let line = RelayError::unsupported_line(RelayError::LINE_PARAM_PARITY, "parity must be none");
        assert_eq!(line.error_code(), 0x4002);
        assert!(line.is_config_error());

        let fault = RelayError::link_fault(Direction::Outbound, 0x6204);
        assert_eq!(fault.error_code(), 0x6001);
        assert_eq!(fault.error_category(), 0x6000);
        assert!(fault.is_link_fault());
        assert!(!fault.is_config_error());
    }

    #[test]
    fn test_link_fault_keeps_peripheral_code() {
        if let RelayError::LinkFault {
            direction,
            error_code,
            ..
        } = RelayError::link_fault(Direction::Inbound, 0x6201)
        {
            assert_eq!(direction, Direction::Inbound);
            assert_eq!(error_code, 0x6201);
        } else {
            panic!("Expected LinkFault variant");
        }
    }

    #[test]
    #[cfg(feature = "std")]
    fn test_std_display_messages() {
        let capacity = RelayError::invalid_capacity(0, SlotMode::Counted);
        assert_eq!(
            capacity.to_string(),
            "Invalid relay capacity 0 for counted slot mode"
        );

        let line = RelayError::unsupported_line(
            RelayError::LINE_PARAM_STOP_BITS,
            "expected 1 stop bit, got 2",
        );
        assert_eq!(
            line.to_string(),
            "Unsupported line configuration: expected 1 stop bit, got 2"
        );

        let fault = RelayError::link_fault(Direction::Outbound, 0x6201);
        assert_eq!(fault.to_string(), "Link fault on outbound link (0x6201): ");
    }

    #[test]
    #[cfg(feature = "std")]
    fn test_with_context_chains() {
        let err = RelayError::link_fault(Direction::Inbound, 0x6202)
            .with_context("framing error")
            .with_context("UART0");
        assert_eq!(
            err.to_string(),
            "Link fault on inbound link (0x6202): UART0: framing error"
        );

        // Capacity errors carry no description and are returned unchanged
        let capacity = RelayError::invalid_capacity(1, SlotMode::ReserveOne);
        assert_eq!(capacity.clone().with_context("ignored"), capacity);
    }

    #[test]
    #[cfg(not(feature = "std"))]
    fn test_compact_display() {
        use alloc::string::ToString;

        let capacity = RelayError::invalid_capacity(1, SlotMode::ReserveOne);
        assert_eq!(capacity.to_string(), "Error 0x4001: Invalid capacity");
    }
}
