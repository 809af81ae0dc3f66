//! Serial line configuration
//!
//! The relay does not configure hardware itself, but it has firm expectations
//! about how both links are set up: 8 data bits, 1 stop bit, no parity, and
//! hardware flow control only on the transmit gating direction (CTS). The
//! inbound direction is never throttled, so RTS must stay unused.
//!
//! [`LineConfig`] records those settings so adapters can validate what they
//! were given and so the buffer can be sized against the line rate.

use core::fmt;

use crate::{RelayError, RelayResult};

/// Default line rate in baud
pub const DEFAULT_BAUD_RATE: u32 = 38_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl DataBits {
    pub const fn bits(self) -> u32 {
        match self {
            DataBits::Five => 5,
            DataBits::Six => 6,
            DataBits::Seven => 7,
            DataBits::Eight => 8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}

impl StopBits {
    pub const fn bits(self) -> u32 {
        match self {
            StopBits::One => 1,
            StopBits::Two => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Hardware flow control lines in use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowControl {
    /// No hardware handshake
    None,
    /// Transmitter waits for CTS; RTS is not driven
    Cts,
    /// Full RTS/CTS handshake in both directions
    RtsCts,
}

/// Line settings shared by the inbound and outbound links
///
/// # Examples
/// ```rust
/// use relaybuf_core::LineConfig;
///
/// let line = LineConfig::default();
/// assert!(line.validate().is_ok());
/// assert_eq!(line.bytes_per_second(), 3_840);
///
/// // A 10 KiB buffer rides out about 2.6 s of receiver stall at 38400 baud
/// assert_eq!(line.fill_time_ms(10 * 1024 - 1), 2_666);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LineConfig {
    pub baud_rate: u32,
    pub data_bits: DataBits,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
}

impl LineConfig {
    /// 8N1 with CTS-only flow control at `baud_rate`
    pub const fn new(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: DataBits::Eight,
            stop_bits: StopBits::One,
            parity: Parity::None,
            flow_control: FlowControl::Cts,
        }
    }

    /// Checks the settings against what the relay can operate on
    ///
    /// # Errors
    /// [`RelayError::UnsupportedLine`] naming the first offending parameter.
    /// Non-8-bit framing would break byte transparency, parity and 2 stop
    /// bits are not produced by the reference line setup, and RTS would
    /// throttle the inbound side.
    pub fn validate(&self) -> RelayResult<()> {
        if self.baud_rate == 0 {
            return Err(RelayError::unsupported_line(
                RelayError::LINE_PARAM_BAUD_RATE,
                "baud rate must be non-zero",
            ));
        }
        if self.data_bits != DataBits::Eight {
            return Err(RelayError::unsupported_line(
                RelayError::LINE_PARAM_DATA_BITS,
                "8 data bits required for byte-transparent relay",
            ));
        }
        if self.stop_bits != StopBits::One {
            return Err(RelayError::unsupported_line(
                RelayError::LINE_PARAM_STOP_BITS,
                "1 stop bit required",
            ));
        }
        if self.parity != Parity::None {
            return Err(RelayError::unsupported_line(
                RelayError::LINE_PARAM_PARITY,
                "parity must be none",
            ));
        }
        if self.flow_control != FlowControl::Cts {
            return Err(RelayError::unsupported_line(
                RelayError::LINE_PARAM_FLOW_CONTROL,
                "flow control must be CTS only; inbound is never throttled",
            ));
        }
        Ok(())
    }

    /// Line bits per character: start + data + parity + stop
    pub const fn bits_per_char(&self) -> u32 {
        let parity = match self.parity {
            Parity::None => 0,
            Parity::Even | Parity::Odd => 1,
        };
        1 + self.data_bits.bits() + parity + self.stop_bits.bits()
    }

    /// Maximum character rate the line can deliver
    pub const fn bytes_per_second(&self) -> u32 {
        self.baud_rate / self.bits_per_char()
    }

    /// Time for a buffer holding `usable` bytes to fill at full inbound rate
    /// while the outbound side is stalled
    ///
    /// Returns `u32::MAX` when the line rate rounds down to zero.
    pub fn fill_time_ms(&self, usable: usize) -> u32 {
        let bps = self.bytes_per_second() as u64;
        if bps == 0 {
            return u32::MAX;
        }
        let ms = (usable as u64).saturating_mul(1000) / bps;
        u32::try_from(ms).unwrap_or(u32::MAX)
    }
}

impl Default for LineConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BAUD_RATE)
    }
}

impl fmt::Display for LineConfig {
    /// Renders the conventional short form, e.g. `38400 8N1 cts`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parity = match self.parity {
            Parity::None => 'N',
            Parity::Even => 'E',
            Parity::Odd => 'O',
        };
        let flow = match self.flow_control {
            FlowControl::None => "none",
            FlowControl::Cts => "cts",
            FlowControl::RtsCts => "rts/cts",
        };
        write!(
            f,
            "{} {}{}{} {}",
            self.baud_rate,
            self.data_bits.bits(),
            parity,
            self.stop_bits.bits(),
            flow
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_line_is_supported() {
        let line = LineConfig::default();
        assert_eq!(line.baud_rate, 38_400);
        assert_eq!(line.bits_per_char(), 10);
        assert!(line.validate().is_ok());
    }

    #[test]
    fn test_rejects_each_unsupported_parameter() {
        let cases = [
            (
                LineConfig::new(0),
                RelayError::LINE_PARAM_BAUD_RATE,
            ),
            (
                LineConfig {
                    data_bits: DataBits::Seven,
                    ..LineConfig::default()
                },
                RelayError::LINE_PARAM_DATA_BITS,
            ),
            (
                LineConfig {
                    stop_bits: StopBits::Two,
                    ..LineConfig::default()
                },
                RelayError::LINE_PARAM_STOP_BITS,
            ),
            (
                LineConfig {
                    parity: Parity::Even,
                    ..LineConfig::default()
                },
                RelayError::LINE_PARAM_PARITY,
            ),
            (
                LineConfig {
                    flow_control: FlowControl::RtsCts,
                    ..LineConfig::default()
                },
                RelayError::LINE_PARAM_FLOW_CONTROL,
            ),
        ];

        for (line, expected) in cases {
            match line.validate() {
                Err(RelayError::UnsupportedLine { parameter, .. }) => {
                    assert_eq!(parameter, expected)
                }
                other => panic!("Expected UnsupportedLine, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_rate_accounts_for_framing() {
        let framed = LineConfig {
            parity: Parity::Odd,
            stop_bits: StopBits::Two,
            ..LineConfig::new(115_200)
        };
        assert_eq!(framed.bits_per_char(), 12);
        assert_eq!(framed.bytes_per_second(), 9_600);
    }

    #[test]
    fn test_fill_time() {
        let line = LineConfig::new(9_600);
        assert_eq!(line.bytes_per_second(), 960);
        assert_eq!(line.fill_time_ms(960), 1_000);
        assert_eq!(line.fill_time_ms(0), 0);

        // Too slow to move a single character per second
        assert_eq!(LineConfig::new(5).fill_time_ms(100), u32::MAX);
    }

    #[test]
    #[cfg(feature = "std")]
    fn test_display_short_form() {
        assert_eq!(LineConfig::default().to_string(), "38400 8N1 cts");
        let line = LineConfig {
            parity: Parity::Even,
            flow_control: FlowControl::None,
            ..LineConfig::new(9_600)
        };
        assert_eq!(line.to_string(), "9600 8E1 none");
    }
}
