//! UART error conversions
//!
//! Maps the error kinds reported by `embedded-hal-nb` serial drivers and
//! `embedded-io` UART drivers onto [`RelayError::LinkFault`], keeping a
//! peripheral-specific code in the UART range (0x6200-0x62FF) so faults stay
//! distinguishable in logs without carrying strings on the MCU.

use embedded_hal_nb::serial;
use embedded_io as io;
use relaybuf_core::{Direction, RelayError};

// UART Error Code Base Value
pub const UART_ERROR_BASE: u16 = 0x6200;

// UART-specific error codes
pub const UART_OVERRUN: u8 = 0x01;
pub const UART_FRAME_FORMAT: u8 = 0x02;
pub const UART_PARITY: u8 = 0x03;
pub const UART_NOISE: u8 = 0x04;
pub const UART_TIMEOUT: u8 = 0x05;
pub const UART_DISCONNECTED: u8 = 0x06;
pub const UART_INTERRUPTED: u8 = 0x07;
pub const UART_UNKNOWN_ERROR: u8 = 0xFF;

/// UART fault constructors for [`RelayError`]
///
/// Kept out of the core crate so it does not depend on any HAL.
pub trait UartErrorSupport {
    /// Creates a link fault with a UART error code (0x6200-0x62FF)
    fn from_uart_error(direction: Direction, code: u8) -> Self;

    /// Converts an `embedded-hal-nb` serial error kind
    fn from_serial_hal_error(direction: Direction, error: serial::ErrorKind) -> Self;

    /// Converts an `embedded-io` error kind
    fn from_io_error(direction: Direction, error: io::ErrorKind) -> Self;
}

impl UartErrorSupport for RelayError {
    fn from_uart_error(direction: Direction, code: u8) -> Self {
        RelayError::link_fault(direction, UART_ERROR_BASE | (code as u16))
    }

    fn from_serial_hal_error(direction: Direction, error: serial::ErrorKind) -> Self {
        let code = match error {
            serial::ErrorKind::Overrun => UART_OVERRUN,
            serial::ErrorKind::FrameFormat => UART_FRAME_FORMAT,
            serial::ErrorKind::Parity => UART_PARITY,
            serial::ErrorKind::Noise => UART_NOISE,
            _ => UART_UNKNOWN_ERROR, // Other and future kinds
        };
        Self::from_uart_error(direction, code)
    }

    fn from_io_error(direction: Direction, error: io::ErrorKind) -> Self {
        let code = match error {
            io::ErrorKind::InvalidData => UART_FRAME_FORMAT,
            io::ErrorKind::TimedOut => UART_TIMEOUT,
            io::ErrorKind::NotConnected
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted => UART_DISCONNECTED,
            io::ErrorKind::Interrupted => UART_INTERRUPTED,
            _ => UART_UNKNOWN_ERROR,
        };
        Self::from_uart_error(direction, code)
    }
}

/// Fault bookkeeping shared by the link adapters
#[derive(Debug, Clone, Default)]
pub(crate) struct FaultLog {
    count: u32,
    last: Option<RelayError>,
}

impl FaultLog {
    pub(crate) fn record(&mut self, error: RelayError) {
        self.count = self.count.wrapping_add(1);
        self.last = Some(error);
    }

    pub(crate) fn count(&self) -> u32 {
        self.count
    }

    pub(crate) fn last(&self) -> Option<&RelayError> {
        self.last.as_ref()
    }
}
