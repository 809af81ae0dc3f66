//! Link adapter for `embedded-hal-nb` serial drivers
//!
//! The nb serial traits have no readiness probe: `read` and `write` either
//! complete or return `WouldBlock`. [`NbLink`] bridges that to the polled
//! link primitives with a one-byte lookahead on receive. On send it always
//! reports ready and lets the write itself decide: a `WouldBlock` (busy
//! transmitter or deasserted CTS) is reported as a refused byte, which stays
//! buffered in the relay and uncounted until a later write succeeds.

use embedded_hal_nb::nb;
use embedded_hal_nb::serial::{Error as _, ErrorKind, Read, Write};
use relaybuf_core::{ByteSink, ByteSource, Direction, RelayError};

use crate::error::{FaultLog, UartErrorSupport};

#[cfg(feature = "defmt")]
use defmt::warn;

#[cfg(all(not(feature = "defmt"), feature = "tracing"))]
use tracing::warn;

#[cfg(all(not(feature = "defmt"), not(feature = "tracing")))]
macro_rules! warn { ($($arg:tt)*) => { let _ = ($($arg)*,); }; }

/// [`SerialLink`](relaybuf_core::SerialLink) over an `embedded-hal-nb` UART
#[derive(Debug)]
pub struct NbLink<T> {
    serial: T,
    lookahead: Option<u8>,
    faults: FaultLog,
}

impl<T> NbLink<T> {
    pub fn new(serial: T) -> Self {
        Self {
            serial,
            lookahead: None,
            faults: FaultLog::default(),
        }
    }

    pub fn fault_count(&self) -> u32 {
        self.faults.count()
    }

    pub fn last_fault(&self) -> Option<&RelayError> {
        self.faults.last()
    }

    pub fn inner(&self) -> &T {
        &self.serial
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.serial
    }

    pub fn into_inner(self) -> T {
        self.serial
    }

    fn fault(&mut self, direction: Direction, kind: ErrorKind) {
        let error = RelayError::from_serial_hal_error(direction, kind);
        if let RelayError::LinkFault { error_code, .. } = &error {
            warn!("{} link fault, code {}", direction, error_code);
        }
        self.faults.record(error);
    }
}

impl<T: Read<u8>> ByteSource for NbLink<T> {
    fn receive_available(&mut self) -> bool {
        if self.lookahead.is_some() {
            return true;
        }

        match self.serial.read() {
            Ok(byte) => {
                self.lookahead = Some(byte);
                true
            }
            Err(nb::Error::WouldBlock) => false,
            Err(nb::Error::Other(e)) => {
                self.fault(Direction::Inbound, e.kind());
                false
            }
        }
    }

    fn receive_byte(&mut self) -> u8 {
        self.lookahead.take().unwrap_or_default()
    }
}

impl<T: Write<u8>> ByteSink for NbLink<T> {
    /// Always true; nb drivers can only answer through `write`
    fn send_ready(&mut self) -> bool {
        true
    }

    fn send_byte(&mut self, byte: u8) -> bool {
        match self.serial.write(byte) {
            Ok(()) => true,
            Err(nb::Error::WouldBlock) => false,
            Err(nb::Error::Other(e)) => {
                self.fault(Direction::Outbound, e.kind());
                false
            }
        }
    }
}
