//! Link adapter for `embedded-io` UART drivers
//!
//! Wraps any driver implementing the blocking `embedded-io` traits together
//! with their readiness probes (`ReadReady`, `WriteReady`), which is what
//! Embassy HAL UARTs provide in blocking mode. Readiness is probed before
//! every transfer so the relay never blocks.
//!
//! The byte is read inside [`receive_available`](ByteSource::receive_available)
//! and held until [`receive_byte`](ByteSource::receive_byte), because that is
//! the only point where a read error can still be reported as "nothing
//! available". Writes are only issued after `write_ready()` said so; a write
//! the driver still refuses is reported back and the byte stays buffered in
//! the relay.

use embedded_io::{Error as _, Read, ReadReady, Write, WriteReady};
use relaybuf_core::{ByteSink, ByteSource, Direction, RelayError};

use crate::error::{FaultLog, UartErrorSupport};

#[cfg(feature = "defmt")]
use defmt::warn;

#[cfg(all(not(feature = "defmt"), feature = "tracing"))]
use tracing::warn;

#[cfg(all(not(feature = "defmt"), not(feature = "tracing")))]
macro_rules! warn { ($($arg:tt)*) => { let _ = ($($arg)*,); }; }

/// [`SerialLink`](relaybuf_core::SerialLink) over an `embedded-io` UART
///
/// # Example
/// ```rust,ignore
/// let uart = embassy_rp::uart::Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, config);
/// let link = IoLink::new(uart);
/// let mut relay = Relay::new(link, queue);
/// ```
#[derive(Debug)]
pub struct IoLink<T> {
    io: T,
    lookahead: Option<u8>,
    faults: FaultLog,
}

impl<T> IoLink<T> {
    pub fn new(io: T) -> Self {
        Self {
            io,
            lookahead: None,
            faults: FaultLog::default(),
        }
    }

    /// Number of driver errors seen since construction
    pub fn fault_count(&self) -> u32 {
        self.faults.count()
    }

    /// Most recent driver error
    pub fn last_fault(&self) -> Option<&RelayError> {
        self.faults.last()
    }

    pub fn inner(&self) -> &T {
        &self.io
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.io
    }

    /// Returns the driver
    ///
    /// A byte already read but not yet taken by the relay is discarded.
    pub fn into_inner(self) -> T {
        self.io
    }

    fn fault(&mut self, direction: Direction, kind: embedded_io::ErrorKind) {
        let error = RelayError::from_io_error(direction, kind);
        if let RelayError::LinkFault { error_code, .. } = &error {
            warn!("{} link fault, code {}", direction, error_code);
        }
        self.faults.record(error);
    }
}

impl<T: Read + ReadReady> ByteSource for IoLink<T> {
    fn receive_available(&mut self) -> bool {
        if self.lookahead.is_some() {
            return true;
        }

        match self.io.read_ready() {
            Ok(true) => {}
            Ok(false) => return false,
            Err(e) => {
                self.fault(Direction::Inbound, e.kind());
                return false;
            }
        }

        let mut byte = [0u8; 1];
        match self.io.read(&mut byte) {
            Ok(1) => {
                self.lookahead = Some(byte[0]);
                true
            }
            Ok(_) => false,
            Err(e) => {
                self.fault(Direction::Inbound, e.kind());
                false
            }
        }
    }

    fn receive_byte(&mut self) -> u8 {
        self.lookahead.take().unwrap_or_default()
    }
}

impl<T: Write + WriteReady> ByteSink for IoLink<T> {
    fn send_ready(&mut self) -> bool {
        match self.io.write_ready() {
            Ok(ready) => ready,
            Err(e) => {
                self.fault(Direction::Outbound, e.kind());
                false
            }
        }
    }

    fn send_byte(&mut self, byte: u8) -> bool {
        match self.io.write(&[byte]) {
            Ok(1) => true,
            Ok(_) => false,
            Err(e) => {
                self.fault(Direction::Outbound, e.kind());
                false
            }
        }
    }
}
