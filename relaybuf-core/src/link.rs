//! Link layer abstraction
//!
//! The relay sees each serial direction through two polled primitives. A link
//! is assumed to be configured (baud rate, framing, pins) before it is handed
//! to the relay; see [`LineConfig`](crate::LineConfig) for the expected line
//! settings.
//!
//! Implementations must never block. `receive_byte` and `send_byte` are only
//! called right after `receive_available` / `send_ready` returned `true` in the
//! same iteration. A link that cannot probe its transmitter may still refuse
//! a byte in `send_byte`; the relay then keeps the byte buffered and offers it
//! again.

use core::fmt;

/// Inbound half of a serial link
pub trait ByteSource {
    /// Returns true when at least one byte can be read without waiting
    fn receive_available(&mut self) -> bool;

    /// Reads one byte
    ///
    /// Only called after [`receive_available`](Self::receive_available)
    /// returned `true`.
    fn receive_byte(&mut self) -> u8;
}

/// Outbound half of a serial link
pub trait ByteSink {
    /// Returns true when the transmitter is free *and* the receiver's
    /// flow-control signal permits sending
    fn send_ready(&mut self) -> bool;

    /// Writes one byte
    ///
    /// Only called after [`send_ready`](Self::send_ready) returned `true`.
    /// Returns `false` when the byte did not reach the transmitter; the link
    /// must not keep it.
    fn send_byte(&mut self, byte: u8) -> bool;
}

/// Full duplex link exposing all four primitives
///
/// Implemented automatically for anything that is both a [`ByteSource`] and a
/// [`ByteSink`], e.g. a single UART driver. Use [`Duplex`] to pair two
/// separate peripherals.
pub trait SerialLink: ByteSource + ByteSink {}

impl<T: ByteSource + ByteSink + ?Sized> SerialLink for T {}

impl<T: ByteSource + ?Sized> ByteSource for &mut T {
    fn receive_available(&mut self) -> bool {
        (**self).receive_available()
    }

    fn receive_byte(&mut self) -> u8 {
        (**self).receive_byte()
    }
}

impl<T: ByteSink + ?Sized> ByteSink for &mut T {
    fn send_ready(&mut self) -> bool {
        (**self).send_ready()
    }

    fn send_byte(&mut self, byte: u8) -> bool {
        (**self).send_byte(byte)
    }
}

/// Pairs a receive-side link and a send-side link into one [`SerialLink`]
///
/// ```rust
/// use relaybuf_core::link::{ByteSink, ByteSource, Duplex};
///
/// struct Rx(Option<u8>);
/// impl ByteSource for Rx {
///     fn receive_available(&mut self) -> bool { self.0.is_some() }
///     fn receive_byte(&mut self) -> u8 { self.0.take().unwrap_or_default() }
/// }
///
/// struct Tx(Option<u8>);
/// impl ByteSink for Tx {
///     fn send_ready(&mut self) -> bool { self.0.is_none() }
///     fn send_byte(&mut self, byte: u8) -> bool { self.0 = Some(byte); true }
/// }
///
/// let mut link = Duplex::new(Rx(Some(0x7E)), Tx(None));
/// assert!(link.receive_available());
/// let byte = link.receive_byte();
/// assert!(link.send_byte(byte));
///
/// let (_, tx) = link.into_parts();
/// assert_eq!(tx.0, Some(0x7E));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Duplex<Rx, Tx> {
    rx: Rx,
    tx: Tx,
}

impl<Rx, Tx> Duplex<Rx, Tx> {
    pub const fn new(rx: Rx, tx: Tx) -> Self {
        Self { rx, tx }
    }

    pub fn rx(&self) -> &Rx {
        &self.rx
    }

    pub fn tx(&self) -> &Tx {
        &self.tx
    }

    pub fn rx_mut(&mut self) -> &mut Rx {
        &mut self.rx
    }

    pub fn tx_mut(&mut self) -> &mut Tx {
        &mut self.tx
    }

    pub fn into_parts(self) -> (Rx, Tx) {
        (self.rx, self.tx)
    }
}

impl<Rx: ByteSource, Tx> ByteSource for Duplex<Rx, Tx> {
    fn receive_available(&mut self) -> bool {
        self.rx.receive_available()
    }

    fn receive_byte(&mut self) -> u8 {
        self.rx.receive_byte()
    }
}

impl<Rx, Tx: ByteSink> ByteSink for Duplex<Rx, Tx> {
    fn send_ready(&mut self) -> bool {
        self.tx.send_ready()
    }

    fn send_byte(&mut self, byte: u8) -> bool {
        self.tx.send_byte(byte)
    }
}

/// Which side of the relay a link serves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Bytes arriving from the transmitter
    Inbound,
    /// Bytes leaving towards the receiver
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Inbound => write!(f, "inbound"),
            Direction::Outbound => write!(f, "outbound"),
        }
    }
}
