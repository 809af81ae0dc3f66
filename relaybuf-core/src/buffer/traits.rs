//! Queue-side traits used by the drive loop
//!
//! The inbound step only ever needs the producer half of a queue and the
//! outbound step only the consumer half. Splitting the interface this way lets
//! the same step functions run against the single-context [`RelayBuffer`]
//! (which implements both) and against the two halves of a
//! [`SpscRelayBuffer`], where each half lives in a different execution context.
//!
//! [`RelayBuffer`]: super::RelayBuffer
//! [`SpscRelayBuffer`]: super::SpscRelayBuffer

/// Producer side of a bounded byte queue
///
/// Implementations never block. A full queue rejects the incoming byte and
/// keeps everything already buffered.
pub trait ByteProducer {
    /// Attempts to append `byte`
    ///
    /// Returns `false` without modifying the queue when it is full.
    fn enqueue(&mut self, byte: u8) -> bool;

    /// Returns true when the next `enqueue` would be rejected
    fn is_full(&self) -> bool;
}

/// Consumer side of a bounded byte queue
pub trait ByteConsumer {
    /// Removes and returns the oldest byte, or `None` when the queue is empty
    fn dequeue(&mut self) -> Option<u8>;

    /// Returns the oldest byte without removing it
    fn peek(&self) -> Option<u8>;

    /// Returns true when the next `dequeue` would return `None`
    fn is_empty(&self) -> bool;
}

impl<T: ByteProducer + ?Sized> ByteProducer for &mut T {
    fn enqueue(&mut self, byte: u8) -> bool {
        (**self).enqueue(byte)
    }

    fn is_full(&self) -> bool {
        (**self).is_full()
    }
}

impl<T: ByteConsumer + ?Sized> ByteConsumer for &mut T {
    fn dequeue(&mut self) -> Option<u8> {
        (**self).dequeue()
    }

    fn peek(&self) -> Option<u8> {
        (**self).peek()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }
}
