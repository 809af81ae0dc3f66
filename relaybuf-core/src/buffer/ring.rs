//! Fixed-capacity circular byte queue
//!
//! [`RelayBuffer`] is the elastic store between the inbound and outbound
//! links. It is owned by exactly one execution context (the drive loop), so
//! the cursors are plain integers. Deployments that receive in an interrupt
//! handler use [`SpscRelayBuffer`](super::SpscRelayBuffer) instead.
//!
//! # Overflow policy
//!
//! Enqueueing into a full buffer drops the *incoming* byte and reports
//! failure. Bytes already buffered are never evicted, so whatever reaches the
//! outbound link is always an in-order subsequence of what arrived.

use core::fmt;

#[cfg(feature = "alloc")]
use alloc::{boxed::Box, vec};

use super::{advance, ByteConsumer, ByteProducer, SlotMode};
#[cfg(feature = "alloc")]
use super::RelayCfg;
use crate::{RelayError, RelayResult};

#[cfg(feature = "defmt")]
use defmt::debug;

#[cfg(all(not(feature = "defmt"), feature = "tracing"))]
use tracing::debug;

#[cfg(all(not(feature = "defmt"), not(feature = "tracing")))]
macro_rules! debug { ($($arg:tt)*) => { let _ = ($($arg)*,); }; }

/// Heap-backed relay buffer built from a [`RelayCfg`]
#[cfg(feature = "alloc")]
pub type HeapRelayBuffer = RelayBuffer<Box<[u8]>>;

/// Bounded circular byte queue over caller-chosen storage
///
/// `S` is anything that derefs to a byte slice: `Box<[u8]>` on targets with
/// an allocator, `[u8; N]` or `&'static mut [u8]` on bare MCUs. The storage
/// length is the capacity and never changes.
///
/// # Invariants
/// - `head < capacity` and `tail < capacity`
/// - `tail == (head + len) % capacity`
/// - `len <= slot_mode.usable(capacity)`; with [`SlotMode::ReserveOne`] this
///   makes the buffer empty iff `head == tail` and full iff
///   `(tail + 1) % capacity == head`
///
/// # Example
/// ```rust
/// use relaybuf_core::buffer::{RelayBuffer, SlotMode};
///
/// let mut buf = RelayBuffer::from_storage([0u8; 4], SlotMode::ReserveOne).unwrap();
/// assert!(buf.enqueue(0x41));
/// assert!(buf.enqueue(0x42));
/// assert!(buf.enqueue(0x43));
/// assert!(buf.is_full());
/// assert!(!buf.enqueue(0x44)); // dropped, buffered bytes untouched
///
/// assert_eq!(buf.dequeue(), Some(0x41));
/// assert_eq!(buf.dequeue(), Some(0x42));
/// assert_eq!(buf.dequeue(), Some(0x43));
/// assert!(buf.is_empty());
/// ```
pub struct RelayBuffer<S> {
    storage: S,
    head: usize,
    tail: usize,
    len: usize,
    slot_mode: SlotMode,
}

#[cfg(feature = "alloc")]
impl RelayBuffer<Box<[u8]>> {
    /// Allocates a buffer as described by `cfg`
    ///
    /// # Errors
    /// [`RelayError::InvalidCapacity`] if the configuration leaves no usable slot.
    pub fn new(cfg: &RelayCfg) -> RelayResult<Self> {
        cfg.validate()?;
        Self::from_storage(vec![0u8; cfg.capacity].into_boxed_slice(), cfg.slot_mode)
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> RelayBuffer<S> {
    /// Wraps existing storage; its length becomes the capacity
    ///
    /// Previous storage contents are ignored, the buffer starts empty.
    ///
    /// # Errors
    /// [`RelayError::InvalidCapacity`] if the storage is too short to hold a
    /// single byte in `slot_mode`.
    pub fn from_storage(storage: S, slot_mode: SlotMode) -> RelayResult<Self> {
        let capacity = storage.as_ref().len();
        if slot_mode.usable(capacity) == 0 {
            return Err(RelayError::invalid_capacity(capacity, slot_mode));
        }

        debug!(
            "relay buffer ready: capacity={}, slot_mode={}, usable={}",
            capacity,
            slot_mode,
            slot_mode.usable(capacity)
        );

        Ok(Self {
            storage,
            head: 0,
            tail: 0,
            len: 0,
            slot_mode,
        })
    }

    /// Appends `byte` at the tail
    ///
    /// Returns `false` and leaves the buffer unchanged when it is full; the
    /// byte is the caller's to discard.
    pub fn enqueue(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }

        let capacity = self.capacity();
        self.storage.as_mut()[self.tail] = byte;
        self.tail = advance(self.tail, capacity);
        self.len += 1;
        true
    }

    /// Removes the byte at the head
    pub fn dequeue(&mut self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }

        let byte = self.storage.as_ref()[self.head];
        self.head = advance(self.head, self.capacity());
        self.len -= 1;
        Some(byte)
    }

    /// Returns the byte at the head without removing it
    pub fn peek(&self) -> Option<u8> {
        if self.is_empty() {
            return None;
        }
        Some(self.storage.as_ref()[self.head])
    }

    /// Returns true when no further byte can be enqueued
    pub fn is_full(&self) -> bool {
        let full = self.len == self.usable_capacity();
        debug_assert!(
            self.slot_mode != SlotMode::ReserveOne
                || full == (advance(self.tail, self.capacity()) == self.head)
        );
        full
    }

    /// Returns true when nothing is buffered
    pub fn is_empty(&self) -> bool {
        debug_assert!(
            self.slot_mode != SlotMode::ReserveOne || (self.len == 0) == (self.head == self.tail)
        );
        self.len == 0
    }

    /// Number of byte slots in the storage
    pub fn capacity(&self) -> usize {
        self.storage.as_ref().len()
    }

    /// Maximum number of bytes the buffer can hold at once
    pub fn usable_capacity(&self) -> usize {
        self.slot_mode.usable(self.capacity())
    }

    /// Number of bytes currently buffered
    pub fn len(&self) -> usize {
        self.len
    }

    /// Number of bytes that can still be enqueued
    pub fn free(&self) -> usize {
        self.usable_capacity() - self.len
    }

    /// Full/empty disambiguation policy this buffer was built with
    pub fn slot_mode(&self) -> SlotMode {
        self.slot_mode
    }

    /// Current `(head, tail)` cursor positions
    pub fn cursors(&self) -> (usize, usize) {
        (self.head, self.tail)
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> ByteProducer for RelayBuffer<S> {
    fn enqueue(&mut self, byte: u8) -> bool {
        RelayBuffer::enqueue(self, byte)
    }

    fn is_full(&self) -> bool {
        RelayBuffer::is_full(self)
    }
}

impl<S: AsRef<[u8]> + AsMut<[u8]>> ByteConsumer for RelayBuffer<S> {
    fn dequeue(&mut self) -> Option<u8> {
        RelayBuffer::dequeue(self)
    }

    fn peek(&self) -> Option<u8> {
        RelayBuffer::peek(self)
    }

    fn is_empty(&self) -> bool {
        RelayBuffer::is_empty(self)
    }
}

impl<S: AsRef<[u8]>> fmt::Debug for RelayBuffer<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayBuffer")
            .field("capacity", &self.storage.as_ref().len())
            .field("len", &self.len)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("slot_mode", &self.slot_mode)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn reserve_one<const N: usize>() -> RelayBuffer<[u8; N]> {
        RelayBuffer::from_storage([0u8; N], SlotMode::ReserveOne).unwrap()
    }

    #[test]
    fn test_fresh_buffer_is_empty() {
        let buf = reserve_one::<4>();
        assert!(buf.is_empty());
        assert!(!buf.is_full());
        assert_eq!(buf.len(), 0);
        assert_eq!(buf.free(), 3);
        assert_eq!(buf.cursors(), (0, 0));
    }

    #[test]
    fn test_steady_relay_scenario() {
        let mut buf = reserve_one::<4>();
        for byte in [0x41, 0x42, 0x43] {
            assert!(buf.enqueue(byte));
        }

        assert_eq!(buf.dequeue(), Some(0x41));
        assert_eq!(buf.dequeue(), Some(0x42));
        assert_eq!(buf.dequeue(), Some(0x43));
        assert!(buf.is_empty());
        assert_eq!(buf.dequeue(), None);
    }

    #[test]
    fn test_overflow_drops_newest_byte() {
        let mut buf = reserve_one::<4>();
        for byte in [0x01, 0x02, 0x03] {
            assert!(buf.enqueue(byte));
        }
        assert!(!buf.enqueue(0x04));
        assert_eq!(buf.len(), 3);

        let drained: Vec<u8> = core::iter::from_fn(|| buf.dequeue()).collect();
        assert_eq!(drained, [0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_full_exactly_at_capacity_minus_one() {
        let mut buf = reserve_one::<8>();
        for i in 0..7u8 {
            assert!(!buf.is_full(), "full too early after {} bytes", i);
            assert!(buf.enqueue(i));
        }
        assert!(buf.is_full());
        assert!(!buf.enqueue(0xFF));

        // Cursor form of the invariant
        let (head, tail) = buf.cursors();
        assert_eq!((tail + 1) % buf.capacity(), head);
    }

    #[test]
    fn test_round_trip_returns_to_empty() {
        let mut buf = reserve_one::<4>();
        assert!(buf.enqueue(0xAA));
        assert!(!buf.is_empty());
        assert_eq!(buf.dequeue(), Some(0xAA));
        assert!(buf.is_empty());
        let (head, tail) = buf.cursors();
        assert_eq!(head, tail);
    }

    #[test]
    fn test_cursors_wrap_around() {
        let mut buf = reserve_one::<4>();
        // Walk the cursors around the ring several times
        for round in 0..10u8 {
            assert!(buf.enqueue(round));
            assert!(buf.enqueue(round.wrapping_add(100)));
            assert_eq!(buf.dequeue(), Some(round));
            assert_eq!(buf.dequeue(), Some(round.wrapping_add(100)));
            let (head, tail) = buf.cursors();
            assert!(head < 4 && tail < 4);
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn test_counted_mode_uses_every_slot() {
        let mut buf = RelayBuffer::from_storage([0u8; 4], SlotMode::Counted).unwrap();
        for byte in 1..=4u8 {
            assert!(buf.enqueue(byte));
        }
        assert!(buf.is_full());
        assert!(!buf.enqueue(5));

        // Full buffer has head == tail in counted mode; len disambiguates
        let (head, tail) = buf.cursors();
        assert_eq!(head, tail);
        assert!(!buf.is_empty());

        let drained: Vec<u8> = core::iter::from_fn(|| buf.dequeue()).collect();
        assert_eq!(drained, [1, 2, 3, 4]);
    }

    #[test]
    fn test_peek_leaves_byte_in_place() {
        let mut buf = reserve_one::<4>();
        assert_eq!(buf.peek(), None);

        buf.enqueue(0x11);
        buf.enqueue(0x22);
        assert_eq!(buf.peek(), Some(0x11));
        assert_eq!(buf.peek(), Some(0x11));
        assert_eq!(buf.len(), 2);

        assert_eq!(buf.dequeue(), Some(0x11));
        assert_eq!(buf.peek(), Some(0x22));
    }

    #[test]
    fn test_every_byte_value_passes_unmodified() {
        let mut buf = RelayBuffer::from_storage([0u8; 300], SlotMode::ReserveOne).unwrap();
        for byte in 0..=255u8 {
            assert!(buf.enqueue(byte));
        }
        for byte in 0..=255u8 {
            assert_eq!(buf.dequeue(), Some(byte));
        }
    }

    #[test]
    fn test_rejects_storage_without_usable_slot() {
        assert!(RelayBuffer::from_storage([0u8; 1], SlotMode::ReserveOne).is_err());
        assert!(RelayBuffer::from_storage([0u8; 0], SlotMode::Counted).is_err());
        assert!(RelayBuffer::from_storage([0u8; 1], SlotMode::Counted).is_ok());
    }

    #[test]
    fn test_borrowed_storage() {
        let mut backing = [0u8; 16];
        let mut buf = RelayBuffer::from_storage(&mut backing[..], SlotMode::ReserveOne).unwrap();
        assert_eq!(buf.capacity(), 16);
        assert!(buf.enqueue(7));
        assert_eq!(buf.dequeue(), Some(7));
    }

    #[test]
    #[cfg(feature = "alloc")]
    fn test_heap_buffer_from_cfg() {
        let buf = HeapRelayBuffer::new(&RelayCfg::default()).unwrap();
        assert_eq!(buf.capacity(), 10240);
        assert_eq!(buf.usable_capacity(), 10239);

        let err = HeapRelayBuffer::new(&RelayCfg::new(1)).unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_trait_objects_see_same_state() {
        let mut buf = reserve_one::<4>();
        {
            let producer: &mut dyn ByteProducer = &mut buf;
            assert!(producer.enqueue(9));
        }
        let consumer: &mut dyn ByteConsumer = &mut buf;
        assert!(!consumer.is_empty());
        assert_eq!(consumer.dequeue(), Some(9));
    }
}
