//! Lock-free single-producer single-consumer relay buffer
//!
//! [`SpscRelayBuffer`] is the variant of the relay buffer for deployments
//! where the inbound step runs in a different execution context than the
//! outbound step, typically a UART receive interrupt feeding a polled
//! transmit loop. Each cursor is written by exactly one side:
//!
//! - the producer writes the storage slot, then publishes `tail` with
//!   `Release`; the consumer reads `tail` with `Acquire` before reading the slot
//! - the consumer reads the slot, then publishes `head` with `Release`; the
//!   producer reads `head` with `Acquire` before reusing the slot
//!
//! One slot is always left empty so that `head == tail` unambiguously means
//! empty without a shared occupancy counter. Overflow policy is the same as
//! [`RelayBuffer`](super::RelayBuffer): the incoming byte is dropped.
//!
//! # Example
//! ```rust
//! use relaybuf_core::buffer::SpscRelayBuffer;
//!
//! static QUEUE: SpscRelayBuffer<64> = SpscRelayBuffer::new();
//!
//! let (mut producer, mut consumer) = QUEUE.try_split().unwrap();
//! assert!(QUEUE.try_split().is_none());
//!
//! assert!(producer.enqueue(0x55));
//! assert_eq!(consumer.dequeue(), Some(0x55));
//! ```

use core::cell::UnsafeCell;
use core::fmt;

use portable_atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{advance, ByteConsumer, ByteProducer};

/// Statically sized SPSC byte queue, usable from a `static`
///
/// `N` is the number of slots; `N - 1` bytes fit. `N` must be at least 2,
/// checked at compile time.
pub struct SpscRelayBuffer<const N: usize> {
    storage: UnsafeCell<[u8; N]>,
    head: AtomicUsize,
    tail: AtomicUsize,
    split: AtomicBool,
}

// SAFETY: storage slots are only touched through `Producer` and `Consumer`.
// `try_split` hands out at most one of each, the producer only writes slots in
// `[tail, head)` (the free region) and the consumer only reads slots in
// `[head, tail)` (the filled region). The Release/Acquire pairs on the cursors
// order each slot access before the cursor update that hands it to the other
// side.
unsafe impl<const N: usize> Sync for SpscRelayBuffer<N> {}

impl<const N: usize> SpscRelayBuffer<N> {
    const CAPACITY_CHECK: () = assert!(N >= 2, "SpscRelayBuffer needs at least 2 slots");

    /// Creates an empty buffer (const constructor)
    pub const fn new() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_CHECK;

        Self {
            storage: UnsafeCell::new([0; N]),
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            split: AtomicBool::new(false),
        }
    }

    /// Splits the buffer into its producer and consumer halves
    ///
    /// Returns `None` if the buffer was already split; there is never more
    /// than one producer or consumer.
    pub fn try_split(&self) -> Option<(Producer<'_, N>, Consumer<'_, N>)> {
        if self.split.swap(true, Ordering::AcqRel) {
            return None;
        }

        Some((Producer { queue: self }, Consumer { queue: self }))
    }

    /// Number of slots
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Maximum number of bytes the buffer can hold at once
    pub const fn usable_capacity(&self) -> usize {
        N - 1
    }

    /// Number of buffered bytes as seen at the time of the call
    ///
    /// Only a snapshot when both sides are running.
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        (tail + N - head) % N
    }

    /// Returns true when no bytes are buffered at the time of the call
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn slot(&self, index: usize) -> *mut u8 {
        debug_assert!(index < N);
        // SAFETY: `index < N`, so the offset stays inside the array.
        unsafe { self.storage.get().cast::<u8>().add(index) }
    }
}

impl<const N: usize> Default for SpscRelayBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for SpscRelayBuffer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpscRelayBuffer")
            .field("capacity", &N)
            .field("head", &self.head.load(Ordering::Relaxed))
            .field("tail", &self.tail.load(Ordering::Relaxed))
            .field("split", &self.split.load(Ordering::Relaxed))
            .finish()
    }
}

/// Inbound half of a [`SpscRelayBuffer`]
///
/// Owns the `tail` cursor. Move it into the receive context.
#[derive(Debug)]
pub struct Producer<'a, const N: usize> {
    queue: &'a SpscRelayBuffer<N>,
}

impl<const N: usize> Producer<'_, N> {
    /// Appends `byte`; returns `false` and drops it when the buffer is full
    pub fn enqueue(&mut self, byte: u8) -> bool {
        let tail = self.queue.tail.load(Ordering::Relaxed);
        let next = advance(tail, N);
        if next == self.queue.head.load(Ordering::Acquire) {
            return false;
        }

        // SAFETY: `tail` is outside the consumer's readable region until the
        // store below publishes it.
        unsafe { self.queue.slot(tail).write(byte) };
        self.queue.tail.store(next, Ordering::Release);
        true
    }

    /// Returns true when the next `enqueue` would be rejected
    pub fn is_full(&self) -> bool {
        let tail = self.queue.tail.load(Ordering::Relaxed);
        advance(tail, N) == self.queue.head.load(Ordering::Acquire)
    }
}

impl<const N: usize> ByteProducer for Producer<'_, N> {
    fn enqueue(&mut self, byte: u8) -> bool {
        Producer::enqueue(self, byte)
    }

    fn is_full(&self) -> bool {
        Producer::is_full(self)
    }
}

/// Outbound half of a [`SpscRelayBuffer`]
///
/// Owns the `head` cursor. Keep it in the transmit context.
#[derive(Debug)]
pub struct Consumer<'a, const N: usize> {
    queue: &'a SpscRelayBuffer<N>,
}

impl<const N: usize> Consumer<'_, N> {
    /// Removes the oldest byte, or returns `None` when the buffer is empty
    pub fn dequeue(&mut self) -> Option<u8> {
        let head = self.queue.head.load(Ordering::Relaxed);
        if head == self.queue.tail.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: the Acquire load above synchronizes with the producer's
        // Release store, so the slot at `head` is initialized and the
        // producer will not touch it until `head` moves past it.
        let byte = unsafe { self.queue.slot(head).read() };
        self.queue.head.store(advance(head, N), Ordering::Release);
        Some(byte)
    }

    /// Returns the oldest byte without releasing its slot
    pub fn peek(&self) -> Option<u8> {
        let head = self.queue.head.load(Ordering::Relaxed);
        if head == self.queue.tail.load(Ordering::Acquire) {
            return None;
        }

        // SAFETY: as in `dequeue`; `head` is not advanced, so the producer
        // still cannot reuse the slot.
        Some(unsafe { self.queue.slot(head).read() })
    }

    /// Returns true when the next `dequeue` would return `None`
    pub fn is_empty(&self) -> bool {
        let head = self.queue.head.load(Ordering::Relaxed);
        head == self.queue.tail.load(Ordering::Acquire)
    }
}

impl<const N: usize> ByteConsumer for Consumer<'_, N> {
    fn dequeue(&mut self) -> Option<u8> {
        Consumer::dequeue(self)
    }

    fn peek(&self) -> Option<u8> {
        Consumer::peek(self)
    }

    fn is_empty(&self) -> bool {
        Consumer::is_empty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_only_once() {
        let queue = SpscRelayBuffer::<8>::new();
        assert!(queue.try_split().is_some());
        assert!(queue.try_split().is_none());
    }

    #[test]
    fn test_capacity_bound_and_drop_policy() {
        let queue = SpscRelayBuffer::<4>::new();
        let (mut producer, mut consumer) = queue.try_split().unwrap();

        assert!(consumer.is_empty());
        for byte in [0x01, 0x02, 0x03] {
            assert!(!producer.is_full());
            assert!(producer.enqueue(byte));
        }
        assert!(producer.is_full());
        assert!(!producer.enqueue(0x04));
        assert_eq!(queue.len(), 3);

        assert_eq!(consumer.peek(), Some(0x01));
        assert_eq!(consumer.dequeue(), Some(0x01));
        assert_eq!(consumer.dequeue(), Some(0x02));
        assert_eq!(consumer.dequeue(), Some(0x03));
        assert_eq!(consumer.dequeue(), None);
        assert_eq!(consumer.peek(), None);
        assert!(consumer.is_empty());
        assert!(queue.is_empty());
    }

    #[test]
    fn test_wraparound_keeps_order() {
        let queue = SpscRelayBuffer::<3>::new();
        let (mut producer, mut consumer) = queue.try_split().unwrap();

        for byte in 0..=255u8 {
            assert!(producer.enqueue(byte));
            assert_eq!(consumer.dequeue(), Some(byte));
        }
        assert_eq!(queue.usable_capacity(), 2);
    }

    #[test]
    fn test_halves_drive_generic_steps() {
        fn fill<P: ByteProducer>(p: &mut P, bytes: &[u8]) -> usize {
            bytes.iter().take_while(|&&b| p.enqueue(b)).count()
        }
        fn drain<C: ByteConsumer>(c: &mut C) -> usize {
            core::iter::from_fn(|| c.dequeue()).count()
        }

        let queue = SpscRelayBuffer::<5>::new();
        let (mut producer, mut consumer) = queue.try_split().unwrap();
        assert_eq!(fill(&mut producer, b"abcdef"), 4);
        assert_eq!(drain(&mut consumer), 4);
    }
}
