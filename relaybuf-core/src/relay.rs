//! Drive loop
//!
//! Moves bytes from the inbound link into the buffer and from the buffer to
//! the outbound link. Each iteration runs two non-blocking steps in a fixed
//! order:
//!
//! 1. **Inbound**: if a byte is available, read it and try to enqueue it.
//!    `bytes_received` counts every byte read; a byte that does not fit is
//!    dropped and counted in `bytes_dropped`.
//! 2. **Outbound**: if the outbound link is ready and the buffer is not empty,
//!    hand the oldest byte to the link. It leaves the buffer, and `bytes_sent`
//!    counts it, only once the link accepted it.
//!
//! Running inbound first lets a byte received in this iteration leave in the
//! same iteration. Nothing in the loop fails: overflow and underflow are
//! normal states.
//!
//! [`Relay`] owns the link, buffer, counters and activity hook for the common
//! single-context deployment. [`inbound_step`] and [`outbound_step`] are the
//! same steps as free functions for split deployments where receive runs in
//! an interrupt handler against a [`Producer`](crate::buffer::Producer).

use crate::activity::{ActivityIndicator, NoActivity};
use crate::buffer::{ByteConsumer, ByteProducer};
use crate::link::{ByteSink, ByteSource, SerialLink};
use crate::stats::RelayStats;

#[cfg(feature = "defmt")]
use defmt::{debug, info, trace, warn};

#[cfg(all(not(feature = "defmt"), feature = "tracing"))]
use tracing::{debug, info, trace, warn};

#[cfg(all(not(feature = "defmt"), not(feature = "tracing")))]
macro_rules! debug { ($($arg:tt)*) => { let _ = ($($arg)*,); }; }
#[cfg(all(not(feature = "defmt"), not(feature = "tracing")))]
macro_rules! info { ($($arg:tt)*) => { let _ = ($($arg)*,); }; }
#[cfg(all(not(feature = "defmt"), not(feature = "tracing")))]
macro_rules! trace { ($($arg:tt)*) => { let _ = ($($arg)*,); }; }
#[cfg(all(not(feature = "defmt"), not(feature = "tracing")))]
macro_rules! warn { ($($arg:tt)*) => { let _ = ($($arg)*,); }; }

/// What the inbound step did in one iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Inbound {
    /// No byte was available
    Idle,
    /// A byte was read and buffered
    Queued(u8),
    /// A byte was read but the buffer was full; it is lost
    Dropped(u8),
}

impl Inbound {
    /// The byte read from the inbound link, if any
    pub const fn byte(self) -> Option<u8> {
        match self {
            Inbound::Idle => None,
            Inbound::Queued(byte) | Inbound::Dropped(byte) => Some(byte),
        }
    }
}

/// Result of one drive-loop iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollOutcome {
    pub inbound: Inbound,
    /// Byte written to the outbound link, if the outbound step fired
    pub sent: Option<u8>,
}

impl PollOutcome {
    /// True when neither step moved a byte
    pub fn is_idle(&self) -> bool {
        self.inbound == Inbound::Idle && self.sent.is_none()
    }
}

/// Aggregate of several iterations, see [`Relay::poll_batch`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatchOutcome {
    pub iterations: usize,
    /// Bytes read from the inbound link, including dropped ones
    pub received: usize,
    pub dropped: usize,
    pub sent: usize,
}

impl BatchOutcome {
    /// True when no iteration moved a byte
    pub fn is_idle(&self) -> bool {
        self.received == 0 && self.sent == 0
    }

    fn record(&mut self, outcome: &PollOutcome) {
        self.iterations += 1;
        match outcome.inbound {
            Inbound::Idle => {}
            Inbound::Queued(_) => self.received += 1,
            Inbound::Dropped(_) => {
                self.received += 1;
                self.dropped += 1;
            }
        }
        if outcome.sent.is_some() {
            self.sent += 1;
        }
    }
}

/// Inbound step: drain at most one byte from `source` into `queue`
///
/// Counts the byte as received whether or not it fits.
pub fn inbound_step<S, P>(source: &mut S, queue: &mut P, stats: &RelayStats) -> Inbound
where
    S: ByteSource + ?Sized,
    P: ByteProducer + ?Sized,
{
    if !source.receive_available() {
        return Inbound::Idle;
    }

    let byte = source.receive_byte();
    stats.record_received();

    if queue.enqueue(byte) {
        Inbound::Queued(byte)
    } else {
        stats.record_dropped();
        Inbound::Dropped(byte)
    }
}

/// Outbound step: move at most one byte from `queue` to `sink`
///
/// A byte the sink refuses stays at the head of the queue.
pub fn outbound_step<K, C>(sink: &mut K, queue: &mut C, stats: &RelayStats) -> Option<u8>
where
    K: ByteSink + ?Sized,
    C: ByteConsumer + ?Sized,
{
    if !sink.send_ready() {
        return None;
    }

    let byte = queue.peek()?;
    if !sink.send_byte(byte) {
        return None;
    }

    queue.dequeue();
    stats.record_sent();
    Some(byte)
}

/// Serial relay: one link, one elastic buffer, one activity hook
///
/// # Example
/// ```rust
/// use relaybuf_core::buffer::{RelayBuffer, SlotMode};
/// use relaybuf_core::link::{ByteSink, ByteSource};
/// use relaybuf_core::Relay;
///
/// #[derive(Default)]
/// struct Loopback {
///     rx: Vec<u8>,
///     tx: Vec<u8>,
/// }
///
/// impl ByteSource for Loopback {
///     fn receive_available(&mut self) -> bool { !self.rx.is_empty() }
///     fn receive_byte(&mut self) -> u8 { self.rx.remove(0) }
/// }
///
/// impl ByteSink for Loopback {
///     fn send_ready(&mut self) -> bool { true }
///     fn send_byte(&mut self, byte: u8) -> bool { self.tx.push(byte); true }
/// }
///
/// let link = Loopback { rx: b"hi".to_vec(), ..Default::default() };
/// let queue = RelayBuffer::from_storage([0u8; 16], SlotMode::ReserveOne).unwrap();
/// let mut relay = Relay::new(link, queue);
///
/// relay.poll_batch(4);
/// assert_eq!(relay.link().tx, b"hi");
/// assert_eq!(relay.stats().bytes_received(), 2);
/// assert_eq!(relay.stats().bytes_sent(), 2);
/// ```
#[derive(Debug)]
pub struct Relay<L, Q, A = NoActivity> {
    link: L,
    queue: Q,
    activity: A,
    stats: RelayStats,
    /// Set while consecutive inbound bytes are being dropped
    overflowing: bool,
}

impl<L, Q> Relay<L, Q, NoActivity>
where
    L: SerialLink,
    Q: ByteProducer + ByteConsumer,
{
    /// Creates a relay over an already configured link and an empty buffer
    pub fn new(link: L, queue: Q) -> Self {
        Self {
            link,
            queue,
            activity: NoActivity,
            stats: RelayStats::new(),
            overflowing: false,
        }
    }
}

impl<L, Q, A> Relay<L, Q, A>
where
    L: SerialLink,
    Q: ByteProducer + ByteConsumer,
    A: ActivityIndicator,
{
    /// Replaces the activity hook
    pub fn with_activity<B: ActivityIndicator>(self, activity: B) -> Relay<L, Q, B> {
        Relay {
            link: self.link,
            queue: self.queue,
            activity,
            stats: self.stats,
            overflowing: self.overflowing,
        }
    }

    /// Queues a startup banner for the outbound link
    ///
    /// The banner goes out through the normal outbound step ahead of any
    /// relayed data queued later, and is not counted as received. Bytes that
    /// do not fit are discarded. Returns the number of bytes queued.
    pub fn announce(&mut self, banner: &[u8]) -> usize {
        let queued = banner
            .iter()
            .take_while(|&&byte| self.queue.enqueue(byte))
            .count();

        if queued < banner.len() {
            warn!(
                "relay banner truncated: {} of {} bytes queued",
                queued,
                banner.len()
            );
        } else {
            debug!("relay banner queued: {} bytes", queued);
        }
        queued
    }

    /// Runs one iteration: inbound step, then outbound step
    pub fn poll(&mut self) -> PollOutcome {
        let inbound = inbound_step(&mut self.link, &mut self.queue, &self.stats);

        match inbound {
            Inbound::Idle => {}
            Inbound::Queued(_) => {
                if self.overflowing {
                    self.overflowing = false;
                    debug!(
                        "relay buffer accepting again, {} bytes dropped so far",
                        self.stats.bytes_dropped()
                    );
                }
                self.activity.on_receive();
            }
            Inbound::Dropped(byte) => {
                if !self.overflowing {
                    self.overflowing = true;
                    warn!("relay buffer full, dropping inbound bytes");
                }
                trace!("dropped inbound byte {}", byte);
                self.activity.on_receive();
            }
        }

        let sent = outbound_step(&mut self.link, &mut self.queue, &self.stats);
        if sent.is_some() {
            self.activity.on_send();
        }

        PollOutcome { inbound, sent }
    }

    /// Runs `iterations` iterations back to back
    pub fn poll_batch(&mut self, iterations: usize) -> BatchOutcome {
        let mut batch = BatchOutcome::default();
        for _ in 0..iterations {
            let outcome = self.poll();
            batch.record(&outcome);
        }
        batch
    }

    /// Busy-polls forever
    pub fn run(&mut self) -> ! {
        info!("relay loop started");
        loop {
            self.poll();
        }
    }

    pub fn stats(&self) -> &RelayStats {
        &self.stats
    }

    pub fn queue(&self) -> &Q {
        &self.queue
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    pub fn activity(&self) -> &A {
        &self.activity
    }

    /// Returns true while inbound bytes are being dropped
    pub fn is_overflowing(&self) -> bool {
        self.overflowing
    }

    /// Tears the relay down into link, buffer and activity hook
    pub fn into_parts(self) -> (L, Q, A) {
        (self.link, self.queue, self.activity)
    }
}
