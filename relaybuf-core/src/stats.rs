//! Relay throughput counters
//!
//! Lock-free byte counters for runtime inspection of the relay. They are
//! informational only: nothing in the drive loop reads them back, and
//! wraparound never affects queue correctness.

use core::fmt;

use portable_atomic::{AtomicU32, Ordering};

/// Byte counters shared between the inbound and outbound steps
///
/// # Design
///
/// - `AtomicU32` counters for embedded compatibility; updated through `&self`
///   so the two halves of a split buffer can live in different contexts
/// - `portable-atomic` provides `fetch_add` on targets without native CAS
/// - All counters wrap at `u32::MAX`
///
/// # Example
///
/// ```rust
/// use relaybuf_core::RelayStats;
///
/// static STATS: RelayStats = RelayStats::new();
///
/// STATS.record_received();
/// STATS.record_sent();
/// STATS.record_received();
/// STATS.record_dropped();
///
/// let snapshot = STATS.snapshot();
/// assert_eq!(snapshot.bytes_received, 2);
/// assert_eq!(snapshot.bytes_sent, 1);
/// assert_eq!(snapshot.bytes_dropped, 1);
/// ```
#[derive(Debug)]
pub struct RelayStats {
    /// Bytes read from the inbound link, accepted or not
    bytes_received: AtomicU32,

    /// Bytes written to the outbound link
    bytes_sent: AtomicU32,

    /// Bytes read from the inbound link and discarded on overflow
    bytes_dropped: AtomicU32,
}

impl RelayStats {
    /// Creates a zeroed set of counters (const constructor)
    pub const fn new() -> Self {
        Self {
            bytes_received: AtomicU32::new(0),
            bytes_sent: AtomicU32::new(0),
            bytes_dropped: AtomicU32::new(0),
        }
    }

    #[inline]
    pub fn record_received(&self) {
        self.bytes_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_sent(&self) {
        self.bytes_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_dropped(&self) {
        self.bytes_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn bytes_received(&self) -> u32 {
        self.bytes_received.load(Ordering::Relaxed)
    }

    pub fn bytes_sent(&self) -> u32 {
        self.bytes_sent.load(Ordering::Relaxed)
    }

    pub fn bytes_dropped(&self) -> u32 {
        self.bytes_dropped.load(Ordering::Relaxed)
    }

    /// Returns a point-in-time copy of all counters
    ///
    /// The counters are read one after another; with both steps running
    /// concurrently the values may come from slightly different moments.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            bytes_received: self.bytes_received(),
            bytes_sent: self.bytes_sent(),
            bytes_dropped: self.bytes_dropped(),
        }
    }

    /// Zeroes all counters
    pub fn reset(&self) {
        self.bytes_received.store(0, Ordering::Relaxed);
        self.bytes_sent.store(0, Ordering::Relaxed);
        self.bytes_dropped.store(0, Ordering::Relaxed);
    }
}

impl Default for RelayStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Copy of the relay counters at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatsSnapshot {
    pub bytes_received: u32,
    pub bytes_sent: u32,
    pub bytes_dropped: u32,
}

impl fmt::Display for StatsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "rx={} tx={} dropped={}",
            self.bytes_received, self.bytes_sent, self.bytes_dropped
        )
    }
}
