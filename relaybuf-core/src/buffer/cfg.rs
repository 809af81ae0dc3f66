//! Buffer configuration types
//!
//! Sizing and occupancy policy for the relay buffer, fixed at startup.

use core::fmt;

use crate::{RelayError, RelayResult};

/// Default relay buffer capacity in bytes
pub const DEFAULT_CAPACITY: usize = 10 * 1024;

/// How the buffer tells a full queue apart from an empty one
///
/// # Quick Selection Guide
/// - **`ReserveOne`**: two cursors only, one slot stays unused. Matches the
///   behavior of the original relay firmware; `capacity - 1` bytes fit.
/// - **`Counted`**: an occupancy counter is kept next to the cursors so every
///   slot is usable; `capacity` bytes fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlotMode {
    /// One slot is permanently unused; empty iff `head == tail`
    #[default]
    ReserveOne,

    /// Occupancy is tracked explicitly; all slots are usable
    Counted,
}

impl SlotMode {
    /// Number of bytes a buffer of `capacity` slots can hold in this mode
    pub const fn usable(self, capacity: usize) -> usize {
        match self {
            SlotMode::ReserveOne => capacity.saturating_sub(1),
            SlotMode::Counted => capacity,
        }
    }

    /// Returns a human-readable name for this slot mode
    pub const fn name(self) -> &'static str {
        match self {
            SlotMode::ReserveOne => "reserve_one",
            SlotMode::Counted => "counted",
        }
    }
}

impl fmt::Display for SlotMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Relay buffer configuration
///
/// **Sizing:** `capacity >= inbound_bytes_per_second × longest_receiver_stall_seconds`.
/// [`LineConfig::fill_time_ms`](crate::LineConfig::fill_time_ms) answers the
/// reverse question for a given capacity.
///
/// # Examples
/// ```rust
/// use relaybuf_core::buffer::{RelayCfg, SlotMode};
///
/// let reference = RelayCfg::default();                                // 10 KiB, one slot reserved
/// let compact = RelayCfg::new(256).with_slot_mode(SlotMode::Counted); // all 256 slots usable
///
/// assert_eq!(reference.usable_capacity(), 10 * 1024 - 1);
/// assert_eq!(compact.usable_capacity(), 256);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RelayCfg {
    /// Number of byte slots in the buffer storage
    pub capacity: usize,

    /// Full/empty disambiguation policy
    #[cfg_attr(feature = "serde", serde(default))]
    pub slot_mode: SlotMode,
}

impl RelayCfg {
    /// Creates a configuration with the given capacity and the default slot mode
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            slot_mode: SlotMode::ReserveOne,
        }
    }

    /// Returns a copy of this configuration using `slot_mode`
    pub const fn with_slot_mode(mut self, slot_mode: SlotMode) -> Self {
        self.slot_mode = slot_mode;
        self
    }

    /// Validates the configuration
    ///
    /// Returns `Err` if the capacity leaves no usable slot: 0 in either mode,
    /// or 1 with [`SlotMode::ReserveOne`].
    pub fn validate(&self) -> RelayResult<()> {
        if self.usable_capacity() == 0 {
            return Err(RelayError::invalid_capacity(self.capacity, self.slot_mode));
        }
        Ok(())
    }

    /// Number of bytes the configured buffer can hold
    pub const fn usable_capacity(&self) -> usize {
        self.slot_mode.usable(self.capacity)
    }

    /// Returns estimated memory footprint of a buffer built from this config
    ///
    /// Storage plus cursors, occupancy counter and slot mode; allocator
    /// overhead is not included.
    pub const fn estimated_memory_bytes(&self) -> usize {
        self.capacity + 3 * core::mem::size_of::<usize>() + core::mem::size_of::<SlotMode>()
    }
}

impl Default for RelayCfg {
    /// Returns the default configuration: 10 KiB, one slot reserved
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl fmt::Display for RelayCfg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RelayCfg(capacity={}, slot_mode={})",
            self.capacity, self.slot_mode
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relay_cfg_validation() {
        assert!(RelayCfg::new(2).validate().is_ok());
        assert!(RelayCfg::new(DEFAULT_CAPACITY).validate().is_ok());
        assert!(RelayCfg::new(1)
            .with_slot_mode(SlotMode::Counted)
            .validate()
            .is_ok());

        // No usable slot left
        assert!(RelayCfg::new(0).validate().is_err());
        assert!(RelayCfg::new(1).validate().is_err());
        assert!(RelayCfg::new(0)
            .with_slot_mode(SlotMode::Counted)
            .validate()
            .is_err());
    }

    #[test]
    fn test_relay_cfg_default() {
        let cfg = RelayCfg::default();
        assert_eq!(cfg.capacity, 10240);
        assert_eq!(cfg.slot_mode, SlotMode::ReserveOne);
        assert_eq!(cfg.usable_capacity(), 10239);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_validation_error_reports_config() {
        match RelayCfg::new(1).validate() {
            Err(RelayError::InvalidCapacity {
                capacity,
                slot_mode,
            }) => {
                assert_eq!(capacity, 1);
                assert_eq!(slot_mode, SlotMode::ReserveOne);
            }
            other => panic!("Expected InvalidCapacity, got {:?}", other),
        }
    }

    #[test]
    fn test_slot_mode_usable() {
        assert_eq!(SlotMode::ReserveOne.usable(4), 3);
        assert_eq!(SlotMode::Counted.usable(4), 4);
        assert_eq!(SlotMode::ReserveOne.usable(0), 0);
        assert_eq!(SlotMode::ReserveOne.name(), "reserve_one");
        assert_eq!(SlotMode::Counted.name(), "counted");
    }

    #[test]
    #[cfg(feature = "std")]
    fn test_relay_cfg_display() {
        assert_eq!(
            format!("{}", RelayCfg::new(512)),
            "RelayCfg(capacity=512, slot_mode=reserve_one)"
        );
        assert_eq!(
            format!("{}", RelayCfg::new(64).with_slot_mode(SlotMode::Counted)),
            "RelayCfg(capacity=64, slot_mode=counted)"
        );
    }

    #[test]
    #[cfg(feature = "std")]
    fn test_slot_mode_display_matches_name() {
        for mode in [SlotMode::ReserveOne, SlotMode::Counted] {
            assert_eq!(mode.to_string(), mode.name());
        }
        let err = RelayError::invalid_capacity(1, SlotMode::ReserveOne);
        assert!(err.to_string().contains("reserve_one"));
    }

    #[test]
    fn test_estimated_memory() {
        let mem = RelayCfg::default().estimated_memory_bytes();
        // Storage dominates; bookkeeping is a few words
        assert!(mem > 10240 && mem < 10240 + 64);
    }
}
