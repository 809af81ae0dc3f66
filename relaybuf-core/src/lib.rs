//! relaybuf core engine
//!
//! Byte-level elastic buffer between two serial links: a fast inbound link
//! that is never throttled and a slower outbound link gated by the receiver's
//! flow-control signal. The crate is `no_std` capable and has no hardware
//! dependencies; link adapters live in `relaybuf-embassy-adapter`.
//!
//! # Building blocks
//!
//! - [`buffer`]: the bounded byte queues ([`RelayBuffer`], [`SpscRelayBuffer`])
//! - [`link`]: the four polled link primitives
//! - [`relay`]: the drive loop ([`Relay`])
//! - [`stats`]: received / sent / dropped counters
//! - [`line`]: expected serial line settings and buffer sizing helpers
//!
//! # Example
//!
//! ```rust,ignore
//! use relaybuf_core::buffer::{HeapRelayBuffer, RelayCfg};
//! use relaybuf_core::Relay;
//!
//! let queue = HeapRelayBuffer::new(&RelayCfg::default())?;
//! let mut relay = Relay::new(uart, queue);
//! relay.announce(b"\nSerialBuffer started\n");
//! relay.run();
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(any(feature = "alloc", test))]
extern crate alloc;

pub mod activity;
pub mod buffer;
mod error;
pub mod line;
pub mod link;
pub mod relay;
pub mod stats;

// Public API exports
pub use activity::{ActivityIndicator, NoActivity};
pub use buffer::{
    ByteConsumer, ByteProducer, RelayBuffer, RelayCfg, SlotMode, SpscRelayBuffer, DEFAULT_CAPACITY,
};
pub use error::{RelayError, RelayResult};
pub use line::LineConfig;
pub use link::{ByteSink, ByteSource, Direction, Duplex, SerialLink};
pub use relay::{inbound_step, outbound_step, BatchOutcome, Inbound, PollOutcome, Relay};
pub use stats::{RelayStats, StatsSnapshot};
