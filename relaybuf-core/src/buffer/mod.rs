//! Elastic byte buffers between the inbound and outbound links
//!
//! The relay absorbs rate mismatch between a fast, never-throttled inbound
//! link and a slower, flow-controlled outbound link. Everything in between is
//! a bounded FIFO of bytes.
//!
//! # Buffer Types
//!
//! - **[`RelayBuffer`]**: owned by a single execution context, plain cursors,
//!   either slot mode. Used by the polled drive loop.
//! - **[`SpscRelayBuffer`]**: lock-free, statically sized, split into a
//!   [`Producer`] and a [`Consumer`] that can live in different contexts
//!   (receive interrupt and transmit loop).
//!
//! Both drop the *incoming* byte on overflow and never evict buffered data.
//!
//! # Architecture
//!
//! ```text
//!   inbound link ──► ByteProducer ──► [ storage ] ──► ByteConsumer ──► outbound link
//!                     enqueue/is_full               dequeue/is_empty
//! ```
//!
//! The drive loop is generic over [`ByteProducer`] + [`ByteConsumer`], so
//! either buffer type plugs in unchanged.

mod cfg;
mod ring;
mod spsc;
mod traits;

pub use cfg::{RelayCfg, SlotMode, DEFAULT_CAPACITY};
#[cfg(feature = "alloc")]
pub use ring::HeapRelayBuffer;
pub use ring::RelayBuffer;
pub use spsc::{Consumer, Producer, SpscRelayBuffer};
pub use traits::{ByteConsumer, ByteProducer};

/// Next cursor position on a ring of `capacity` slots
#[inline]
pub(crate) const fn advance(index: usize, capacity: usize) -> usize {
    let next = index + 1;
    if next == capacity {
        0
    } else {
        next
    }
}
