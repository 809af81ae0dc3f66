//! Embassy Adapter for relaybuf
//!
//! Hardware glue between `relaybuf-core` and embedded peripherals: link
//! adapters over the standard serial driver traits, a status LED hook and a
//! cooperative relay task for Embassy executors.
//!
//! # Features
//!
//! - **Link adapters**: [`IoLink`] for `embedded-io` UARTs with readiness
//!   probes, [`NbLink`] for `embedded-hal-nb` serial drivers
//! - **Error Handling**: UART error kinds converted to
//!   [`RelayError::LinkFault`](relaybuf_core::RelayError::LinkFault) with codes
//!   in 0x6200-0x62FF; faults are logged and counted, never fatal
//! - **Activity LED**: [`LedActivity`] over an `embedded-hal` output pin
//! - **Cooperative task**: [`relay_task`] yields to the executor between
//!   batches of drive-loop iterations
//!
//! # Usage
//!
//! ```rust,ignore
//! use relaybuf_core::buffer::{RelayBuffer, SlotMode};
//! use relaybuf_core::Relay;
//! use relaybuf_embassy_adapter::{relay_task, IoLink, LedActivity, RelayTaskCfg};
//!
//! static mut STORAGE: [u8; 10 * 1024] = [0; 10 * 1024];
//!
//! let queue = RelayBuffer::from_storage(unsafe { &mut STORAGE[..] }, SlotMode::ReserveOne)?;
//! let relay = Relay::new(IoLink::new(uart), queue)
//!     .with_activity(LedActivity::new(led));
//! relay_task(relay, RelayTaskCfg::default()).await?;
//! ```

#![cfg_attr(not(test), no_std)]

mod activity;
mod error;
mod io_link;
mod nb_link;
mod runtime;

pub use activity::LedActivity;
pub use error::{
    UartErrorSupport, UART_DISCONNECTED, UART_ERROR_BASE, UART_FRAME_FORMAT, UART_INTERRUPTED,
    UART_NOISE, UART_OVERRUN, UART_PARITY, UART_TIMEOUT, UART_UNKNOWN_ERROR,
};
pub use io_link::IoLink;
pub use nb_link::NbLink;
pub use runtime::{
    relay_batch, relay_task, start_relay, RelayTaskCfg, DEFAULT_BANNER, DEFAULT_BATCH,
};
