//! Cooperative relay task for Embassy executors
//!
//! On a bare MCU the relay can simply own the core with
//! [`Relay::run`](relaybuf_core::Relay::run). When it shares an Embassy
//! executor with other tasks it must give the executor a chance to run them:
//! [`relay_task`] polls the relay in batches and yields between batches.
//! Iterations inside a batch are never interrupted, so byte ordering and the
//! inbound-then-outbound order are unchanged.
//!
//! # Example
//! ```rust,ignore
//! #[embassy_executor::task]
//! async fn relay(relay: Relay<IoLink<BlockingUart>, RelayBuffer<&'static mut [u8]>, LedActivity<Output<'static>>>) {
//!     let cfg = RelayTaskCfg::default();
//!     if let Err(e) = relay_task(relay, cfg).await {
//!         defmt::error!("relay stopped: {}", e);
//!     }
//! }
//! ```

use core::convert::Infallible;

use embassy_futures::yield_now;
use relaybuf_core::{
    ActivityIndicator, BatchOutcome, ByteConsumer, ByteProducer, LineConfig, Relay, RelayResult,
    SerialLink,
};

#[cfg(feature = "defmt")]
use defmt::info;

#[cfg(all(not(feature = "defmt"), feature = "tracing"))]
use tracing::info;

#[cfg(all(not(feature = "defmt"), not(feature = "tracing")))]
macro_rules! info { ($($arg:tt)*) => { let _ = ($($arg)*,); }; }

/// Iterations per batch when nothing else is configured
pub const DEFAULT_BATCH: usize = 64;

/// Banner the reference relay prints on the outbound link at startup
pub const DEFAULT_BANNER: &[u8] = b"\nSerialBuffer started\n";

/// Relay task settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayTaskCfg {
    /// Line settings the links were configured with; validated at startup
    pub line: LineConfig,

    /// Drive-loop iterations between yields. The time other tasks hold the
    /// executor between two batches must stay below the time the UART
    /// receive FIFO takes to fill at the line rate, or inbound bytes overrun.
    pub batch: usize,

    /// Bytes queued for the outbound link before relaying starts
    pub banner: Option<&'static [u8]>,
}

impl Default for RelayTaskCfg {
    fn default() -> Self {
        Self {
            line: LineConfig::default(),
            batch: DEFAULT_BATCH,
            banner: Some(DEFAULT_BANNER),
        }
    }
}

/// Prepares a relay for running: validates the line and queues the banner
pub fn start_relay<L, Q, A>(relay: &mut Relay<L, Q, A>, cfg: &RelayTaskCfg) -> RelayResult<()>
where
    L: SerialLink,
    Q: ByteProducer + ByteConsumer,
    A: ActivityIndicator,
{
    cfg.line.validate()?;

    if let Some(banner) = cfg.banner {
        relay.announce(banner);
    }

    info!(
        "relay started: {} baud, {} iterations per batch",
        cfg.line.baud_rate,
        cfg.batch
    );
    Ok(())
}

/// Runs one batch of iterations and yields to the executor
pub async fn relay_batch<L, Q, A>(relay: &mut Relay<L, Q, A>, batch: usize) -> BatchOutcome
where
    L: SerialLink,
    Q: ByteProducer + ByteConsumer,
    A: ActivityIndicator,
{
    let outcome = relay.poll_batch(batch.max(1));
    yield_now().await;
    outcome
}

/// Relays forever, yielding to the executor between batches
///
/// Only returns on a startup error, i.e. a line configuration the relay cannot
/// operate on.
pub async fn relay_task<L, Q, A>(
    mut relay: Relay<L, Q, A>,
    cfg: RelayTaskCfg,
) -> RelayResult<Infallible>
where
    L: SerialLink,
    Q: ByteProducer + ByteConsumer,
    A: ActivityIndicator,
{
    start_relay(&mut relay, &cfg)?;

    loop {
        relay_batch(&mut relay, cfg.batch).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use relaybuf_core::buffer::{RelayBuffer, SlotMode};
    use relaybuf_core::line::Parity;
    use relaybuf_core::{ByteSink, ByteSource, RelayError};

    #[derive(Default)]
    struct Echo {
        pending: Vec<u8>,
        sent: Vec<u8>,
    }

    impl ByteSource for Echo {
        fn receive_available(&mut self) -> bool {
            !self.pending.is_empty()
        }

        fn receive_byte(&mut self) -> u8 {
            self.pending.remove(0)
        }
    }

    impl ByteSink for Echo {
        fn send_ready(&mut self) -> bool {
            true
        }

        fn send_byte(&mut self, byte: u8) -> bool {
            self.sent.push(byte);
            true
        }
    }

    fn relay_with(input: &[u8]) -> Relay<Echo, RelayBuffer<[u8; 64]>> {
        let link = Echo {
            pending: input.to_vec(),
            sent: Vec::new(),
        };
        Relay::new(
            link,
            RelayBuffer::from_storage([0u8; 64], SlotMode::ReserveOne).unwrap(),
        )
    }

    #[test]
    fn test_start_queues_banner() {
        let mut relay = relay_with(b"");
        start_relay(&mut relay, &RelayTaskCfg::default()).unwrap();

        let outcome = block_on(relay_batch(&mut relay, 64));
        assert_eq!(outcome.sent, DEFAULT_BANNER.len());
        assert_eq!(relay.link().sent, DEFAULT_BANNER);
    }

    #[test]
    fn test_zero_batch_still_makes_progress() {
        let mut relay = relay_with(b"x");
        let outcome = block_on(relay_batch(&mut relay, 0));
        assert_eq!(outcome.iterations, 1);
        assert_eq!(relay.link().sent, b"x");
    }

    #[test]
    fn test_task_rejects_unsupported_line() {
        let cfg = RelayTaskCfg {
            line: LineConfig {
                parity: Parity::Odd,
                ..LineConfig::default()
            },
            ..Default::default()
        };

        match block_on(relay_task(relay_with(b"abc"), cfg)) {
            Err(RelayError::UnsupportedLine { parameter, .. }) => {
                assert_eq!(parameter, RelayError::LINE_PARAM_PARITY)
            }
            Err(other) => panic!("Expected UnsupportedLine, got {:?}", other),
            Ok(never) => match never {},
        }
    }
}
