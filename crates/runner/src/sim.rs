//! Simulated exchange feed
//!
//! Generates a random-walk order book and serves it two ways: as delta
//! updates for the producer loop and as full snapshots through the
//! [`SnapshotFetcher`] port. Id gaps and fetch outages are injected with
//! configurable probability to exercise the buffer's recovery paths.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use bookfeed_core::{PriceLevel, SliceOrderBook};
use bookfeed_depth::{BookSnapshot, FetchError, SequencedUpdate, SnapshotFetcher};

/// Configuration for the simulated feed
#[derive(Debug, Clone)]
pub struct FeedConfig {
    pub symbol: String,
    /// Starting mid price for the random walk
    pub start_mid: Decimal,
    /// Absolute price step per tick
    pub tick_step: Decimal,
    /// Book depth per side
    pub levels_per_side: usize,
    /// Probability of skipping update ids on a tick (forces gap recovery)
    pub gap_probability: f64,
    /// Probability that a snapshot fetch fails
    pub fetch_failure_probability: f64,
    /// Artificial snapshot fetch latency
    pub fetch_latency: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        FeedConfig {
            symbol: "BTCUSDT".to_string(),
            start_mid: dec!(50000),
            tick_step: dec!(0.5),
            levels_per_side: 5,
            gap_probability: 0.01,
            fetch_failure_probability: 0.1,
            fetch_latency: Duration::from_millis(150),
        }
    }
}

/// Random-walk book generator acting as both delta producer and snapshot
/// source
pub struct SimulatedExchange {
    config: FeedConfig,
    state: Mutex<FeedState>,
}

struct FeedState {
    mid: Decimal,
    next_update_id: u64,
    rng: StdRng,
}

impl SimulatedExchange {
    pub fn new(config: FeedConfig) -> Self {
        Self::with_seed(config, rand::random())
    }

    /// Create with a specific seed for reproducible runs
    pub fn with_seed(config: FeedConfig, seed: u64) -> Self {
        let mid = config.start_mid;
        SimulatedExchange {
            config,
            state: Mutex::new(FeedState {
                mid,
                next_update_id: 1,
                rng: StdRng::seed_from_u64(seed),
            }),
        }
    }

    /// Produce the next delta; occasionally skips ids to simulate a lossy
    /// stream
    pub fn next_update(&self) -> SequencedUpdate {
        let mut state = self.state.lock();

        if state.rng.gen_bool(self.config.gap_probability) {
            let skipped = state.rng.gen_range(2..10);
            state.next_update_id += skipped;
        }

        let direction = state.rng.gen_range(-1i64..=1);
        state.mid += self.config.tick_step * Decimal::from(direction);

        let first = state.next_update_id;
        let last = first + state.rng.gen_range(0..3);
        state.next_update_id = last + 1;

        let book = self.build_book(&mut state);
        SequencedUpdate::new(first, last, book)
    }

    fn build_book(&self, state: &mut FeedState) -> SliceOrderBook {
        let mut bids = Vec::with_capacity(self.config.levels_per_side);
        let mut asks = Vec::with_capacity(self.config.levels_per_side);

        for i in 1..=self.config.levels_per_side {
            let offset = self.config.tick_step * Decimal::from(i as i64);
            let bid_qty = Decimal::from(state.rng.gen_range(1i64..50)) / dec!(10);
            let ask_qty = Decimal::from(state.rng.gen_range(1i64..50)) / dec!(10);
            bids.push(PriceLevel::new(state.mid - offset, bid_qty));
            asks.push(PriceLevel::new(state.mid + offset, ask_qty));
        }

        SliceOrderBook::with_levels(self.config.symbol.clone(), bids, asks)
    }
}

#[async_trait]
impl SnapshotFetcher for SimulatedExchange {
    async fn fetch_snapshot(&self) -> Result<BookSnapshot, FetchError> {
        tokio::time::sleep(self.config.fetch_latency).await;

        let mut state = self.state.lock();
        if state.rng.gen_bool(self.config.fetch_failure_probability) {
            return Err(FetchError::Request("simulated snapshot outage".into()));
        }

        let final_update_id = state.next_update_id - 1;
        let book = self.build_book(&mut state);
        Ok(BookSnapshot::new(book, final_update_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gapless_config() -> FeedConfig {
        FeedConfig {
            gap_probability: 0.0,
            fetch_failure_probability: 0.0,
            fetch_latency: Duration::ZERO,
            ..FeedConfig::default()
        }
    }

    #[test]
    fn test_updates_contiguous_without_gap_injection() {
        let exchange = SimulatedExchange::with_seed(gapless_config(), 7);

        let mut expected = 1;
        for _ in 0..100 {
            let update = exchange.next_update();
            assert_eq!(update.first_update_id, expected);
            assert!(update.final_update_id >= update.first_update_id);
            expected = update.final_update_id + 1;
        }
    }

    #[tokio::test]
    async fn test_snapshot_reflects_produced_ids() {
        let exchange = SimulatedExchange::with_seed(gapless_config(), 7);

        let update = exchange.next_update();
        let snapshot = exchange.fetch_snapshot().await.unwrap();

        assert_eq!(snapshot.final_update_id, update.final_update_id);
        assert!(!snapshot.book.is_empty());
    }
}
