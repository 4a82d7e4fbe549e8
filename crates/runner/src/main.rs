mod sim;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use bookfeed_depth::{DepthBuffer, DepthConfig};

use crate::sim::{FeedConfig, SimulatedExchange};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::from_default_env()
                .add_directive("bookfeed_runner=info".parse()?)
                .add_directive("bookfeed_depth=info".parse()?),
        )
        .init();

    tracing::info!("starting simulated depth feed...");

    let exchange = Arc::new(SimulatedExchange::new(FeedConfig::default()));
    let config = DepthConfig::new()
        .with_buffering_period(Duration::from_millis(300))
        .with_update_timeout(Duration::from_secs(5))
        .with_fetch_retry_delay(Duration::from_millis(500));

    let buffer = DepthBuffer::new(exchange.clone(), config);

    buffer.on_reset(|| tracing::info!("book invalidated, resynchronizing"));
    buffer.on_ready(|snapshot, replayed| {
        tracing::info!(
            "book ready at update id {} ({} buffered deltas replayed)",
            snapshot.final_update_id,
            replayed.len()
        );
    });
    buffer.on_push(|update| {
        if let Some(bid) = update.book.best_bid() {
            tracing::debug!(
                "delta {}..{} best bid {}",
                update.first_update_id,
                update.final_update_id,
                bid
            );
        }
    });

    let _watchdog = buffer.spawn_watchdog();

    for _ in 0..500 {
        let update = exchange.next_update();
        if let Err(gap) = buffer.add_update(update) {
            tracing::warn!("feed dropped a range: {gap}");
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    tracing::info!(
        "feed finished: status {:?}, last update id {}",
        buffer.status(),
        buffer.last_update_id()
    );
    Ok(())
}
