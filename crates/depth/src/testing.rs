//! Test utilities for driving a depth buffer without real I/O
//!
//! [`ScriptedFetcher`] hands out exactly the snapshot results a test queues,
//! in order, and parks the resync task until the next result is queued, so a
//! test controls the interleaving of fetches, resets, and deltas.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::domain::{BookSnapshot, SnapshotFetcher};
use crate::error::FetchError;

/// Snapshot source double fed by a [`SnapshotScript`]
pub struct ScriptedFetcher {
    responses: tokio::sync::Mutex<mpsc::UnboundedReceiver<Result<BookSnapshot, FetchError>>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    /// Create a fetcher/script pair
    pub fn pair() -> (Arc<Self>, SnapshotScript) {
        let (tx, rx) = mpsc::unbounded_channel();
        let fetcher = Arc::new(ScriptedFetcher {
            responses: tokio::sync::Mutex::new(rx),
            calls: AtomicUsize::new(0),
        });
        (fetcher, SnapshotScript { tx })
    }

    /// Number of fetch attempts the resync task has made so far
    pub fn fetch_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotFetcher for ScriptedFetcher {
    async fn fetch_snapshot(&self) -> Result<BookSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut responses = self.responses.lock().await;
        responses
            .recv()
            .await
            .unwrap_or_else(|| Err(FetchError::Request("snapshot script exhausted".into())))
    }
}

/// Queues snapshot results for a [`ScriptedFetcher`], in fetch order
#[derive(Clone)]
pub struct SnapshotScript {
    tx: mpsc::UnboundedSender<Result<BookSnapshot, FetchError>>,
}

impl SnapshotScript {
    pub fn succeed(&self, snapshot: BookSnapshot) {
        let _ = self.tx.send(Ok(snapshot));
    }

    pub fn fail(&self, reason: &str) {
        let _ = self.tx.send(Err(FetchError::Request(reason.into())));
    }
}

/// Poll `condition` until it holds, panicking after two seconds
pub async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met within two seconds");
}
