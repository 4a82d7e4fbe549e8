use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::DepthConfig;
use crate::domain::{BookSnapshot, SequencedUpdate, SnapshotFetcher, SyncStatus};
use crate::error::{GapError, ResyncError};

use super::coordinator::ResetCoordinator;
use super::dispatch::{DepthEvent, EventDispatcher};

/// Reconciliation buffer for a snapshot-plus-delta depth feed
///
/// Producers feed sequence-numbered deltas through [`add_update`]; the
/// buffer queues them while no baseline snapshot exists and arms exactly one
/// background resync task per epoch. The task fetches a snapshot through the
/// [`SnapshotFetcher`], replays the queued deltas that extend past it, and
/// commits the result. From then on contiguous deltas flow straight through
/// as `push` events; any discontinuity invalidates the baseline and starts
/// the cycle again under a new epoch.
///
/// All mutable state sits behind one exclusive lock. The lock is never held
/// across a snapshot fetch or across subscriber callbacks, so a subscriber
/// may call back into the buffer from its handler.
///
/// Cloning is cheap; all clones share the same state.
///
/// [`add_update`]: DepthBuffer::add_update
#[derive(Clone)]
pub struct DepthBuffer {
    shared: Arc<Shared>,
}

struct Shared {
    fetcher: Arc<dyn SnapshotFetcher>,
    config: DepthConfig,
    state: Mutex<BufferState>,
    events: EventDispatcher,
}

struct BufferState {
    /// Baseline snapshot; `None` while deltas are being buffered
    snapshot: Option<BookSnapshot>,
    /// Last update id applied on top of the baseline
    final_update_id: u64,
    /// Deltas accumulated while no baseline exists, in arrival order
    buffer: Vec<SequencedUpdate>,
    coordinator: ResetCoordinator,
    last_update_at: Instant,
}

impl DepthBuffer {
    pub fn new(fetcher: Arc<dyn SnapshotFetcher>, config: DepthConfig) -> Self {
        DepthBuffer {
            shared: Arc::new(Shared {
                fetcher,
                config,
                state: Mutex::new(BufferState {
                    snapshot: None,
                    final_update_id: 0,
                    buffer: Vec::new(),
                    coordinator: ResetCoordinator::new(),
                    last_update_at: Instant::now(),
                }),
                events: EventDispatcher::new(),
            }),
        }
    }

    /// Subscribe to reset events (baseline invalidated)
    pub fn on_reset(&self, handler: impl Fn() + Send + Sync + 'static) {
        self.shared.events.on_reset(handler);
    }

    /// Subscribe to ready events (baseline committed, buffered deltas
    /// replayed in arrival order)
    pub fn on_ready(
        &self,
        handler: impl Fn(&BookSnapshot, &[SequencedUpdate]) + Send + Sync + 'static,
    ) {
        self.shared.events.on_ready(handler);
    }

    /// Subscribe to push events (delta applied on an established baseline)
    pub fn on_push(&self, handler: impl Fn(&SequencedUpdate) + Send + Sync + 'static) {
        self.shared.events.on_push(handler);
    }

    /// Feed one delta into the buffer
    ///
    /// While no baseline exists the delta is queued and this epoch's resync
    /// task is started if it is not running yet. With a baseline, a
    /// contiguous delta is applied and pushed to subscribers; a
    /// discontinuity clears the baseline, seeds a fresh queue with the
    /// offending delta, starts a new resync under a new epoch, and is
    /// reported back to the caller. The error is informational only, the
    /// recovery is already under way.
    ///
    /// Must be called from within a tokio runtime: the first delta of an
    /// epoch spawns the background resync task.
    pub fn add_update(&self, update: SequencedUpdate) -> Result<(), GapError> {
        let mut deferred = None;
        let result = {
            let mut state = self.shared.state.lock();
            state.last_update_at = Instant::now();

            if state.snapshot.is_none() {
                state.buffer.push(update);
                if let Some(epoch) = state.coordinator.try_arm() {
                    self.spawn_resync(epoch);
                }
                Ok(())
            } else {
                let expected = state.final_update_id + 1;
                if update.first_update_id > expected {
                    let err = GapError {
                        expected,
                        got: update.first_update_id,
                    };
                    state.snapshot = None;
                    state.final_update_id = 0;
                    state.buffer.clear();
                    state.buffer.push(update);
                    state.coordinator.advance();
                    // the queue already holds the new epoch's first delta,
                    // so the resync starts now rather than on the next call
                    if let Some(epoch) = state.coordinator.try_arm() {
                        self.spawn_resync(epoch);
                    }
                    deferred = Some(DepthEvent::Reset);
                    Err(err)
                } else {
                    tracing::debug!(
                        "depth update id {} -> {}",
                        state.final_update_id,
                        update.final_update_id
                    );
                    state.final_update_id = update.final_update_id;
                    deferred = Some(DepthEvent::Push(update));
                    Ok(())
                }
            }
        };

        if let Some(event) = deferred {
            self.shared.events.dispatch(event);
        }
        result
    }

    /// Clear the baseline and start over under a new epoch
    ///
    /// Safe to call repeatedly and concurrently with in-flight updates; the
    /// next delta to arrive starts the new epoch's resync task. An in-flight
    /// resync for the old epoch discards its result when it completes.
    pub fn reset(&self) {
        {
            let mut state = self.shared.state.lock();
            state.snapshot = None;
            state.final_update_id = 0;
            state.buffer.clear();
            state.coordinator.advance();
        }
        self.shared.events.dispatch(DepthEvent::Reset);
    }

    /// Current synchronization state
    pub fn status(&self) -> SyncStatus {
        let state = self.shared.state.lock();
        if state.snapshot.is_some() {
            SyncStatus::Ready
        } else if state.buffer.is_empty() && !state.coordinator.is_armed() {
            SyncStatus::Empty
        } else {
            SyncStatus::Buffering
        }
    }

    /// Last update id applied on top of the baseline (0 before the first
    /// commit)
    pub fn last_update_id(&self) -> u64 {
        self.shared.state.lock().final_update_id
    }

    /// Current resync epoch
    pub fn current_epoch(&self) -> u64 {
        self.shared.state.lock().coordinator.current_epoch()
    }

    pub fn config(&self) -> &DepthConfig {
        &self.shared.config
    }

    pub(crate) fn last_update_elapsed(&self) -> Duration {
        self.shared.state.lock().last_update_at.elapsed()
    }

    fn spawn_resync(&self, epoch: u64) {
        let buffer = self.clone();
        tokio::spawn(async move {
            buffer.run_resync(epoch).await;
        });
    }

    /// Background resynchronization: fetch a baseline, replay the queue,
    /// commit. Retries until it commits or its epoch is superseded.
    async fn run_resync(self, mut epoch: u64) {
        let buffering = self.shared.config.buffering_period();
        if !buffering.is_zero() {
            tokio::time::sleep(buffering).await;
        }

        loop {
            if !self.shared.state.lock().coordinator.is_current(epoch) {
                tracing::debug!("resync for epoch {} superseded before fetch, stopping", epoch);
                return;
            }

            let snapshot = match self.shared.fetcher.fetch_snapshot().await {
                Ok(snapshot) => snapshot,
                Err(err) => {
                    tracing::error!("depth snapshot fetch failed, retrying: {err}");
                    tokio::time::sleep(self.shared.config.fetch_retry_delay()).await;
                    continue;
                }
            };

            match self.commit_snapshot(epoch, snapshot) {
                Ok(()) => return,
                Err(ResyncError::Stale {
                    task_epoch,
                    current_epoch,
                }) => {
                    tracing::debug!(
                        "discarding resync result: task epoch {} superseded by {}",
                        task_epoch,
                        current_epoch
                    );
                    return;
                }
                Err(ResyncError::EarlySnapshot {
                    as_of,
                    first_buffered,
                    next_epoch,
                }) => {
                    tracing::warn!(
                        "depth snapshot too early: final update id {} cannot reach buffered update starting at {}, resyncing",
                        as_of,
                        first_buffered
                    );
                    self.shared.events.dispatch(DepthEvent::Reset);
                    // carry on as the new epoch's task; commit_snapshot
                    // already re-armed the coordinator under the lock
                    epoch = next_epoch;
                }
            }
        }
    }

    /// Validate a fetched snapshot against the pending queue and commit it
    ///
    /// The replay list keeps arrival order. Updates the snapshot already
    /// covers are dropped wholesale; a snapshot older than the buffered
    /// stream cannot seed the book, so the queue is discarded and the caller
    /// retries under the fresh epoch carried in the error.
    fn commit_snapshot(&self, epoch: u64, snapshot: BookSnapshot) -> Result<(), ResyncError> {
        let event = {
            let mut state = self.shared.state.lock();
            if !state.coordinator.is_current(epoch) {
                return Err(ResyncError::Stale {
                    task_epoch: epoch,
                    current_epoch: state.coordinator.current_epoch(),
                });
            }

            let buffered = std::mem::take(&mut state.buffer);
            let mut running = snapshot.final_update_id;
            let mut replay = Vec::new();
            for update in buffered {
                if update.first_update_id < running + 1 {
                    // already covered by the snapshot
                    continue;
                }
                if update.first_update_id > running + 1 {
                    let next_epoch = state.coordinator.advance();
                    let armed = state.coordinator.try_arm();
                    debug_assert_eq!(armed, Some(next_epoch));
                    return Err(ResyncError::EarlySnapshot {
                        as_of: snapshot.final_update_id,
                        first_buffered: update.first_update_id,
                        next_epoch,
                    });
                }
                running = update.final_update_id;
                replay.push(update);
            }

            tracing::debug!(
                "depth snapshot committed, final update id {} -> {}",
                snapshot.final_update_id,
                running
            );
            state.final_update_id = running;
            state.snapshot = Some(snapshot.clone());
            DepthEvent::Ready(snapshot, replay)
        };

        self.shared.events.dispatch(event);
        Ok(())
    }
}
