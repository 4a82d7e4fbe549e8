use thiserror::Error;

/// A sequence discontinuity observed on an established book
///
/// Returned by `DepthBuffer::add_update` for observability. Recovery has
/// already been triggered when the caller sees this: the baseline is cleared
/// and a new resync task is running for the offending update's epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("missing depth update: expected first update id {expected}, got {got} (gap of {})", .got - .expected)]
pub struct GapError {
    /// Update id the book expected next
    pub expected: u64,
    /// First update id actually received
    pub got: u64,
}

impl GapError {
    /// Number of update ids skipped
    pub fn gap(&self) -> u64 {
        self.got - self.expected
    }
}

/// Snapshot source failure
///
/// Never surfaced to producers; the resync task logs it and retries.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("snapshot request failed: {0}")]
    Request(String),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Resync outcomes that do not commit a baseline
#[derive(Debug, Error)]
pub(crate) enum ResyncError {
    /// A newer reset superseded the task while its fetch was in flight
    #[error("resync result discarded: task epoch {task_epoch} superseded by epoch {current_epoch}")]
    Stale { task_epoch: u64, current_epoch: u64 },
    /// The snapshot predates the buffered stream and cannot seed it;
    /// `next_epoch` is the epoch the retrying task already re-armed under
    /// the lock
    #[error(
        "depth snapshot too early: final update id {as_of} cannot reach buffered update starting at {first_buffered}"
    )]
    EarlySnapshot {
        as_of: u64,
        first_buffered: u64,
        next_epoch: u64,
    },
}
