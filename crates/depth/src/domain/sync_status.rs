/// Synchronization state of a depth buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No baseline, no pending deltas, no resync in flight
    Empty,
    /// Buffering deltas while a resync task fetches a baseline
    Buffering,
    /// Baseline established, deltas applied directly
    Ready,
}

impl SyncStatus {
    /// Check if deltas flow straight through to subscribers
    pub fn is_ready(&self) -> bool {
        matches!(self, SyncStatus::Ready)
    }

    /// Check if a baseline snapshot is still needed
    pub fn needs_snapshot(&self) -> bool {
        matches!(self, SyncStatus::Empty | SyncStatus::Buffering)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_status_ready() {
        assert!(!SyncStatus::Empty.is_ready());
        assert!(!SyncStatus::Buffering.is_ready());
        assert!(SyncStatus::Ready.is_ready());
    }

    #[test]
    fn test_sync_status_needs_snapshot() {
        assert!(SyncStatus::Empty.needs_snapshot());
        assert!(SyncStatus::Buffering.needs_snapshot());
        assert!(!SyncStatus::Ready.needs_snapshot());
    }
}
