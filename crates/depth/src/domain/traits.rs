use async_trait::async_trait;

use super::update::BookSnapshot;
use crate::error::FetchError;

/// Trait for fetching full book snapshots
///
/// The resync task calls this repeatedly until a fetch succeeds, so
/// implementations must be safe to invoke more than once. Timeout behavior
/// belongs to the implementation; the caller imposes none.
#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    async fn fetch_snapshot(&self) -> Result<BookSnapshot, FetchError>;
}
