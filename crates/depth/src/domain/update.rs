use bookfeed_core::SliceOrderBook;
use serde::{Deserialize, Serialize};

/// One incremental depth update covering an inclusive update id range
///
/// Immutable once constructed; `first_update_id <= final_update_id` holds for
/// every value the constructors produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequencedUpdate {
    pub first_update_id: u64,
    pub final_update_id: u64,
    pub book: SliceOrderBook,
}

impl SequencedUpdate {
    pub fn new(first_update_id: u64, final_update_id: u64, book: SliceOrderBook) -> Self {
        debug_assert!(
            first_update_id <= final_update_id,
            "update range inverted: {first_update_id} > {final_update_id}"
        );
        SequencedUpdate {
            first_update_id,
            final_update_id,
            book,
        }
    }

    /// Update covering a single id, the common case for unaggregated feeds
    pub fn single(update_id: u64, book: SliceOrderBook) -> Self {
        SequencedUpdate::new(update_id, update_id, book)
    }
}

/// A full book capture tagged with the last update id it reflects
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub book: SliceOrderBook,
    pub final_update_id: u64,
}

impl BookSnapshot {
    pub fn new(book: SliceOrderBook, final_update_id: u64) -> Self {
        BookSnapshot {
            book,
            final_update_id,
        }
    }
}
