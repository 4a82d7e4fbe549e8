//! Depth stream synchronization.
//!
//! Turns two unreliable, independently timed market data sources, a slow
//! pull-based snapshot fetch and a fast push-based stream of
//! sequence-numbered deltas, into one consistent, gap-free feed of book
//! events.
//!
//! ```text
//! producer ──add_update──▶ DepthBuffer ──reset/ready/push──▶ subscribers
//!                              │  ▲
//!                        spawn │  │ commit
//!                              ▼  │
//!                          resync task ──fetch_snapshot──▶ SnapshotFetcher
//! ```
//!
//! While no baseline snapshot exists the buffer queues incoming deltas and
//! arms exactly one background resync task per epoch. The task fetches a
//! snapshot, replays the queued deltas that extend past it, and commits the
//! result as the `ready` event. From then on contiguous deltas pass straight
//! through as `push` events. Any sequence discontinuity, explicit reset, or
//! watchdog timeout invalidates the baseline and restarts the cycle under a
//! new epoch; a superseded resync task discards its result instead of
//! racing the new one.

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod testing;

// Re-export the public surface at the crate root

// Application layer
pub use application::DepthBuffer;

// Config layer
pub use config::DepthConfig;

// Domain layer
pub use domain::{BookSnapshot, SequencedUpdate, SnapshotFetcher, SyncStatus};

// Errors
pub use error::{FetchError, GapError};
