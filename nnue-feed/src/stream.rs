//! Streaming of position groups with transparent restarts at epoch boundaries.
//!
//! [`StreamingBatchSource`] owns the current [`PositionStream`](crate::PositionStream)
//! and replaces it with a freshly opened one when it runs dry. The source
//! moves through three states on every call:
//!
//! * `Active` - the stream yields a group; `is_new_epoch` is `false`.
//! * `Exhausted` - the stream yields nothing; it is dropped and reopened.
//! * `Active'` - the reopened stream is asked exactly once. A group means a
//!   new epoch started, nothing means the inputs hold no data at all, which is
//!   fatal ([`FeedError::NoData`](crate::error::FeedError::NoData)).
//!
//! [`BatchLoader`] composes the source with a
//! [`FeatureBatchEncoder`](crate::FeatureBatchEncoder).
mod config;
mod loader;
mod memory;
mod source;
pub use config::StreamConfig;
pub use loader::BatchLoader;
pub use memory::MemoryStream;
pub use source::StreamingBatchSource;
