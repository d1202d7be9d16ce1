//! Records of training metrics.
//!
//! * [`Record`] - key-value container returned by a [`Learner`](crate::Learner)
//!   and written by the [`Trainer`](crate::Trainer).
//! * [`Recorder`] - destination of records.
//! * [`BufferedRecorder`] - keeps records in memory.
//! * [`NullRecorder`] - discards records.
//!
//! ```rust
//! use nnue_feed::record::{Record, RecordValue};
//!
//! let mut record = Record::from_scalar("loss", 0.25);
//! record.insert("epoch", RecordValue::Scalar(1.0));
//! assert_eq!(record.get_scalar("loss").unwrap(), 0.25);
//! ```
mod base;
mod buffered_recorder;
mod null_recorder;
mod recorder;

pub use base::{Record, RecordValue};
pub use buffered_recorder::BufferedRecorder;
pub use null_recorder::NullRecorder;
pub use recorder::Recorder;
