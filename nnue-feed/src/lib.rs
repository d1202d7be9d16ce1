#![warn(missing_docs)]
//! Training batches for NNUE chess evaluation networks.
//!
//! Decoded position groups are pulled from an upstream stream by a
//! [`stream::StreamingBatchSource`], which restarts the stream at epoch
//! boundaries. A [`FeatureBatchEncoder`] turns each group into a sparse
//! coordinate-format [`Batch`]. A [`replay_buffer::ReplayBuffer`] keeps a
//! bounded history of recent batches for uniform or priority-weighted
//! resampling, and the [`Trainer`] drives all of them against a
//! [`Learner`].
pub mod error;
pub mod record;
pub mod replay_buffer;
pub mod stream;

mod base;
pub use base::{Learner, PositionStream, StreamOpener};

mod batch;
pub use batch::Batch;

mod device;
pub use device::Device;

mod encoder;
pub use encoder::{decode, FeatureBatchEncoder, SIDE_TO_MOVE_THRESHOLD};

mod feature_set;
pub use feature_set::{FeatureSet, FeatureSetInfo};

mod group;
pub use group::{PositionGroup, PositionRecord, SENTINEL};

mod trainer;
pub use trainer::{TrainStats, Trainer, TrainerConfig, TrainingContext};
