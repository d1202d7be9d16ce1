//! Errors in the library.
use std::path::PathBuf;
use thiserror::Error;

/// Errors in the library.
///
/// Public operations return [`anyhow::Result`]; callers that need to tell the
/// conditions apart can use `err.downcast_ref::<FeedError>()`.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The feature set selector is unknown or has no encoder.
    #[error("unsupported feature set '{0}'")]
    UnsupportedFeatureSet(String),

    /// Replay buffer capacity must be positive.
    #[error("replay buffer capacity must be positive, got {0}")]
    InvalidCapacity(usize),

    /// Priority floor must be a positive finite number.
    #[error("priority eps must be positive, got {0}")]
    InvalidPriorityEps(f64),

    /// The stream configuration has no input files.
    #[error("no input files provided")]
    NoInputFiles,

    /// The stream configuration has a zero batch size.
    #[error("batch size must be greater than zero")]
    InvalidBatchSize,

    /// Replay probability outside `[0, 1]`.
    #[error("replay probability must be in [0, 1], got {0}")]
    InvalidReplayProb(f64),

    /// A freshly reopened stream yielded nothing.
    #[error("no data available in input files {0:?}")]
    NoData(Vec<PathBuf>),

    /// `sample` was called on a replay buffer with no entries.
    #[error("cannot sample from an empty replay buffer")]
    EmptyReplayBuffer,

    /// The configured priority metric is not one of the known selectors.
    #[error("unknown priority metric: {0}")]
    UnknownPriorityMetric(String),

    /// The two perspectives produced a different number of coordinates.
    #[error("perspective mismatch: {stm} stm coordinates vs {nstm} nstm coordinates")]
    PerspectiveMismatch {
        /// Coordinates of the side-to-move perspective.
        stm: usize,
        /// Coordinates of the other perspective.
        nstm: usize,
    },

    /// Per-slot weights of the two perspectives differ at a coordinate.
    #[error("perspective weights differ at coordinate {coordinate}")]
    PerspectiveWeightMismatch {
        /// Position of the first differing coordinate.
        coordinate: usize,
    },

    /// A position group violates its shape or range invariants.
    #[error("malformed position group: {0}")]
    MalformedGroup(String),

    /// Replay entry index out of range.
    #[error("replay entry index {index} out of range for {len} entries")]
    IndexOutOfRange {
        /// Requested position.
        index: usize,
        /// Number of stored entries.
        len: usize,
    },

    /// The device cannot be expressed as a [`Device`](crate::Device).
    #[error("unsupported device: {0}")]
    UnsupportedDevice(String),

    /// Record key error.
    #[error("Record key error: {0}")]
    RecordKeyError(String),

    /// Record value type error.
    #[error("Record value type error: {0}")]
    RecordValueTypeError(String),
}
