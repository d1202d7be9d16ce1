//! Replay buffer of encoded batches.
//!
//! [`ReplayBuffer`] keeps the most recent `capacity` batches. Retention is
//! strictly FIFO by insertion order; priorities only affect the probability
//! of an entry being sampled.
mod base;
mod config;
mod priority;
pub use base::{ReplayBuffer, ReplayEntry};
pub use config::{ReplayBufferConfig, SamplingMode};
pub use priority::PriorityMetric;
