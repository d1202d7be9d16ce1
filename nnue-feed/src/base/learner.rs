//! Learner.
use crate::{record::Record, Batch};
use anyhow::Result;

/// Represents the network being trained together with its optimizer.
///
/// The forward/backward computation, the loss and the optimizer live behind
/// this trait; [`Trainer`](crate::Trainer) only hands batches over.
pub trait Learner {
    /// Performs an optimization step on `batch`.
    ///
    /// The returned record must contain the scalar `"loss"`.
    fn opt(&mut self, batch: &Batch) -> Result<Record>;
}
