use super::{StreamConfig, StreamingBatchSource};
use crate::{Batch, FeatureBatchEncoder, StreamOpener, TrainingContext};
use anyhow::Result;

/// Reads encoded batches: a [`StreamingBatchSource`] followed by a
/// [`FeatureBatchEncoder`].
pub struct BatchLoader<O: StreamOpener> {
    source: StreamingBatchSource<O>,
    encoder: FeatureBatchEncoder,
}

impl<O: StreamOpener> BatchLoader<O> {
    /// Builds the encoder and the source for `config`.
    pub fn build(config: StreamConfig, opener: O) -> Result<Self> {
        let encoder = FeatureBatchEncoder::new(config.feature_set)?;
        let source = StreamingBatchSource::build(config, opener)?;
        Ok(Self { source, encoder })
    }

    /// The underlying source.
    pub fn source(&self) -> &StreamingBatchSource<O> {
        &self.source
    }

    /// Reads the next batch onto the device of `ctx`.
    ///
    /// The flag is `true` if the batch is the first one of a new epoch.
    pub fn read_batch(&mut self, ctx: &TrainingContext) -> Result<(bool, Batch)> {
        let (is_new_epoch, group) = self.source.next_group()?;
        let batch = self.encoder.encode(&group, ctx.device())?;
        Ok((is_new_epoch, batch))
    }
}
