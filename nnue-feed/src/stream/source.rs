use super::StreamConfig;
use crate::{error::FeedError, PositionGroup, PositionStream, StreamOpener};
use anyhow::Result;
use log::{info, warn};

/// Pulls position groups from an upstream stream and restarts it when it is
/// exhausted.
///
/// The source exclusively owns its current stream. A restart drops the old
/// stream before the new one is opened, so at most one handle is open.
pub struct StreamingBatchSource<O: StreamOpener> {
    opener: O,
    config: StreamConfig,

    /// `None` only between dropping an exhausted stream and a successful
    /// reopen.
    stream: Option<O::Stream>,

    /// Number of restarts, i.e. epoch boundaries seen so far.
    restarts: usize,
}

impl<O: StreamOpener> StreamingBatchSource<O> {
    /// Validates `config` and opens the first stream.
    ///
    /// Fails with [`FeedError::NoInputFiles`], [`FeedError::InvalidBatchSize`]
    /// or [`FeedError::UnsupportedFeatureSet`] before anything is opened.
    pub fn build(config: StreamConfig, mut opener: O) -> Result<Self> {
        config.validate()?;
        if config.cyclic {
            warn!("Cyclic input streams never run dry; epoch boundaries will not be signalled");
        }

        let stream = opener.open(&config)?;
        info!(
            "Opened {} stream over {} file(s), batch size {}",
            config.feature_set,
            config.files.len(),
            config.batch_size
        );

        Ok(Self {
            opener,
            config,
            stream: Some(stream),
            restarts: 0,
        })
    }

    /// The stream configuration.
    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// Number of times the stream has been reopened.
    pub fn restarts(&self) -> usize {
        self.restarts
    }

    /// Returns the next group and whether it starts a new epoch.
    ///
    /// On exhaustion the stream is reopened over the same inputs and asked
    /// once more. If the fresh stream is empty as well, this fails with
    /// [`FeedError::NoData`]; the caller must not retry.
    pub fn next_group(&mut self) -> Result<(bool, PositionGroup)> {
        if let Some(stream) = self.stream.as_mut() {
            if let Some(group) = stream.next_group()? {
                return Ok((false, self.checked(group)?));
            }
        }

        self.stream = None;
        let stream = self.stream.insert(self.opener.open(&self.config)?);
        self.restarts += 1;
        info!("Input stream exhausted, reopened (restart {})", self.restarts);

        match stream.next_group()? {
            Some(group) => Ok((true, self.checked(group)?)),
            None => Err(FeedError::NoData(self.config.files.clone()).into()),
        }
    }

    fn checked(&self, group: PositionGroup) -> Result<PositionGroup, FeedError> {
        group.validate()?;
        if group.is_empty() {
            return Err(FeedError::MalformedGroup(
                "stream yielded an empty group".to_string(),
            ));
        }
        Ok(group)
    }
}
