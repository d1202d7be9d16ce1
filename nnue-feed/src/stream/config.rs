//! Configuration of input streams.
use crate::{error::FeedError, FeatureSet};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of an input stream.
///
/// Passed unchanged to the [`StreamOpener`](crate::StreamOpener) every time a
/// stream is (re)opened.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct StreamConfig {
    /// Feature set of the decoded groups.
    pub feature_set: FeatureSet,

    /// Input record files, read in order.
    pub files: Vec<PathBuf>,

    /// Number of positions per group.
    pub batch_size: usize,

    /// If `true`, the stream wraps around the file list and never reports
    /// exhaustion.
    pub cyclic: bool,

    /// Number of reader workers.
    pub num_workers: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            feature_set: FeatureSet::HalfKp,
            files: vec![],
            batch_size: 16384,
            cyclic: false,
            num_workers: 1,
        }
    }
}

impl StreamConfig {
    /// Sets the feature set.
    pub fn feature_set(mut self, feature_set: FeatureSet) -> Self {
        self.feature_set = feature_set;
        self
    }

    /// Sets the input files.
    pub fn files<P: Into<PathBuf>>(mut self, files: impl IntoIterator<Item = P>) -> Self {
        self.files = files.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the number of positions per group.
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Sets whether the stream wraps around.
    pub fn cyclic(mut self, cyclic: bool) -> Self {
        self.cyclic = cyclic;
        self
    }

    /// Sets the number of reader workers.
    pub fn num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Checks the configuration before any stream is opened.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.files.is_empty() {
            return Err(FeedError::NoInputFiles);
        }
        if self.batch_size == 0 {
            return Err(FeedError::InvalidBatchSize);
        }
        self.feature_set.ensure_supported()?;
        Ok(())
    }

    /// Constructs [`StreamConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`StreamConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
