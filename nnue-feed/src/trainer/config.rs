//! Configuration of [`Trainer`](super::Trainer).
use crate::Device;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// Number of epochs to train for.
    pub epochs: usize,

    /// Probability of training on a replayed batch instead of the fresh one.
    pub replay_prob: f64,

    /// Minimum number of stored batches before replay is considered.
    pub replay_min_batches: usize,

    /// Interval of loss reports in positions.
    pub log_interval: usize,

    /// Device on which batches are read and trained.
    pub device: Device,

    /// Random seed of the replay decision.
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            epochs: 1,
            replay_prob: 0.0,
            replay_min_batches: 1,
            log_interval: 10_000_000,
            device: Device::Cpu,
            seed: 42,
        }
    }
}

impl TrainerConfig {
    /// Sets the number of epochs.
    pub fn epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    /// Sets the replay probability.
    pub fn replay_prob(mut self, replay_prob: f64) -> Self {
        self.replay_prob = replay_prob;
        self
    }

    /// Sets the minimum number of stored batches for replay.
    pub fn replay_min_batches(mut self, replay_min_batches: usize) -> Self {
        self.replay_min_batches = replay_min_batches;
        self
    }

    /// Sets the interval of loss reports in positions.
    pub fn log_interval(mut self, log_interval: usize) -> Self {
        self.log_interval = log_interval;
        self
    }

    /// Sets the training device.
    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
