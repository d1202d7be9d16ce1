//! Configuration of [`ReplayBuffer`](super::ReplayBuffer).
use crate::Device;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    default::Default,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// How an entry is drawn from the replay buffer.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub enum SamplingMode {
    /// Every stored entry is equally likely.
    Uniform,

    /// Entries are drawn with probability `priority / total_priority`.
    Prioritized,
}

/// Configuration of the replay buffer.
///
/// # Examples
///
/// ```rust
/// use nnue_feed::replay_buffer::{ReplayBufferConfig, SamplingMode};
///
/// let config = ReplayBufferConfig::default()
///     .capacity(512)
///     .sampling(SamplingMode::Prioritized)
///     .priority_metric(Some("cp_abs_mean"));
/// ```
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ReplayBufferConfig {
    /// Maximum number of stored batches. The oldest batch is evicted when a
    /// new one arrives at capacity.
    pub capacity: usize,

    /// Device holding the stored batches.
    pub device: Device,

    /// Sampling mode.
    pub sampling: SamplingMode,

    /// Selector of the priority metric (`cp_norm`, `cp_abs_mean`, `cp_var`).
    /// If `None`, new entries receive the largest priority seen so far.
    pub priority_metric: Option<String>,

    /// Floor of every priority.
    pub priority_eps: f64,

    /// Random seed used for sampling.
    pub seed: u64,
}

impl Default for ReplayBufferConfig {
    fn default() -> Self {
        Self {
            capacity: 1024,
            device: Device::Cpu,
            sampling: SamplingMode::Uniform,
            priority_metric: None,
            priority_eps: 1e-6,
            seed: 42,
        }
    }
}

impl ReplayBufferConfig {
    /// Sets the capacity of the replay buffer.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the device of the stored batches.
    pub fn device(mut self, device: Device) -> Self {
        self.device = device;
        self
    }

    /// Sets the sampling mode.
    pub fn sampling(mut self, sampling: SamplingMode) -> Self {
        self.sampling = sampling;
        self
    }

    /// Sets the priority metric selector.
    pub fn priority_metric(mut self, priority_metric: Option<impl Into<String>>) -> Self {
        self.priority_metric = priority_metric.map(Into::into);
        self
    }

    /// Sets the priority floor.
    pub fn priority_eps(mut self, priority_eps: f64) -> Self {
        self.priority_eps = priority_eps;
        self
    }

    /// Sets the random seed for sampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Constructs [`ReplayBufferConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ReplayBufferConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_replay_buffer_config() -> Result<()> {
        let config = ReplayBufferConfig::default()
            .capacity(64)
            .sampling(SamplingMode::Prioritized)
            .priority_metric(Some("cp_var"))
            .seed(7);

        let dir = TempDir::new("replay_buffer_config")?;
        let path = dir.path().join("replay_buffer_config.yaml");
        println!("{:?}", path);

        config.save(&path)?;
        let config_ = ReplayBufferConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }
}
