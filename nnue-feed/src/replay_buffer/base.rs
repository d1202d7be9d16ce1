use super::{PriorityMetric, ReplayBufferConfig, SamplingMode};
use crate::{error::FeedError, Batch};
use anyhow::Result;
use candle_core::Device;
use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::VecDeque;

/// A stored batch together with its sampling priority.
#[derive(Clone, Debug)]
pub struct ReplayEntry {
    batch: Batch,
    priority: f64,
}

impl ReplayEntry {
    /// The stored batch.
    pub fn batch(&self) -> &Batch {
        &self.batch
    }

    /// Sampling priority, never below the priority floor of the buffer.
    pub fn priority(&self) -> f64 {
        self.priority
    }
}

/// Capacity-bounded history of encoded batches.
///
/// Entries are kept in insertion order. Inserting into a full buffer evicts
/// the oldest entry regardless of its priority. The buffer is owned by a
/// single training loop and is not synchronized.
///
/// # Examples
///
/// ```rust
/// use candle_core::Device;
/// use nnue_feed::{
///     replay_buffer::{ReplayBuffer, ReplayBufferConfig, SamplingMode},
///     FeatureBatchEncoder, FeatureSet, PositionGroup, PositionRecord,
/// };
///
/// # fn main() -> anyhow::Result<()> {
/// let record = PositionRecord {
///     white_to_move: true,
///     white_features: vec![0, 65],
///     black_features: vec![1, 66],
///     outcome: 1.0,
///     score: 35.0,
/// };
/// let group = PositionGroup::from_records(&[record], 32)?;
/// let batch = FeatureBatchEncoder::new(FeatureSet::HalfKp)?.encode(&group, &Device::Cpu)?;
///
/// let config = ReplayBufferConfig::default()
///     .capacity(256)
///     .sampling(SamplingMode::Prioritized)
///     .priority_metric(Some("cp_abs_mean"));
/// let mut buffer = ReplayBuffer::build(&config)?;
///
/// buffer.insert(&batch)?;
/// assert!(buffer.can_sample(1));
/// let replayed = buffer.sample()?;
/// assert_eq!(replayed.cp_values()?, vec![35.0]);
/// # Ok(())
/// # }
/// ```
pub struct ReplayBuffer {
    capacity: usize,
    entries: VecDeque<ReplayEntry>,

    /// Device of the stored batches.
    device: Device,

    sampling: SamplingMode,

    /// Metric selector as configured; parsed when a priority is computed.
    priority_metric: Option<String>,

    eps: f64,

    /// Sum of the priorities of all stored entries.
    total_priority: f64,

    /// Largest priority observed so far, starting at `1.0`.
    max_priority: f64,

    rng: StdRng,
}

impl ReplayBuffer {
    /// Builds a replay buffer.
    pub fn build(config: &ReplayBufferConfig) -> Result<Self> {
        if config.capacity == 0 {
            return Err(FeedError::InvalidCapacity(config.capacity).into());
        }
        if !(config.priority_eps > 0.0 && config.priority_eps.is_finite()) {
            return Err(FeedError::InvalidPriorityEps(config.priority_eps).into());
        }

        Ok(Self {
            capacity: config.capacity,
            entries: VecDeque::with_capacity(config.capacity),
            device: config.device.open()?,
            sampling: config.sampling,
            priority_metric: config.priority_metric.clone(),
            eps: config.priority_eps,
            total_priority: 0.0,
            max_priority: 1.0,
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// Clamps `priority` into `[eps, ceiling]`, where the ceiling keeps the
    /// sum over a full buffer finite. Non-finite values become `eps`.
    fn clamp_priority(&self, priority: f64) -> f64 {
        if priority.is_finite() {
            let ceiling = f64::MAX / (2.0 * self.capacity as f64);
            priority.max(self.eps).min(ceiling)
        } else {
            self.eps
        }
    }

    fn compute_priority(&self, batch: &Batch) -> Result<f64> {
        let priority = match &self.priority_metric {
            Some(name) => {
                let metric = name.parse::<PriorityMetric>()?;
                metric.priority(&batch.cp_values()?, self.eps)
            }
            None => self.max_priority,
        };
        Ok(self.clamp_priority(priority))
    }

    fn recompute_total_priority(&mut self) {
        self.total_priority = self.entries.iter().map(|entry| entry.priority).sum();
    }

    /// Stores a copy of `batch`, evicting the oldest entry if the buffer is
    /// full.
    ///
    /// The stored copy lives on the buffer device and never shares storage
    /// with `batch`. Fails with [`FeedError::UnknownPriorityMetric`] if the
    /// configured metric is unknown; the buffer is left unchanged then.
    pub fn insert(&mut self, batch: &Batch) -> Result<()> {
        let priority = self.compute_priority(batch)?;
        let batch = if batch.device().same_device(&self.device) {
            batch.detached_copy()?
        } else {
            batch.to_device(&self.device)?
        };

        if self.entries.len() == self.capacity {
            if let Some(evicted) = self.entries.pop_front() {
                debug!(
                    "Evicted replay entry with priority {:.6}, {} entries left",
                    evicted.priority,
                    self.entries.len()
                );
            }
        }

        self.entries.push_back(ReplayEntry { batch, priority });
        self.recompute_total_priority();
        self.max_priority = self.max_priority.max(priority);
        Ok(())
    }

    /// Returns `true` if at least `min_entries` entries are stored.
    pub fn can_sample(&self, min_entries: usize) -> bool {
        self.entries.len() >= min_entries
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of stored entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Sum of the priorities of the stored entries.
    pub fn total_priority(&self) -> f64 {
        self.total_priority
    }

    /// Largest priority observed so far.
    pub fn max_priority(&self) -> f64 {
        self.max_priority
    }

    /// Sampling mode.
    pub fn sampling(&self) -> SamplingMode {
        self.sampling
    }

    /// Device of the stored batches.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Entry at `index`, where `0` is the oldest.
    pub fn get(&self, index: usize) -> Option<&ReplayEntry> {
        self.entries.get(index)
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &ReplayEntry> {
        self.entries.iter()
    }

    /// Draws the position of an entry according to the sampling mode.
    pub fn sample_index(&mut self) -> Result<usize> {
        if self.entries.is_empty() {
            return Err(FeedError::EmptyReplayBuffer.into());
        }

        let ix = match self.sampling {
            SamplingMode::Uniform => self.rng.gen_range(0..self.entries.len()),
            SamplingMode::Prioritized => {
                let draw = self.rng.gen_range(0.0..self.total_priority.max(self.eps));
                sweep(&self.entries, draw)
            }
        };
        Ok(ix)
    }

    /// Samples a stored batch.
    ///
    /// The returned batch shares storage with the stored entry; both are
    /// immutable.
    pub fn sample(&mut self) -> Result<Batch> {
        let ix = self.sample_index()?;
        Ok(self.entries[ix].batch.clone())
    }

    /// Samples a stored batch placed on `device`.
    ///
    /// The batch is copied if `device` differs from the buffer device; the
    /// stored entry stays where it is.
    pub fn sample_to_device(&mut self, device: &Device) -> Result<Batch> {
        let batch = self.sample()?;
        if batch.device().same_device(device) {
            Ok(batch)
        } else {
            batch.to_device(device)
        }
    }

    /// Sets the priority of the entry at `index`.
    ///
    /// The priority is clamped to the priority floor; NaN and infinite values
    /// are replaced by the floor.
    pub fn update_priority(&mut self, index: usize, priority: f64) -> Result<()> {
        let len = self.entries.len();
        let priority = self.clamp_priority(priority);
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(FeedError::IndexOutOfRange { index, len })?;

        entry.priority = priority;
        self.recompute_total_priority();
        self.max_priority = self.max_priority.max(priority);
        Ok(())
    }
}

/// Position of the entry whose cumulative priority range contains `draw`.
///
/// The running sum may fall short of `draw` by rounding; the last entry is
/// returned then.
fn sweep(entries: &VecDeque<ReplayEntry>, draw: f64) -> usize {
    let mut upto = 0.0;
    entries
        .iter()
        .position(|entry| {
            upto += entry.priority;
            draw < upto
        })
        .unwrap_or_else(|| entries.len().saturating_sub(1))
}
