//! Train a [`Learner`] on streamed and replayed batches.
mod config;
mod context;
use crate::{
    error::FeedError,
    record::{Record, RecordValue, Recorder},
    replay_buffer::ReplayBuffer,
    stream::BatchLoader,
    Learner, StreamOpener,
};
use anyhow::Result;
use chrono::Local;
pub use config::TrainerConfig;
pub use context::TrainingContext;
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::time::SystemTime;

/// Counters of a finished training run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrainStats {
    /// Completed epochs.
    pub epochs: usize,

    /// Optimization steps.
    pub steps: usize,

    /// Positions the learner was trained on, replayed ones included.
    pub positions: usize,

    /// Steps that trained on a replayed batch.
    pub replay_steps: usize,
}

/// Running sums reset at every epoch boundary or report.
#[derive(Default)]
struct Window {
    loss: f64,
    steps: usize,
    positions: usize,
    replay_steps: usize,
}

impl Window {
    fn add(&mut self, loss: f64, positions: usize, replayed: bool) {
        self.loss += loss;
        self.steps += 1;
        self.positions += positions;
        if replayed {
            self.replay_steps += 1;
        }
    }

    fn mean_loss(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.loss / self.steps as f64
        }
    }

    fn replay_ratio(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.replay_steps as f64 / self.steps as f64
        }
    }
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Manages the training loop.
///
/// # Training loop
///
/// 1. Read a batch with [`BatchLoader::read_batch`]. If it starts a new
///    epoch, count the epoch, report the mean loss and positions per second
///    of the finished one, and reset the epoch counters.
/// 2. If a replay buffer is given, insert the fresh batch. Then, if
///    `replay_prob > 0`, at least `replay_min_batches` batches are stored
///    and a uniform draw is below `replay_prob`, train on a replayed batch
///    instead of the fresh one.
/// 3. Do an optimization step with [`Learner::opt`] and accumulate the
///    `"loss"` it reports.
/// 4. Once more than `log_interval` positions were trained on since the last
///    report, write the running loss and the replay ratio.
/// 5. Stop when the number of completed epochs reaches `epochs`.
///
/// The batch that starts the last epoch is still trained on.
///
/// # Interaction of objects
///
/// ```mermaid
/// graph LR
///     A[PositionStream]-->|PositionGroup|B[StreamingBatchSource]
///     B -->|"(is_new_epoch, PositionGroup)"|C[FeatureBatchEncoder]
///     C -->|Batch|D[Trainer]
///     D -->|Batch|E[ReplayBuffer]
///     E -->|Batch|D
///     D -->|Batch|F[Learner]
///     F -->|Record|D
///     D -->|Record|G[Recorder]
/// ```
pub struct Trainer {
    epochs: usize,
    replay_prob: f64,
    replay_min_batches: usize,
    ctx: TrainingContext,

    /// Drives the replay decision.
    rng: StdRng,
}

impl Trainer {
    /// Constructs a trainer.
    ///
    /// Fails with [`FeedError::InvalidReplayProb`] if `replay_prob` is not in
    /// `[0, 1]`.
    pub fn build(config: &TrainerConfig) -> Result<Self> {
        if !(0.0..=1.0).contains(&config.replay_prob) {
            return Err(FeedError::InvalidReplayProb(config.replay_prob).into());
        }

        Ok(Self {
            epochs: config.epochs,
            replay_prob: config.replay_prob,
            replay_min_batches: config.replay_min_batches,
            ctx: TrainingContext::new(config.device.open()?, config.log_interval),
            rng: StdRng::seed_from_u64(config.seed),
        })
    }

    /// The training context.
    pub fn context(&self) -> &TrainingContext {
        &self.ctx
    }

    fn should_replay(&mut self, buffer: &ReplayBuffer) -> bool {
        self.replay_prob > 0.0
            && buffer.can_sample(self.replay_min_batches)
            && self.rng.gen::<f64>() < self.replay_prob
    }

    /// Trains `learner` until `epochs` epochs are completed.
    pub fn train<L, O, R>(
        &mut self,
        learner: &mut L,
        loader: &mut BatchLoader<O>,
        mut replay: Option<&mut ReplayBuffer>,
        recorder: &mut R,
    ) -> Result<TrainStats>
    where
        L: Learner,
        O: StreamOpener,
        R: Recorder,
    {
        info!(
            "Training for {} epoch(s) on {:?}, replay probability {}",
            self.epochs,
            self.ctx.device(),
            self.replay_prob
        );

        let mut stats = TrainStats::default();
        let mut epoch = Window::default();
        let mut since_log = Window::default();
        let mut timer = SystemTime::now();

        while self.ctx.epoch() < self.epochs {
            let (is_new_epoch, fresh) = loader.read_batch(&self.ctx)?;

            if is_new_epoch {
                let n = self.ctx.advance_epoch();
                let secs = timer.elapsed()?.as_secs_f64();
                let pos_per_sec = if secs > 0.0 {
                    epoch.positions as f64 / secs
                } else {
                    0.0
                };
                info!(
                    "Epoch {}: train loss {:.6}, {:.0} pos/s, replay ratio {:.2}",
                    n,
                    epoch.mean_loss(),
                    pos_per_sec,
                    epoch.replay_ratio()
                );

                let mut record = Record::from_scalar("epoch", n as f32);
                record.insert("epoch_loss", RecordValue::Scalar(epoch.mean_loss() as f32));
                record.insert("pos_per_sec", RecordValue::Scalar(pos_per_sec as f32));
                record.insert("datetime", RecordValue::DateTime(Local::now()));
                recorder.write(record);

                epoch = Window::default();
                timer = SystemTime::now();
            }

            let (batch, replayed) = match replay.as_deref_mut() {
                Some(buffer) => {
                    buffer.insert(&fresh)?;
                    if self.should_replay(buffer) {
                        (buffer.sample_to_device(self.ctx.device())?, true)
                    } else {
                        (fresh, false)
                    }
                }
                None => (fresh, false),
            };

            let record = learner.opt(&batch)?;
            let loss = record.get_scalar("loss")? as f64;
            epoch.add(loss, batch.len(), replayed);
            since_log.add(loss, batch.len(), replayed);
            stats.steps += 1;
            stats.positions += batch.len();
            if replayed {
                stats.replay_steps += 1;
            }

            if since_log.positions > self.ctx.log_interval() {
                info!(
                    "At {} positions: running loss {:.6}, replay ratio {:.2}",
                    epoch.positions,
                    since_log.mean_loss(),
                    epoch.replay_ratio()
                );

                let mut report = Record::from_scalar("loss", since_log.mean_loss() as f32);
                report.insert("positions", RecordValue::Scalar(epoch.positions as f32));
                report.insert("replay_ratio", RecordValue::Scalar(epoch.replay_ratio() as f32));
                report.insert("datetime", RecordValue::DateTime(Local::now()));
                recorder.write(record.merge(report));

                since_log = Window::default();
            }
        }

        recorder.flush();
        stats.epochs = self.ctx.epoch();
        info!(
            "Finished training: {} step(s), {} position(s), {} replayed",
            stats.steps, stats.positions, stats.replay_steps
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_replay_prob_is_validated() {
        for p in [-0.1, 1.5, f64::NAN].iter() {
            let err = Trainer::build(&TrainerConfig::default().replay_prob(*p))
                .err()
                .unwrap();
            assert!(matches!(
                err.downcast_ref::<FeedError>(),
                Some(FeedError::InvalidReplayProb(_))
            ));
        }
        assert!(Trainer::build(&TrainerConfig::default().replay_prob(1.0)).is_ok());
    }

    #[test]
    fn test_window() {
        let mut w = Window::default();
        assert_eq!(w.mean_loss(), 0.0);
        w.add(1.0, 4, false);
        w.add(3.0, 4, true);
        assert_eq!(w.mean_loss(), 2.0);
        assert_eq!(w.replay_ratio(), 0.5);
        assert_eq!(w.positions, 8);
    }
}
