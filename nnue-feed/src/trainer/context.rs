use candle_core::Device;

/// State shared by the calls of one training run.
///
/// The trainer owns the context and passes it to the loader, so reads and
/// training steps agree on the device and the epoch.
#[derive(Debug, Clone)]
pub struct TrainingContext {
    device: Device,
    epoch: usize,
    log_interval: usize,
}

impl TrainingContext {
    /// Creates a context at epoch 0.
    pub fn new(device: Device, log_interval: usize) -> Self {
        Self {
            device,
            epoch: 0,
            log_interval,
        }
    }

    /// Device on which batches are placed.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Number of completed epochs.
    pub fn epoch(&self) -> usize {
        self.epoch
    }

    /// Interval of loss reports in positions.
    pub fn log_interval(&self) -> usize {
        self.log_interval
    }

    /// Counts one more completed epoch and returns the new count.
    pub fn advance_epoch(&mut self) -> usize {
        self.epoch += 1;
        self.epoch
    }
}
