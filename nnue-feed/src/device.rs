use crate::error::FeedError;
use anyhow::Result;
use candle_core::DeviceLocation;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq, Eq)]
/// Device where batches are placed.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// A CUDA device with the given ordinal.
    Cuda(usize),
}

impl Default for Device {
    fn default() -> Self {
        Self::Cpu
    }
}

impl Device {
    /// Opens the corresponding candle device.
    pub fn open(&self) -> Result<candle_core::Device> {
        match self {
            Self::Cpu => Ok(candle_core::Device::Cpu),
            Self::Cuda(n) => Ok(candle_core::Device::new_cuda(*n)?),
        }
    }
}

impl TryFrom<&candle_core::Device> for Device {
    type Error = FeedError;

    fn try_from(device: &candle_core::Device) -> Result<Self, Self::Error> {
        match device.location() {
            DeviceLocation::Cpu => Ok(Self::Cpu),
            DeviceLocation::Cuda { gpu_id } => Ok(Self::Cuda(gpu_id)),
            other => Err(FeedError::UnsupportedDevice(format!("{:?}", other))),
        }
    }
}
