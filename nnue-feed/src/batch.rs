//! Sparse training batch.
use anyhow::Result;
use candle_core::{Device, Tensor};

/// A training batch in coordinate format.
///
/// * `stm_indices`, `nstm_indices` - `[nnz, 2]` tensors of `(row, feature_id)`
///   pairs (`i64`), one per perspective.
/// * `values` - `[nnz]` weights (`f32`) parallel to the coordinates.
/// * `cp` - `[size, 1]` evaluation targets (`f32`).
/// * `wdl` - `[size, 1]` outcome labels in `[0, 1]` (`f32`).
///
/// Tensors are never mutated after construction. Cloning a batch shares the
/// underlying storage; use [`Batch::detached_copy`] for an independent copy.
#[derive(Clone, Debug)]
pub struct Batch {
    stm_indices: Tensor,
    nstm_indices: Tensor,
    values: Tensor,
    cp: Tensor,
    wdl: Tensor,
    size: usize,
}

impl Batch {
    /// Assembles a batch from its tensors.
    pub fn new(
        stm_indices: Tensor,
        nstm_indices: Tensor,
        values: Tensor,
        cp: Tensor,
        wdl: Tensor,
        size: usize,
    ) -> Self {
        Self {
            stm_indices,
            nstm_indices,
            values,
            cp,
            wdl,
            size,
        }
    }

    /// Coordinates of the side-to-move perspective.
    pub fn stm_indices(&self) -> &Tensor {
        &self.stm_indices
    }

    /// Coordinates of the other perspective.
    pub fn nstm_indices(&self) -> &Tensor {
        &self.nstm_indices
    }

    /// Weights of the coordinates.
    pub fn values(&self) -> &Tensor {
        &self.values
    }

    /// Evaluation targets.
    pub fn cp(&self) -> &Tensor {
        &self.cp
    }

    /// Outcome labels.
    pub fn wdl(&self) -> &Tensor {
        &self.wdl
    }

    /// Number of positions.
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the batch holds no positions.
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of coordinate entries per perspective.
    pub fn nnz(&self) -> usize {
        self.values.elem_count()
    }

    /// Device holding the tensors.
    pub fn device(&self) -> &Device {
        self.cp.device()
    }

    /// Evaluation targets as a flat vector.
    pub fn cp_values(&self) -> Result<Vec<f32>> {
        Ok(self.cp.flatten_all()?.to_vec1::<f32>()?)
    }

    /// Returns a copy of the batch placed on `device`.
    pub fn to_device(&self, device: &Device) -> Result<Self> {
        self.try_map(|t| t.to_device(device))
    }

    /// Returns a copy of the batch backed by freshly allocated storage.
    pub fn detached_copy(&self) -> Result<Self> {
        self.try_map(|t| t.copy())
    }

    fn try_map<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(&Tensor) -> candle_core::Result<Tensor>,
    {
        Ok(Self {
            stm_indices: f(&self.stm_indices)?,
            nstm_indices: f(&self.nstm_indices)?,
            values: f(&self.values)?,
            cp: f(&self.cp)?,
            wdl: f(&self.wdl)?,
            size: self.size,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn batch() -> Result<Batch> {
        let device = Device::Cpu;
        Ok(Batch::new(
            Tensor::from_vec(vec![0i64, 3, 1, 5], (2, 2), &device)?,
            Tensor::from_vec(vec![0i64, 4, 1, 6], (2, 2), &device)?,
            Tensor::from_vec(vec![1f32, 1.0], 2, &device)?,
            Tensor::from_vec(vec![30f32, -40.0], (2, 1), &device)?,
            Tensor::from_vec(vec![1f32, 0.0], (2, 1), &device)?,
            2,
        ))
    }

    #[test]
    fn test_detached_copy_has_fresh_storage() -> Result<()> {
        let b = batch()?;
        let c = b.detached_copy()?;

        assert_ne!(b.cp().id(), c.cp().id());
        assert_ne!(b.stm_indices().id(), c.stm_indices().id());
        assert_eq!(c.cp_values()?, vec![30.0, -40.0]);
        assert_eq!(c.stm_indices().to_vec2::<i64>()?, vec![vec![0, 3], vec![1, 5]]);
        assert_eq!(c.len(), 2);
        assert_eq!(c.nnz(), 2);
        Ok(())
    }
}
