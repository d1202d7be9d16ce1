//! Conversion of dense slot arrays into coordinate-format batches.
use crate::{
    batch::Batch,
    error::FeedError,
    feature_set::{FeatureSet, FeatureSetInfo},
    group::{PositionGroup, SENTINEL},
};
use anyhow::Result;
use candle_core::{Device, Tensor};

/// Side indicators strictly greater than this value mean white is to move.
///
/// Streams deliver the indicator as a float; `0.5` itself counts as black.
pub const SIDE_TO_MOVE_THRESHOLD: f32 = 0.5;

/// Coordinates of one perspective under construction.
struct Coordinates {
    /// Flattened `(row, feature_id)` pairs.
    pairs: Vec<i64>,
    values: Vec<f32>,
}

impl Coordinates {
    fn with_capacity(n: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(2 * n),
            values: Vec::with_capacity(n),
        }
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    /// Emits one coordinate per non-sentinel slot, keeping slot order.
    fn push_row(
        &mut self,
        row: usize,
        slots: &[i32],
        weights: &[f32],
        info: &FeatureSetInfo,
    ) -> Result<(), FeedError> {
        for (&feature, &weight) in slots.iter().zip(weights.iter()) {
            if feature == SENTINEL {
                continue;
            }
            if feature < 0 || feature as usize >= info.input_features {
                return Err(FeedError::MalformedGroup(format!(
                    "feature id {} in row {} is out of range for {}",
                    feature, row, info.name
                )));
            }
            self.pairs.push(row as i64);
            self.pairs.push(feature as i64);
            self.values.push(if info.uniform_values { 1.0 } else { weight });
        }
        Ok(())
    }

    fn into_tensors(self, device: &Device) -> Result<(Tensor, Tensor)> {
        let n = self.len();
        let indices = Tensor::from_vec(self.pairs, (n, 2), device)?;
        let values = Tensor::from_vec(self.values, n, device)?;
        Ok((indices, values))
    }
}

/// Encodes [`PositionGroup`]s of one feature set into [`Batch`]es.
#[derive(Debug, Clone)]
pub struct FeatureBatchEncoder {
    feature_set: FeatureSet,
}

impl FeatureBatchEncoder {
    /// Creates an encoder, failing if the feature set is not supported.
    pub fn new(feature_set: FeatureSet) -> Result<Self> {
        Ok(Self {
            feature_set: feature_set.ensure_supported()?,
        })
    }

    /// The feature set of this encoder.
    pub fn feature_set(&self) -> FeatureSet {
        self.feature_set
    }

    /// Encodes a group into a batch placed on `device`.
    ///
    /// The side-to-move perspective of row `i` is white if
    /// `group.is_white[i] > SIDE_TO_MOVE_THRESHOLD` and black otherwise.
    /// Sentinel slots are dropped, so a position without active features on
    /// a perspective contributes no coordinates there.
    ///
    /// `values` is parallel to the side-to-move coordinates. Both perspectives
    /// must yield the same number of coordinates; otherwise
    /// [`FeedError::PerspectiveMismatch`] is returned. For feature sets with
    /// per-slot weights, the weights must also agree coordinate by
    /// coordinate ([`FeedError::PerspectiveWeightMismatch`]).
    pub fn encode(&self, group: &PositionGroup, device: &Device) -> Result<Batch> {
        encode_with(self.feature_set.info(), group, device)
    }
}

/// Encodes `group` with the layout `info`.
fn encode_with(info: &FeatureSetInfo, group: &PositionGroup, device: &Device) -> Result<Batch> {
    group.validate()?;
    if group.max_active_features != info.max_active_features {
        return Err(FeedError::MalformedGroup(format!(
            "group has {} slots per perspective, {} expects {}",
            group.max_active_features, info.name, info.max_active_features
        ))
        .into());
    }

    let size = group.len();
    let mut stm = Coordinates::with_capacity(size * info.max_active_features);
    let mut nstm = Coordinates::with_capacity(size * info.max_active_features);

    for row in 0..size {
        let white = (group.white_slots(row), group.white_weights(row));
        let black = (group.black_slots(row), group.black_weights(row));
        let (us, them) = if group.is_white[row] > SIDE_TO_MOVE_THRESHOLD {
            (white, black)
        } else {
            (black, white)
        };
        stm.push_row(row, us.0, us.1, info)?;
        nstm.push_row(row, them.0, them.1, info)?;
    }

    if stm.len() != nstm.len() {
        return Err(FeedError::PerspectiveMismatch {
            stm: stm.len(),
            nstm: nstm.len(),
        }
        .into());
    }
    if !info.uniform_values {
        if let Some(coordinate) = stm
            .values
            .iter()
            .zip(nstm.values.iter())
            .position(|(a, b)| a != b)
        {
            return Err(FeedError::PerspectiveWeightMismatch { coordinate }.into());
        }
    }

    let (stm_indices, values) = stm.into_tensors(device)?;
    // nstm weights equal `values` here
    let (nstm_indices, _) = nstm.into_tensors(device)?;
    let cp = Tensor::from_vec(group.score.clone(), (size, 1), device)?;
    let wdl = Tensor::from_vec(group.outcome.clone(), (size, 1), device)?;

    Ok(Batch::new(stm_indices, nstm_indices, values, cp, wdl, size))
}

/// Per-row feature ids of one perspective.
fn rows_of(indices: &Tensor, size: usize) -> Result<Vec<Vec<i64>>> {
    let mut rows = vec![Vec::new(); size];
    for pair in indices.to_vec2::<i64>()? {
        let row = pair[0] as usize;
        if row >= size {
            return Err(FeedError::MalformedGroup(format!(
                "coordinate row {} exceeds batch size {}",
                row, size
            ))
            .into());
        }
        rows[row].push(pair[1]);
    }
    Ok(rows)
}

/// Reconstructs `(stm, nstm)` feature ids of every row of a batch.
///
/// This inverts [`FeatureBatchEncoder::encode`] up to sentinel padding.
pub fn decode(batch: &Batch) -> Result<Vec<(Vec<i64>, Vec<i64>)>> {
    let stm = rows_of(batch.stm_indices(), batch.len())?;
    let nstm = rows_of(batch.nstm_indices(), batch.len())?;
    Ok(stm.into_iter().zip(nstm).collect())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::group::PositionRecord;

    const MAX: usize = 32;

    fn record(white_to_move: bool, white: &[i32], black: &[i32], score: f32) -> PositionRecord {
        PositionRecord {
            white_to_move,
            white_features: white.to_vec(),
            black_features: black.to_vec(),
            outcome: 1.0,
            score,
        }
    }

    fn encoder() -> FeatureBatchEncoder {
        FeatureBatchEncoder::new(FeatureSet::HalfKp).unwrap()
    }

    #[test]
    fn test_unsupported_feature_set() {
        let err = FeatureBatchEncoder::new(FeatureSet::Board768).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FeedError>(),
            Some(FeedError::UnsupportedFeatureSet(_))
        ));
    }

    #[test]
    fn test_encode_coordinates() -> Result<()> {
        let records = vec![
            record(true, &[10, 20], &[30, 40], 100.0),
            record(false, &[11, 21], &[31, 41], -50.0),
        ];
        let group = PositionGroup::from_records(&records, MAX)?;
        let batch = encoder().encode(&group, &Device::Cpu)?;

        assert_eq!(batch.len(), 2);
        assert_eq!(
            batch.stm_indices().to_vec2::<i64>()?,
            vec![vec![0, 10], vec![0, 20], vec![1, 31], vec![1, 41]]
        );
        assert_eq!(
            batch.nstm_indices().to_vec2::<i64>()?,
            vec![vec![0, 30], vec![0, 40], vec![1, 11], vec![1, 21]]
        );
        assert_eq!(batch.values().to_vec1::<f32>()?, vec![1.0; 4]);
        assert_eq!(batch.cp_values()?, vec![100.0, -50.0]);
        assert_eq!(batch.wdl().dims(), &[2, 1]);
        Ok(())
    }

    #[test]
    fn test_side_threshold_is_strict() -> Result<()> {
        let records = vec![record(true, &[1], &[2], 0.0)];
        let mut group = PositionGroup::from_records(&records, MAX)?;
        group.is_white[0] = SIDE_TO_MOVE_THRESHOLD;
        let batch = encoder().encode(&group, &Device::Cpu)?;
        assert_eq!(batch.stm_indices().to_vec2::<i64>()?, vec![vec![0, 2]]);

        group.is_white[0] = 0.51;
        let batch = encoder().encode(&group, &Device::Cpu)?;
        assert_eq!(batch.stm_indices().to_vec2::<i64>()?, vec![vec![0, 1]]);
        Ok(())
    }

    #[test]
    fn test_empty_perspective_rows() -> Result<()> {
        let records = vec![
            record(true, &[], &[], 0.0),
            record(true, &[5, 6, 7], &[8, 9, 10], 0.0),
            record(false, &[], &[], 0.0),
        ];
        let group = PositionGroup::from_records(&records, MAX)?;
        let batch = encoder().encode(&group, &Device::Cpu)?;

        assert_eq!(batch.len(), 3);
        assert_eq!(batch.nnz(), 3);
        let rows = decode(&batch)?;
        assert!(rows[0].0.is_empty() && rows[0].1.is_empty());
        assert_eq!(rows[1], (vec![5, 6, 7], vec![8, 9, 10]));
        assert!(rows[2].0.is_empty());
        Ok(())
    }

    #[test]
    fn test_all_sentinel_group() -> Result<()> {
        let records = vec![record(true, &[], &[], 0.0); 4];
        let group = PositionGroup::from_records(&records, MAX)?;
        let batch = encoder().encode(&group, &Device::Cpu)?;

        assert_eq!(batch.len(), 4);
        assert_eq!(batch.nnz(), 0);
        assert_eq!(batch.stm_indices().dims(), &[0, 2]);
        Ok(())
    }

    #[test]
    fn test_perspective_mismatch() -> Result<()> {
        let records = vec![record(true, &[1, 2], &[3], 0.0)];
        let group = PositionGroup::from_records(&records, MAX)?;
        let err = encoder().encode(&group, &Device::Cpu).unwrap_err();

        match err.downcast_ref::<FeedError>() {
            Some(FeedError::PerspectiveMismatch { stm, nstm }) => {
                assert_eq!((*stm, *nstm), (2, 1));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        Ok(())
    }

    static WEIGHTED: FeatureSetInfo = FeatureSetInfo {
        name: "Weighted",
        perspectives: 2,
        max_active_features: 4,
        input_features: 64,
        uniform_values: false,
        supported: true,
    };

    fn weighted_group(white: [f32; 2], black: [f32; 2]) -> Result<PositionGroup> {
        let records = vec![record(true, &[1, 2], &[3, 4], 0.0)];
        let mut group = PositionGroup::from_records(&records, WEIGHTED.max_active_features)?;
        group.white_values[..2].copy_from_slice(&white);
        group.black_values[..2].copy_from_slice(&black);
        Ok(group)
    }

    #[test]
    fn test_weighted_values_follow_slots() -> Result<()> {
        let group = weighted_group([0.5, 2.0], [0.5, 2.0])?;
        let batch = encode_with(&WEIGHTED, &group, &Device::Cpu)?;

        assert_eq!(batch.values().to_vec1::<f32>()?, vec![0.5, 2.0]);
        assert_eq!(batch.nstm_indices().to_vec2::<i64>()?, vec![vec![0, 3], vec![0, 4]]);
        Ok(())
    }

    #[test]
    fn test_weighted_values_must_agree() -> Result<()> {
        let group = weighted_group([0.5, 2.0], [0.5, 3.0])?;
        let err = encode_with(&WEIGHTED, &group, &Device::Cpu).unwrap_err();

        assert!(matches!(
            err.downcast_ref::<FeedError>(),
            Some(FeedError::PerspectiveWeightMismatch { coordinate: 1 })
        ));
        Ok(())
    }

    #[test]
    fn test_uniform_set_ignores_slot_weights() -> Result<()> {
        let records = vec![record(true, &[1, 2], &[3, 4], 0.0)];
        let mut group = PositionGroup::from_records(&records, MAX)?;
        group.white_values[0] = 0.25;
        group.black_values[1] = 7.0;
        let batch = encoder().encode(&group, &Device::Cpu)?;

        assert_eq!(batch.values().to_vec1::<f32>()?, vec![1.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_feature_out_of_range() -> Result<()> {
        let records = vec![record(true, &[40960], &[0], 0.0)];
        let group = PositionGroup::from_records(&records, MAX)?;
        assert!(encoder().encode(&group, &Device::Cpu).is_err());
        Ok(())
    }

    #[test]
    fn test_slot_width_must_match_feature_set() -> Result<()> {
        let records = vec![record(true, &[1], &[2], 0.0)];
        let group = PositionGroup::from_records(&records, 8)?;
        assert!(encoder().encode(&group, &Device::Cpu).is_err());
        Ok(())
    }
}
