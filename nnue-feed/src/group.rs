//! Decoded position groups yielded by an upstream stream.
use crate::error::FeedError;

/// Slot value meaning "no feature in this slot".
pub const SENTINEL: i32 = -1;

/// One decoded position, as produced by a record reader.
///
/// This is a convenience for building [`PositionGroup`]s; streams may also
/// fill the dense arrays of a group directly.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionRecord {
    /// `true` if white is the side to move.
    pub white_to_move: bool,

    /// Active feature ids from white's perspective.
    pub white_features: Vec<i32>,

    /// Active feature ids from black's perspective.
    pub black_features: Vec<i32>,

    /// Game outcome from the side to move, in `[0, 1]`.
    pub outcome: f32,

    /// Evaluation score in centipawns.
    pub score: f32,
}

/// A group of decoded positions in dense-per-slot layout.
///
/// Each perspective has `len() * max_active_features` slots, row-major.
/// Unused slots hold [`SENTINEL`].
#[derive(Debug, Clone, PartialEq)]
pub struct PositionGroup {
    /// Width of the slot array of one perspective.
    pub max_active_features: usize,

    /// Side indicator per position; values above `0.5` mean white to move.
    pub is_white: Vec<f32>,

    /// White-perspective feature slots.
    pub white_indices: Vec<i32>,

    /// Weights parallel to `white_indices`.
    pub white_values: Vec<f32>,

    /// Black-perspective feature slots.
    pub black_indices: Vec<i32>,

    /// Weights parallel to `black_indices`.
    pub black_values: Vec<f32>,

    /// Outcome labels.
    pub outcome: Vec<f32>,

    /// Evaluation scores.
    pub score: Vec<f32>,
}

/// Number of slots of one perspective for `size` positions.
fn slot_count(size: usize, max_active_features: usize) -> Result<usize, FeedError> {
    size.checked_mul(max_active_features).ok_or_else(|| {
        FeedError::MalformedGroup(format!(
            "{} positions of {} slots overflow the slot array",
            size, max_active_features
        ))
    })
}

impl PositionGroup {
    /// Builds a group from records, padding every perspective to
    /// `max_active_features` slots.
    pub fn from_records(
        records: &[PositionRecord],
        max_active_features: usize,
    ) -> Result<Self, FeedError> {
        let size = records.len();
        let n_slots = slot_count(size, max_active_features)?;
        let mut group = Self {
            max_active_features,
            is_white: Vec::with_capacity(size),
            white_indices: vec![SENTINEL; n_slots],
            white_values: vec![0.0; n_slots],
            black_indices: vec![SENTINEL; n_slots],
            black_values: vec![0.0; n_slots],
            outcome: Vec::with_capacity(size),
            score: Vec::with_capacity(size),
        };

        for (i, record) in records.iter().enumerate() {
            if record.white_features.len() > max_active_features
                || record.black_features.len() > max_active_features
            {
                return Err(FeedError::MalformedGroup(format!(
                    "record {} has more than {} active features",
                    i, max_active_features
                )));
            }

            group.is_white.push(if record.white_to_move { 1.0 } else { 0.0 });
            group.outcome.push(record.outcome);
            group.score.push(record.score);

            let offset = i * max_active_features;
            for (slot, &feature) in record.white_features.iter().enumerate() {
                group.white_indices[offset + slot] = feature;
                group.white_values[offset + slot] = 1.0;
            }
            for (slot, &feature) in record.black_features.iter().enumerate() {
                group.black_indices[offset + slot] = feature;
                group.black_values[offset + slot] = 1.0;
            }
        }

        Ok(group)
    }

    /// Number of positions in the group.
    pub fn len(&self) -> usize {
        self.is_white.len()
    }

    /// Returns `true` if the group holds no positions.
    pub fn is_empty(&self) -> bool {
        self.is_white.is_empty()
    }

    fn row<'a, T>(&self, data: &'a [T], row: usize) -> &'a [T] {
        let offset = row * self.max_active_features;
        &data[offset..offset + self.max_active_features]
    }

    /// White-perspective slots of `row`.
    pub fn white_slots(&self, row: usize) -> &[i32] {
        self.row(&self.white_indices, row)
    }

    /// Black-perspective slots of `row`.
    pub fn black_slots(&self, row: usize) -> &[i32] {
        self.row(&self.black_indices, row)
    }

    /// Weights of the white-perspective slots of `row`.
    pub fn white_weights(&self, row: usize) -> &[f32] {
        self.row(&self.white_values, row)
    }

    /// Weights of the black-perspective slots of `row`.
    pub fn black_weights(&self, row: usize) -> &[f32] {
        self.row(&self.black_values, row)
    }

    /// Checks that every array agrees with the group size.
    pub fn validate(&self) -> Result<(), FeedError> {
        let size = self.len();
        let n_slots = slot_count(size, self.max_active_features)?;
        let lengths = [
            ("outcome", self.outcome.len(), size),
            ("score", self.score.len(), size),
            ("white_indices", self.white_indices.len(), n_slots),
            ("white_values", self.white_values.len(), n_slots),
            ("black_indices", self.black_indices.len(), n_slots),
            ("black_values", self.black_values.len(), n_slots),
        ];

        for &(field, actual, expected) in lengths.iter() {
            if actual != expected {
                return Err(FeedError::MalformedGroup(format!(
                    "{} has {} elements, expected {}",
                    field, actual, expected
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn record(white_to_move: bool, white: &[i32], black: &[i32]) -> PositionRecord {
        PositionRecord {
            white_to_move,
            white_features: white.to_vec(),
            black_features: black.to_vec(),
            outcome: 0.5,
            score: 12.0,
        }
    }

    #[test]
    fn test_from_records_pads_with_sentinel() {
        let records = vec![record(true, &[3, 7], &[5]), record(false, &[], &[1, 2, 4])];
        let group = PositionGroup::from_records(&records, 4).unwrap();

        assert_eq!(group.len(), 2);
        assert_eq!(group.white_slots(0), &[3, 7, SENTINEL, SENTINEL]);
        assert_eq!(group.black_slots(1), &[1, 2, 4, SENTINEL]);
        assert_eq!(group.white_slots(1), &[SENTINEL; 4]);
        assert_eq!(group.white_weights(0), &[1.0, 1.0, 0.0, 0.0]);
        assert_eq!(group.is_white, vec![1.0, 0.0]);
        assert!(group.validate().is_ok());
    }

    #[test]
    fn test_too_many_features() {
        let records = vec![record(true, &[1, 2, 3], &[])];
        assert!(PositionGroup::from_records(&records, 2).is_err());
    }

    #[test]
    fn test_validate_rejects_overflowing_width() {
        let group = PositionGroup {
            max_active_features: usize::MAX,
            is_white: vec![1.0, 0.0],
            white_indices: vec![],
            white_values: vec![],
            black_indices: vec![],
            black_values: vec![],
            outcome: vec![0.0; 2],
            score: vec![0.0; 2],
        };

        assert!(matches!(group.validate(), Err(FeedError::MalformedGroup(_))));
    }

    #[test]
    fn test_validate_detects_truncated_arrays() {
        let records = vec![record(true, &[1], &[2]), record(true, &[3], &[4])];
        let mut group = PositionGroup::from_records(&records, 2).unwrap();
        group.black_indices.pop();

        match group.validate() {
            Err(FeedError::MalformedGroup(msg)) => assert!(msg.contains("black_indices")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
