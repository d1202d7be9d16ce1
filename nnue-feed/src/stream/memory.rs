use crate::{group::PositionRecord, PositionGroup, PositionStream};
use anyhow::Result;
use std::collections::VecDeque;

/// A [`PositionStream`] over groups held in memory.
///
/// Yields the groups in order, then reports exhaustion forever.
#[derive(Debug, Clone, Default)]
pub struct MemoryStream {
    groups: VecDeque<PositionGroup>,
}

impl MemoryStream {
    /// Creates a stream yielding `groups`.
    pub fn new(groups: Vec<PositionGroup>) -> Self {
        Self {
            groups: groups.into(),
        }
    }

    /// Splits `records` into groups of `batch_size` positions.
    ///
    /// The last group holds the remainder and may be smaller.
    pub fn from_records(
        records: &[PositionRecord],
        batch_size: usize,
        max_active_features: usize,
    ) -> Result<Self> {
        let groups = records
            .chunks(batch_size.max(1))
            .map(|chunk| PositionGroup::from_records(chunk, max_active_features))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(groups))
    }

    /// Number of groups left.
    pub fn remaining(&self) -> usize {
        self.groups.len()
    }
}

impl PositionStream for MemoryStream {
    fn next_group(&mut self) -> Result<Option<PositionGroup>> {
        Ok(self.groups.pop_front())
    }
}
