//! Input feature sets.
//!
//! Every variant of [`FeatureSet`] carries its layout as data in a
//! [`FeatureSetInfo`]. The encoder only reads those values, so adding a layout
//! never adds a branch to the encoding path.
use crate::error::FeedError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Layout of a feature set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureSetInfo {
    /// Selector name, as accepted by [`FeatureSet::try_from_name`].
    pub name: &'static str,

    /// Number of perspectives each position contributes.
    pub perspectives: usize,

    /// Width of the dense slot array of one perspective.
    pub max_active_features: usize,

    /// Number of distinct feature ids, i.e. the input width of the network.
    pub input_features: usize,

    /// If `true`, every active feature has weight `1.0` regardless of the
    /// slot values delivered by the stream.
    pub uniform_values: bool,

    /// Whether a batch encoder exists for this layout.
    pub supported: bool,
}

static BOARD_768: FeatureSetInfo = FeatureSetInfo {
    name: "Board768",
    perspectives: 2,
    max_active_features: 32,
    input_features: 768,
    uniform_values: true,
    supported: false,
};

static HALF_KP: FeatureSetInfo = FeatureSetInfo {
    name: "HalfKP",
    perspectives: 2,
    max_active_features: 32,
    input_features: 64 * 640,
    uniform_values: true,
    supported: true,
};

static HALF_KA: FeatureSetInfo = FeatureSetInfo {
    name: "HalfKA",
    perspectives: 2,
    max_active_features: 32,
    input_features: 64 * 768,
    uniform_values: true,
    supported: false,
};

/// Feature sets known to the trainer.
///
/// Only [`FeatureSet::HalfKp`] can currently be streamed and encoded; the
/// others are rejected by [`FeatureSet::ensure_supported`] when a stream or
/// encoder is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum FeatureSet {
    /// Piece-square features without king buckets.
    #[serde(rename = "Board768")]
    Board768,

    /// King-relative piece features, kings excluded.
    #[serde(rename = "HalfKP")]
    HalfKp,

    /// King-relative piece features, kings included.
    #[serde(rename = "HalfKA")]
    HalfKa,
}

impl FeatureSet {
    /// All known feature sets.
    pub const ALL: [FeatureSet; 3] = [FeatureSet::Board768, FeatureSet::HalfKp, FeatureSet::HalfKa];

    /// Returns the layout of the feature set.
    pub fn info(&self) -> &'static FeatureSetInfo {
        match self {
            Self::Board768 => &BOARD_768,
            Self::HalfKp => &HALF_KP,
            Self::HalfKa => &HALF_KA,
        }
    }

    /// Selector name.
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// Width of the dense slot array of one perspective.
    pub fn max_active_features(&self) -> usize {
        self.info().max_active_features
    }

    /// Number of distinct feature ids.
    pub fn input_features(&self) -> usize {
        self.info().input_features
    }

    /// Looks up a feature set by its selector name.
    pub fn try_from_name(name: &str) -> Result<Self, FeedError> {
        Self::ALL
            .iter()
            .copied()
            .find(|fs| fs.name() == name)
            .ok_or_else(|| FeedError::UnsupportedFeatureSet(name.to_string()))
    }

    /// Returns `self` if batches of this feature set can be encoded.
    pub fn ensure_supported(self) -> Result<Self, FeedError> {
        if self.info().supported {
            Ok(self)
        } else {
            Err(FeedError::UnsupportedFeatureSet(self.name().to_string()))
        }
    }
}

impl FromStr for FeatureSet {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::try_from_name(s)
    }
}

impl fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(FeatureSet::try_from_name("HalfKP").unwrap(), FeatureSet::HalfKp);
        assert_eq!("HalfKA".parse::<FeatureSet>().unwrap(), FeatureSet::HalfKa);

        match FeatureSet::try_from_name("HalfKAv2") {
            Err(FeedError::UnsupportedFeatureSet(name)) => assert_eq!(name, "HalfKAv2"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_only_halfkp_is_supported() {
        assert!(FeatureSet::HalfKp.ensure_supported().is_ok());
        assert!(FeatureSet::Board768.ensure_supported().is_err());
        assert!(FeatureSet::HalfKa.ensure_supported().is_err());
    }

    #[test]
    fn test_halfkp_layout() {
        let info = FeatureSet::HalfKp.info();
        assert_eq!(info.perspectives, 2);
        assert_eq!(info.max_active_features, 32);
        assert_eq!(info.input_features, 40960);
        assert!(info.uniform_values);
    }

    #[test]
    fn test_serde_uses_selector_names() {
        let yaml = serde_yaml::to_string(&FeatureSet::HalfKp).unwrap();
        assert!(yaml.contains("HalfKP"));
        let fs: FeatureSet = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(fs, FeatureSet::HalfKp);
    }
}
