//! Priority metrics computed from the evaluation targets of a batch.
use crate::error::FeedError;
use std::{fmt, str::FromStr};

/// Metric turning the `cp` targets of a batch into a sampling priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriorityMetric {
    /// L2 norm of the targets (`cp_norm`).
    CpNorm,

    /// Mean absolute target (`cp_abs_mean`).
    CpAbsMean,

    /// Population variance of the targets (`cp_var`).
    CpVar,
}

impl PriorityMetric {
    /// Selector name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CpNorm => "cp_norm",
            Self::CpAbsMean => "cp_abs_mean",
            Self::CpVar => "cp_var",
        }
    }

    /// Raw metric value; `0.0` for an empty slice.
    pub fn evaluate(&self, cp: &[f32]) -> f64 {
        if cp.is_empty() {
            return 0.0;
        }
        let n = cp.len() as f64;
        match self {
            Self::CpNorm => cp.iter().map(|&v| (v as f64).powi(2)).sum::<f64>().sqrt(),
            Self::CpAbsMean => cp.iter().map(|&v| (v as f64).abs()).sum::<f64>() / n,
            Self::CpVar => {
                let mean = cp.iter().map(|&v| v as f64).sum::<f64>() / n;
                cp.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n
            }
        }
    }

    /// Priority of a batch with targets `cp`, never below `eps`.
    ///
    /// Non-finite metric values, e.g. from an infinite target, yield `eps`.
    pub fn priority(&self, cp: &[f32], eps: f64) -> f64 {
        let value = self.evaluate(cp) + eps;
        if value.is_finite() {
            value.max(eps)
        } else {
            eps
        }
    }
}

impl FromStr for PriorityMetric {
    type Err = FeedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cp_norm" => Ok(Self::CpNorm),
            "cp_abs_mean" => Ok(Self::CpAbsMean),
            "cp_var" => Ok(Self::CpVar),
            _ => Err(FeedError::UnknownPriorityMetric(s.to_string())),
        }
    }
}

impl fmt::Display for PriorityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
