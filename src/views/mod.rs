//! View Aggregator - bounded, render-ready reductions of datasets
//!
//! Views are disposable: each one is rebuilt wholesale from its backing
//! dataset whenever the dataset or its K parameter changes, never patched.
//!
//! - topk: Top-K frequency view over projection samples
//! - ranked: Top-K by sample count for ranked metric rows
//! - confusion: Top-K + "Other" confusion-matrix bucketing

pub mod confusion;
pub mod ranked;
pub mod topk;

pub use confusion::{AggregatedMatrix, ConfusionMatrix, ConfusionView, DisplayMode};
pub use ranked::{MetricRow, MetricTable, RankedRow, RankedView, SortOrder};
pub use topk::{ProjectionSample, ProjectionView};

use serde::{Deserialize, Serialize};

/// User-controlled K, always at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "i64")]
pub struct TopK(usize);

impl TopK {
    /// Clamp any requested value into a valid K (`k <= 0` becomes 1)
    pub fn new(k: i64) -> Self {
        Self(k.max(1) as usize)
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for TopK {
    fn default() -> Self {
        Self(20)
    }
}

impl From<i64> for TopK {
    fn from(k: i64) -> Self {
        Self::new(k)
    }
}

impl From<TopK> for i64 {
    fn from(k: TopK) -> Self {
        k.0 as i64
    }
}

impl std::fmt::Display for TopK {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Missing or non-finite cells count as zero
pub(crate) fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_clamps_non_positive() {
        assert_eq!(TopK::new(0).get(), 1);
        assert_eq!(TopK::new(-7).get(), 1);
        assert_eq!(TopK::new(12).get(), 12);
    }

    #[test]
    fn test_top_k_deserializes_clamped() {
        let k: TopK = serde_yaml::from_str("-3").unwrap();
        assert_eq!(k.get(), 1);
    }
}
