//! Static catalogs: dataset kinds, metric definitions and their descriptions

use serde::{Deserialize, Serialize};

/// 2-D projection datasets; each keeps its own selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectionKind {
    Cls,
    Tani,
}

impl ProjectionKind {
    pub const ALL: [ProjectionKind; 2] = [ProjectionKind::Cls, ProjectionKind::Tani];

    pub fn label(self) -> &'static str {
        match self {
            Self::Cls => "CLS UMAP",
            Self::Tani => "Tanimoto UMAP",
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            Self::Cls => "CLS",
            Self::Tani => "TANI",
        }
    }

    pub fn metrics(self) -> &'static [MetricDef] {
        match self {
            Self::Cls => &CLS_METRICS,
            Self::Tani => &TANI_METRICS,
        }
    }

    /// Metric tab opened by default: the first UMAP-space metric, else the first
    pub fn default_metric(self) -> Option<&'static MetricDef> {
        let defs = self.metrics();
        defs.iter().find(|d| d.key.contains("_umap")).or_else(|| defs.first())
    }
}

/// Ranked accuracy datasets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyKind {
    Rank1,
    MeanRank,
    Tanimoto,
}

impl AccuracyKind {
    pub const ALL: [AccuracyKind; 3] = [AccuracyKind::Rank1, AccuracyKind::MeanRank, AccuracyKind::Tanimoto];

    pub fn label(self) -> &'static str {
        match self {
            Self::Rank1 => "Rank-1",
            Self::MeanRank => "Mean rank",
            Self::Tanimoto => "Tanimoto",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Rank1 => "Rank-1 Accuracy",
            Self::MeanRank => "Mean rank (lower is better)",
            Self::Tanimoto => "Tanimoto similarity",
        }
    }

    pub fn axis_title(self) -> &'static str {
        match self {
            Self::Rank1 => "Accuracy",
            Self::MeanRank => "Mean rank (log scale, lower is better)",
            Self::Tanimoto => "Similarity",
        }
    }

    /// Opening a tab resets the sort direction to this
    pub fn default_descending(self) -> bool {
        !matches!(self, Self::MeanRank)
    }

    pub fn decimals(self) -> usize {
        match self {
            Self::MeanRank => 2,
            _ => 3,
        }
    }

    pub fn log_axis(self) -> bool {
        matches!(self, Self::MeanRank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Better {
    High,
    Low,
}

/// A per-class clustering metric column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricDef {
    pub key: &'static str,
    pub label: &'static str,
    pub better: Better,
    pub axis_range: Option<(f64, f64)>,
    pub description: &'static str,
}

impl MetricDef {
    pub fn interpretation(&self) -> &'static str {
        match self.better {
            Better::High => "Higher is better.",
            Better::Low => "Lower is better.",
        }
    }
}

const SILHOUETTE_RANGE: Option<(f64, f64)> = Some((-1.0, 1.0));
const JACCARD_RANGE: Option<(f64, f64)> = Some((0.0, 1.0));

static CLS_METRICS: [MetricDef; 4] = [
    MetricDef {
        key: "silhouette_cls_native",
        label: "Silhouette (CLS native)",
        better: Better::High,
        axis_range: SILHOUETTE_RANGE,
        description: "Silhouette in the scaled CLS feature space (Euclidean). Range -1..1; higher means samples are closer to their own class and farther from others.",
    },
    MetricDef {
        key: "radius_cls_native",
        label: "Centroid radius (CLS native)",
        better: Better::Low,
        axis_range: None,
        description: "Mean Euclidean distance from each sample to its class centroid in the scaled CLS space. Lower = tighter, more compact class.",
    },
    MetricDef {
        key: "knn10_cls_native",
        label: "Mean 10-NN distance (CLS native)",
        better: Better::Low,
        axis_range: None,
        description: "Mean Euclidean distance to the 10 nearest neighbors from the same class in the scaled CLS space. Lower = tighter within-class neighborhoods.",
    },
    MetricDef {
        key: "silhouette_cls_umap",
        label: "Silhouette (CLS UMAP 2D)",
        better: Better::High,
        axis_range: SILHOUETTE_RANGE,
        description: "Silhouette computed in the 2-D UMAP of CLS embeddings (Euclidean). Higher = better separation.",
    },
];

static TANI_METRICS: [MetricDef; 4] = [
    MetricDef {
        key: "silhouette_fp_native",
        label: "Silhouette (FP native, Jaccard)",
        better: Better::High,
        axis_range: SILHOUETTE_RANGE,
        description: "Silhouette on 16,384-bit fingerprints using Jaccard distance. Higher = better separation.",
    },
    MetricDef {
        key: "medoid_radius_fp_native",
        label: "Medoid radius (FP native, Jaccard)",
        better: Better::Low,
        axis_range: JACCARD_RANGE,
        description: "Mean Jaccard distance to the class medoid fingerprint. Lower = tighter, more cohesive class.",
    },
    MetricDef {
        key: "knn10_fp_native",
        label: "Mean 10-NN distance (FP native, Jaccard)",
        better: Better::Low,
        axis_range: JACCARD_RANGE,
        description: "Mean Jaccard distance to the 10 nearest neighbors within the same class. Lower = tighter within-class neighborhoods.",
    },
    MetricDef {
        key: "silhouette_fp_umap",
        label: "Silhouette (FP UMAP 2D)",
        better: Better::High,
        axis_range: SILHOUETTE_RANGE,
        description: "Silhouette computed in the 2-D UMAP of fingerprints (Euclidean). Higher = better separation.",
    },
];

/// Look a metric up across both projections
pub fn metric_def(key: &str) -> Option<&'static MetricDef> {
    CLS_METRICS.iter().chain(TANI_METRICS.iter()).find(|d| d.key == key)
}

/// A chemistry summary column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChemMetric {
    pub key: &'static str,
    pub label: &'static str,
    pub unit: &'static str,
    pub explain: &'static str,
}

pub static CHEM_METRICS: [ChemMetric; 5] = [
    ChemMetric {
        key: "mean_carbons",
        label: "Avg. # Carbons",
        unit: "atoms",
        explain: "Average number of carbon atoms per molecule among valid SMILES.",
    },
    ChemMetric {
        key: "mean_hydrogens",
        label: "Avg. # Hydrogens",
        unit: "atoms",
        explain: "Average number of hydrogen atoms per molecule among valid SMILES.",
    },
    ChemMetric {
        key: "mean_hsqc",
        label: "Avg. HSQC peaks",
        unit: "peaks",
        explain: "Average number of peaks observed in HSQC spectra.",
    },
    ChemMetric {
        key: "mean_cnmr",
        label: "Avg. 13C NMR peaks",
        unit: "peaks",
        explain: "Average number of carbon (13C) NMR peaks.",
    },
    ChemMetric {
        key: "mean_hnmr",
        label: "Avg. 1H NMR peaks",
        unit: "peaks",
        explain: "Average number of proton (1H) NMR peaks.",
    },
];

pub fn chem_metric(key: &str) -> Option<&'static ChemMetric> {
    CHEM_METRICS.iter().find(|m| m.key == key)
}

/// Confusion matrices ship one file per top-k prediction level
pub const CONFUSION_KS: [u32; 3] = [1, 5, 10];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_metric_prefers_umap() {
        assert_eq!(ProjectionKind::Cls.default_metric().map(|d| d.key), Some("silhouette_cls_umap"));
        assert_eq!(ProjectionKind::Tani.default_metric().map(|d| d.key), Some("silhouette_fp_umap"));
    }

    #[test]
    fn test_metric_lookup() {
        assert_eq!(metric_def("radius_cls_native").map(|d| d.better), Some(Better::Low));
        assert!(metric_def("nope").is_none());
        assert_eq!(chem_metric("mean_hsqc").map(|m| m.unit), Some("peaks"));
    }

    #[test]
    fn test_mean_rank_sorts_ascending() {
        assert!(!AccuracyKind::MeanRank.default_descending());
        assert!(AccuracyKind::Rank1.default_descending());
        assert_eq!(AccuracyKind::MeanRank.decimals(), 2);
    }
}
