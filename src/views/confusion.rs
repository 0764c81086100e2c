//! Confusion matrix Top-K + "Other" aggregation
//!
//! The K true labels with the largest row totals are kept and reused for
//! both axes. Everything else is folded into a synthetic "Other" row and
//! column, so the aggregated matrix always holds the same total count as
//! the raw one.

use serde::{Deserialize, Serialize};

use super::{finite_or_zero, TopK};

pub const OTHER_LABEL: &str = "Other";

/// Quantile of positive counts used as the color ceiling in counts mode
const COUNTS_CEILING_QUANTILE: f64 = 0.98;

/// Raw (true label x predicted label) -> count grid.
///
/// Construction normalizes the shape: every row has exactly one cell per
/// predicted label and non-finite cells are zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfusionMatrix {
    true_labels: Vec<String>,
    pred_labels: Vec<String>,
    counts: Vec<Vec<f64>>,
}

impl ConfusionMatrix {
    pub fn new(true_labels: Vec<String>, pred_labels: Vec<String>, counts: Vec<Vec<f64>>) -> Self {
        let width = pred_labels.len();
        let mut rows = counts.into_iter();
        let counts = true_labels
            .iter()
            .map(|_| {
                let mut row: Vec<f64> = rows
                    .next()
                    .unwrap_or_default()
                    .into_iter()
                    .take(width)
                    .map(finite_or_zero)
                    .collect();
                row.resize(width, 0.0);
                row
            })
            .collect();

        Self { true_labels, pred_labels, counts }
    }

    pub fn true_labels(&self) -> &[String] {
        &self.true_labels
    }

    pub fn pred_labels(&self) -> &[String] {
        &self.pred_labels
    }

    pub fn counts(&self) -> &[Vec<f64>] {
        &self.counts
    }

    pub fn is_empty(&self) -> bool {
        self.true_labels.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.counts.iter().flatten().sum()
    }

    fn row_totals(&self) -> Vec<f64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }
}

/// (K+1) x (K+1) matrix; the last row and column are "Other"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedMatrix {
    pub labels: Vec<String>,
    pub counts: Vec<Vec<f64>>,
}

impl AggregatedMatrix {
    pub fn total(&self) -> f64 {
        self.counts.iter().flatten().sum()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Fold `matrix` into its top `k` true labels plus "Other".
///
/// K is clamped to the number of true labels; an empty matrix gives an
/// empty result rather than a lone "Other" cell.
pub fn aggregate(matrix: &ConfusionMatrix, k: TopK) -> AggregatedMatrix {
    if matrix.is_empty() {
        return AggregatedMatrix::default();
    }

    let totals = matrix.row_totals();
    let mut order: Vec<usize> = (0..totals.len()).collect();
    // Stable: equal totals keep original row order
    order.sort_by(|&a, &b| totals[b].total_cmp(&totals[a]));
    order.truncate(k.get());

    let kept_labels: Vec<String> = order.iter().map(|&i| matrix.true_labels[i].clone()).collect();
    let n = kept_labels.len() + 1;
    let other = n - 1;

    // Predicted column -> aggregated column (first kept label with that name)
    let column_of: Vec<usize> = matrix
        .pred_labels
        .iter()
        .map(|p| kept_labels.iter().position(|l| l == p).unwrap_or(other))
        .collect();

    let mut row_of = vec![other; matrix.true_labels.len()];
    for (r, &ri) in order.iter().enumerate() {
        row_of[ri] = r;
    }

    let mut counts = vec![vec![0.0; n]; n];
    for (ri, row) in matrix.counts.iter().enumerate() {
        let target = &mut counts[row_of[ri]];
        for (pj, &v) in row.iter().enumerate() {
            target[column_of[pj]] += v;
        }
    }

    let mut labels = kept_labels;
    labels.push(OTHER_LABEL.to_string());

    tracing::debug!(
        "Aggregated {}x{} confusion matrix into {}x{} (k={})",
        matrix.true_labels.len(),
        matrix.pred_labels.len(),
        n,
        n,
        k
    );

    AggregatedMatrix { labels, counts }
}

/// Divide each row by its own sum; zero-sum rows stay all zero
pub fn normalize_rows(matrix: &[Vec<f64>]) -> Vec<Vec<f64>> {
    matrix
        .iter()
        .map(|row| {
            let sum: f64 = row.iter().sum();
            if sum > 0.0 {
                row.iter().map(|v| v / sum).collect()
            } else {
                vec![0.0; row.len()]
            }
        })
        .collect()
}

/// Linear-interpolated quantile of an ascending slice
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = (sorted.len() - 1) as f64 * q;
    let base = pos.floor() as usize;
    let rest = pos - base as f64;
    match sorted.get(base + 1) {
        Some(next) => sorted[base] + rest * (next - sorted[base]),
        None => sorted[base],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    Counts,
    #[default]
    #[serde(alias = "row")]
    RowNormalized,
}

impl DisplayMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Counts => "counts",
            Self::RowNormalized => "row-normalized",
        }
    }
}

/// Upper bound of the heatmap color scale for the given mode
pub fn color_ceiling(counts: &[Vec<f64>], mode: DisplayMode) -> f64 {
    match mode {
        DisplayMode::RowNormalized => 1.0,
        DisplayMode::Counts => {
            let mut positive: Vec<f64> = counts.iter().flatten().copied().filter(|&v| v > 0.0).collect();
            if positive.is_empty() {
                return 1.0;
            }
            positive.sort_by(f64::total_cmp);
            quantile(&positive, COUNTS_CEILING_QUANTILE)
        }
    }
}

/// Render-ready confusion heatmap
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfusionView {
    pub labels: Vec<String>,
    /// Displayed values (counts or row fractions)
    pub z: Vec<Vec<f64>>,
    /// Raw aggregated counts, kept for tooltips
    pub counts: Vec<Vec<f64>>,
    pub mode: DisplayMode,
    pub cmax: f64,
}

impl ConfusionView {
    pub fn build(matrix: &ConfusionMatrix, k: TopK, mode: DisplayMode) -> Self {
        let agg = aggregate(matrix, k);
        let z = match mode {
            DisplayMode::Counts => agg.counts.clone(),
            DisplayMode::RowNormalized => normalize_rows(&agg.counts),
        };
        let cmax = color_ceiling(&agg.counts, mode);
        Self { labels: agg.labels, z, counts: agg.counts, mode, cmax }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
