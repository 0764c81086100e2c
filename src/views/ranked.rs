//! Ranked views - per-class values shown as bar charts
//!
//! Accuracy, clustering-metric and chemistry charts all follow the same
//! recipe: keep rows with a finite value, take the K largest by sample
//! count, then order by value.

use std::collections::BTreeMap;

use super::{finite_or_zero, TopK};

/// A (category, value, optional count) row
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRow {
    pub category: String,
    pub value: f64,
    pub count: Option<f64>,
}

impl RankedRow {
    pub fn new(category: impl Into<String>, value: f64, count: Option<f64>) -> Self {
        Self { category: category.into(), value, count }
    }

    fn count_or_zero(&self) -> f64 {
        self.count.map(finite_or_zero).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Descending,
    Ascending,
}

impl SortOrder {
    pub fn from_descending(desc: bool) -> Self {
        if desc {
            Self::Descending
        } else {
            Self::Ascending
        }
    }
}

/// Parallel category/value/count lists, in display order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RankedView {
    pub categories: Vec<String>,
    pub values: Vec<f64>,
    pub counts: Vec<Option<f64>>,
}

impl RankedView {
    /// Top-K by count, then sorted by value
    pub fn build(rows: &[RankedRow], k: TopK, order: SortOrder) -> Self {
        let mut by_count: Vec<&RankedRow> = rows.iter().filter(|r| r.value.is_finite()).collect();
        by_count.sort_by(|a, b| b.count_or_zero().total_cmp(&a.count_or_zero()));
        by_count.truncate(k.get());

        by_count.sort_by(|a, b| match order {
            SortOrder::Descending => b.value.total_cmp(&a.value),
            SortOrder::Ascending => a.value.total_cmp(&b.value),
        });

        Self {
            categories: by_count.iter().map(|r| r.category.clone()).collect(),
            values: by_count.iter().map(|r| r.value).collect(),
            counts: by_count.iter().map(|r| r.count).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Bar text such as `0.600 (n=188)`
    pub fn labels(&self, decimals: usize, show_n: bool) -> Vec<String> {
        self.values
            .iter()
            .zip(&self.counts)
            .map(|(v, n)| match n {
                Some(n) if show_n && n.is_finite() => format!("{:.*} (n={})", decimals, v, n),
                _ => format!("{:.*}", decimals, v),
            })
            .collect()
    }
}

/// One class of a multi-metric table (clustering metrics, chemistry summary)
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub category: String,
    /// Sample count used for the Top-K cut
    pub n: f64,
    /// Metric key -> value; non-finite values mean "not available"
    pub values: BTreeMap<String, f64>,
}

/// Rows of a multi-metric CSV, one per class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricTable {
    pub rows: Vec<MetricRow>,
}

impl MetricTable {
    pub fn new(rows: Vec<MetricRow>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(|r| r.category.as_str())
    }

    /// Project one metric column into ranked rows (rows lacking it get NaN)
    pub fn ranked_rows(&self, key: &str) -> Vec<RankedRow> {
        self.rows
            .iter()
            .map(|r| {
                let value = r.values.get(key).copied().unwrap_or(f64::NAN);
                RankedRow::new(r.category.clone(), value, Some(r.n))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bars() -> Vec<RankedRow> {
        vec![
            RankedRow::new("Steroids", 0.60, Some(188.0)),
            RankedRow::new("Isoflavonoids", 0.60, Some(94.0)),
            RankedRow::new("Triterpenoids", 0.59, Some(342.0)),
            RankedRow::new("Flavonoids", 0.53, Some(348.0)),
            RankedRow::new("Meroterpenoids", 0.52, Some(116.0)),
        ]
    }

    #[test]
    fn test_top_k_by_count_then_value() {
        let view = RankedView::build(&sample_bars(), TopK::new(3), SortOrder::Descending);
        assert_eq!(view.categories, vec!["Steroids", "Triterpenoids", "Flavonoids"]);
    }

    #[test]
    fn test_ascending_order() {
        let view = RankedView::build(&sample_bars(), TopK::new(3), SortOrder::Ascending);
        assert_eq!(view.categories, vec!["Flavonoids", "Triterpenoids", "Steroids"]);
    }

    #[test]
    fn test_non_finite_values_dropped() {
        let rows = vec![
            RankedRow::new("A", f64::NAN, Some(10.0)),
            RankedRow::new("B", 0.5, None),
        ];
        let view = RankedView::build(&rows, TopK::new(5), SortOrder::Descending);
        assert_eq!(view.categories, vec!["B"]);
    }

    #[test]
    fn test_k_larger_than_rows() {
        let view = RankedView::build(&sample_bars(), TopK::new(50), SortOrder::Descending);
        assert_eq!(view.len(), 5);
    }

    #[test]
    fn test_labels() {
        let rows = vec![RankedRow::new("A", 0.6, Some(188.0)), RankedRow::new("B", 0.25, None)];
        let view = RankedView::build(&rows, TopK::new(5), SortOrder::Descending);
        assert_eq!(view.labels(3, true), vec!["0.600 (n=188)", "0.250"]);
        assert_eq!(view.labels(2, false), vec!["0.60", "0.25"]);
    }

    #[test]
    fn test_metric_table_projection() {
        let mut values = BTreeMap::new();
        values.insert("silhouette_cls_umap".to_string(), 0.4);
        let table = MetricTable::new(vec![MetricRow { category: "A".into(), n: 12.0, values }]);
        let rows = table.ranked_rows("silhouette_cls_umap");
        assert_eq!(rows[0].value, 0.4);
        assert!(table.ranked_rows("missing")[0].value.is_nan());
        assert!(!table.is_empty());
        assert!(MetricTable::default().is_empty());
    }
}
