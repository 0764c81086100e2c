//! Top-K frequency view for 2-D projection datasets

use std::collections::{BTreeSet, HashMap, HashSet};

use super::TopK;

/// One point of a 2-D projection (UMAP) dataset
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionSample {
    pub x: f64,
    pub y: f64,
    pub category: String,
}

impl ProjectionSample {
    pub fn new(x: f64, y: f64, category: impl Into<String>) -> Self {
        Self { x, y, category: category.into() }
    }
}

/// Count occurrences per category, remembering first-encounter order
fn frequencies<'a, I>(categories: I) -> Vec<(&'a str, usize)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for c in categories {
        match slots.get(c) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(c, counts.len());
                counts.push((c, 1));
            }
        }
    }
    counts
}

/// The `k` most frequent categories, most frequent first.
///
/// Ties keep input encounter order.
pub fn top_k_categories<'a, I>(categories: I, k: TopK) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = frequencies(categories);
    // sort_by is stable, so equal counts stay in encounter order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(k.get())
        .map(|(c, _)| c.to_string())
        .collect()
}

/// Top-K reduction of a projection dataset
#[derive(Debug, Clone, Default)]
pub struct ProjectionView {
    /// Samples whose category survived the cut, in dataset order
    pub samples: Vec<ProjectionSample>,
    /// Selected categories in frequency order
    pub ranked: Vec<String>,
    /// Selected categories in lexicographic order (legend/checklist)
    pub legend: Vec<String>,
    /// Sample count per category over the full dataset
    pub totals: HashMap<String, usize>,
    allowed: HashSet<String>,
}

impl ProjectionView {
    /// Build the view for `samples` keeping the `k` most frequent categories
    pub fn build(samples: &[ProjectionSample], k: TopK) -> Self {
        let ranked = top_k_categories(samples.iter().map(|s| s.category.as_str()), k);
        let allowed: HashSet<String> = ranked.iter().cloned().collect();

        let kept: Vec<ProjectionSample> = samples
            .iter()
            .filter(|s| allowed.contains(&s.category))
            .cloned()
            .collect();

        let mut legend = ranked.clone();
        legend.sort();

        let mut totals: HashMap<String, usize> = HashMap::new();
        for s in samples {
            *totals.entry(s.category.clone()).or_insert(0) += 1;
        }

        tracing::debug!(
            "Projection view: {} of {} samples kept across {} categories (k={})",
            kept.len(),
            samples.len(),
            legend.len(),
            k
        );

        Self { samples: kept, ranked, legend, totals, allowed }
    }

    pub fn contains(&self, category: &str) -> bool {
        self.allowed.contains(category)
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Drop selected categories that are no longer visible.
    ///
    /// Returns how many were removed.
    pub fn prune_selection(&self, selection: &mut BTreeSet<String>) -> usize {
        let before = selection.len();
        selection.retain(|c| self.allowed.contains(c));
        before - selection.len()
    }

    /// Legend entries whose name contains `filter` (case-insensitive),
    /// paired with their full-dataset sample count
    pub fn checklist(&self, filter: &str) -> Vec<(&str, usize)> {
        let needle = filter.to_lowercase();
        self.legend
            .iter()
            .filter(|c| c.to_lowercase().contains(&needle))
            .map(|c| (c.as_str(), self.totals.get(c).copied().unwrap_or(0)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples_from(counts: &[(&str, usize)]) -> Vec<ProjectionSample> {
        counts
            .iter()
            .flat_map(|&(c, n)| (0..n).map(move |i| ProjectionSample::new(i as f64, 0.0, c)))
            .collect()
    }

    #[test]
    fn test_ties_broken_by_encounter_order() {
        let samples = samples_from(&[("A", 5), ("B", 3), ("C", 3), ("D", 1)]);
        let view = ProjectionView::build(&samples, TopK::new(2));
        assert_eq!(view.ranked, vec!["A", "B"]);
        assert!(view.contains("B"));
        assert!(!view.contains("C"));
        assert_eq!(view.samples.len(), 8);
    }

    #[test]
    fn test_interleaved_encounter_order() {
        let cats = ["C", "B", "A", "B", "C", "A"];
        let top = top_k_categories(cats.iter().copied(), TopK::new(2));
        assert_eq!(top, vec!["C", "B"]);
    }

    #[test]
    fn test_legend_is_lexicographic() {
        let samples = samples_from(&[("Terpenoids", 4), ("Alkaloids", 2), ("Polyketides", 3)]);
        let view = ProjectionView::build(&samples, TopK::new(10));
        assert_eq!(view.ranked, vec!["Terpenoids", "Polyketides", "Alkaloids"]);
        assert_eq!(view.legend, vec!["Alkaloids", "Polyketides", "Terpenoids"]);
    }

    #[test]
    fn test_zero_k_clamped_to_one() {
        let samples = samples_from(&[("A", 2), ("B", 1)]);
        let view = ProjectionView::build(&samples, TopK::new(0));
        assert_eq!(view.legend, vec!["A"]);
    }

    #[test]
    fn test_empty_dataset_gives_empty_view() {
        let view = ProjectionView::build(&[], TopK::new(5));
        assert!(view.is_empty());
        assert!(view.legend.is_empty());
    }

    #[test]
    fn test_prune_selection() {
        let samples = samples_from(&[("A", 3), ("B", 2), ("C", 1)]);
        let view = ProjectionView::build(&samples, TopK::new(2));
        let mut selection: BTreeSet<String> = ["A", "C"].iter().map(|s| s.to_string()).collect();
        assert_eq!(view.prune_selection(&mut selection), 1);
        assert!(selection.contains("A"));
        assert!(!selection.contains("C"));
    }

    #[test]
    fn test_checklist_filter_and_totals() {
        let samples = samples_from(&[("Flavonoids", 4), ("Isoflavonoids", 2), ("Steroids", 1)]);
        let view = ProjectionView::build(&samples, TopK::new(3));
        let rows = view.checklist("FLAV");
        assert_eq!(rows, vec![("Flavonoids", 4), ("Isoflavonoids", 2)]);
    }
}
