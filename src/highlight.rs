//! Highlight Coordinator - single source of truth for emphasis
//!
//! Two producers feed the highlight: a transient hover category and a
//! persistent multi-selection per projection dataset. Hover always wins.
//! Every query here is pure so each view can style itself independently
//! and still agree with every other view.

use std::collections::{BTreeSet, HashMap};

use crate::catalog::ProjectionKind;

/// Extra marker size for emphasized points
pub const EMPHASIS_BONUS: f32 = 1.5;

/// Dim opacity used when none is configured
pub const DEFAULT_DIM_OPACITY: f32 = 0.12;

/// Where the current emphasis comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightSource {
    None,
    Hover,
    Selection,
}

/// Borrowed view of the effective highlight set
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Highlight<'a> {
    /// Nothing emphasized: everything at full strength
    Empty,
    Hover(&'a str),
    Selection(&'a BTreeSet<String>),
}

impl Highlight<'_> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Highlight::Empty)
    }

    pub fn contains(&self, category: &str) -> bool {
        match self {
            Highlight::Empty => false,
            Highlight::Hover(h) => *h == category,
            Highlight::Selection(set) => set.contains(category),
        }
    }

    pub fn source(&self) -> HighlightSource {
        match self {
            Highlight::Empty => HighlightSource::None,
            Highlight::Hover(_) => HighlightSource::Hover,
            Highlight::Selection(_) => HighlightSource::Selection,
        }
    }

    pub fn to_set(&self) -> BTreeSet<String> {
        match self {
            Highlight::Empty => BTreeSet::new(),
            Highlight::Hover(h) => BTreeSet::from([h.to_string()]),
            Highlight::Selection(set) => (*set).clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HighlightCoordinator {
    hover: Option<String>,
    selections: HashMap<ProjectionKind, BTreeSet<String>>,
    active: Option<ProjectionKind>,
    dim_opacity: f32,
    hide_unselected: bool,
    revision: u64,
}

impl Default for HighlightCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_DIM_OPACITY, false)
    }
}

impl HighlightCoordinator {
    pub fn new(dim_opacity: f32, hide_unselected: bool) -> Self {
        Self {
            hover: None,
            selections: HashMap::new(),
            active: None,
            dim_opacity: clamp_dim(dim_opacity),
            hide_unselected,
            revision: 0,
        }
    }

    /// Bumps on every effective state change; views restyle when it moves
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn bump(&mut self) -> bool {
        self.revision += 1;
        true
    }

    pub fn hover(&self) -> Option<&str> {
        self.hover.as_deref()
    }

    /// Set or clear the hover category. Never touches any selection.
    pub fn set_hover(&mut self, category: Option<&str>) -> bool {
        let category = category.filter(|c| !c.is_empty());
        if self.hover.as_deref() == category {
            return false;
        }
        self.hover = category.map(str::to_string);
        self.bump()
    }

    pub fn active(&self) -> Option<ProjectionKind> {
        self.active
    }

    /// Switch the dataset whose selection feeds the highlight; clears hover
    pub fn set_active(&mut self, dataset: Option<ProjectionKind>) -> bool {
        if self.active == dataset && self.hover.is_none() {
            return false;
        }
        self.active = dataset;
        self.hover = None;
        self.bump()
    }

    pub fn selection(&self, dataset: ProjectionKind) -> Option<&BTreeSet<String>> {
        self.selections.get(&dataset)
    }

    pub fn is_selected(&self, dataset: ProjectionKind, category: &str) -> bool {
        self.selections.get(&dataset).is_some_and(|s| s.contains(category))
    }

    /// Add or remove `category` from the dataset's selection.
    ///
    /// Returns whether the category is selected afterwards.
    pub fn toggle_selection(&mut self, dataset: ProjectionKind, category: &str) -> bool {
        let set = self.selections.entry(dataset).or_default();
        let selected = if set.remove(category) {
            false
        } else {
            set.insert(category.to_string());
            true
        };
        self.bump();
        selected
    }

    pub fn set_selected(&mut self, dataset: ProjectionKind, category: &str, selected: bool) -> bool {
        if self.is_selected(dataset, category) == selected {
            return false;
        }
        self.toggle_selection(dataset, category);
        true
    }

    pub fn clear_selection(&mut self, dataset: ProjectionKind) -> bool {
        let cleared = self.selections.get_mut(&dataset).is_some_and(|set| {
            let had_any = !set.is_empty();
            set.clear();
            had_any
        });
        cleared && self.bump()
    }

    /// Keep only selected categories accepted by `keep`; returns how many were dropped
    pub fn retain_selection<F>(&mut self, dataset: ProjectionKind, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let Some(set) = self.selections.get_mut(&dataset) else {
            return 0;
        };
        let before = set.len();
        set.retain(|c| keep(c));
        let dropped = before - set.len();
        if dropped > 0 {
            self.bump();
        }
        dropped
    }

    pub fn dim_opacity(&self) -> f32 {
        self.dim_opacity
    }

    pub fn set_dim_opacity(&mut self, dim_opacity: f32) -> bool {
        let dim_opacity = clamp_dim(dim_opacity);
        if dim_opacity == self.dim_opacity {
            return false;
        }
        self.dim_opacity = dim_opacity;
        self.bump()
    }

    pub fn hide_unselected(&self) -> bool {
        self.hide_unselected
    }

    pub fn set_hide_unselected(&mut self, hide: bool) -> bool {
        if hide == self.hide_unselected {
            return false;
        }
        self.hide_unselected = hide;
        self.bump()
    }

    /// Hover singleton if hovering, else the active selection, else empty
    pub fn effective_highlight(&self) -> Highlight<'_> {
        if let Some(h) = &self.hover {
            return Highlight::Hover(h);
        }
        match self.active.and_then(|d| self.selections.get(&d)) {
            Some(set) if !set.is_empty() => Highlight::Selection(set),
            _ => Highlight::Empty,
        }
    }

    /// 1.0 when nothing is emphasized or `category` is; otherwise hidden or dimmed
    pub fn opacity_for(&self, category: &str, hide_unselected: bool, dim_opacity: f32) -> f32 {
        let highlight = self.effective_highlight();
        if highlight.is_empty() || highlight.contains(category) {
            1.0
        } else if hide_unselected {
            0.0
        } else {
            dim_opacity
        }
    }

    /// `base + bonus` for emphasized categories, `base` otherwise
    pub fn size_for(&self, category: &str, base_size: f32, emphasized_bonus: f32) -> f32 {
        if self.effective_highlight().contains(category) {
            base_size + emphasized_bonus
        } else {
            base_size
        }
    }

    /// [`Self::opacity_for`] with the coordinator's own dim/hide settings
    pub fn styled_opacity(&self, category: &str) -> f32 {
        self.opacity_for(category, self.hide_unselected, self.dim_opacity)
    }

    pub fn opacities<'a, I>(&self, categories: I) -> Vec<f32>
    where
        I: IntoIterator<Item = &'a str>,
    {
        categories.into_iter().map(|c| self.styled_opacity(c)).collect()
    }

    pub fn sizes<'a, I>(&self, categories: I, base_size: f32) -> Vec<f32>
    where
        I: IntoIterator<Item = &'a str>,
    {
        categories
            .into_iter()
            .map(|c| self.size_for(c, base_size, EMPHASIS_BONUS))
            .collect()
    }

    /// e.g. `Showing: Alkaloids (hover)`, `Showing: A, B (selection)` or
    /// `Showing: Top-20 by count` when nothing is emphasized
    pub fn status_line(&self, top_k: usize) -> String {
        let highlight = self.effective_highlight();
        let names = || highlight.to_set().into_iter().collect::<Vec<_>>().join(", ");
        match highlight.source() {
            HighlightSource::None => format!("Showing: Top-{} by count", top_k),
            HighlightSource::Hover => format!("Showing: {} (hover)", names()),
            HighlightSource::Selection => format!("Showing: {} (selection)", names()),
        }
    }
}

fn clamp_dim(v: f32) -> f32 {
    if v.is_finite() {
        v.clamp(0.0, 0.99)
    } else {
        DEFAULT_DIM_OPACITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLS: ProjectionKind = ProjectionKind::Cls;

    fn selecting(names: &[&str]) -> HighlightCoordinator {
        let mut h = HighlightCoordinator::default();
        h.set_active(Some(CLS));
        for n in names {
            h.toggle_selection(CLS, n);
        }
        h
    }

    #[test]
    fn test_neutral_state_full_opacity() {
        let h = HighlightCoordinator::default();
        assert!(h.effective_highlight().is_empty());
        assert_eq!(h.opacity_for("anything", true, 0.1), 1.0);
        assert_eq!(h.size_for("anything", 5.0, 1.5), 5.0);
    }

    #[test]
    fn test_hover_overrides_selection() {
        let mut h = selecting(&["A", "B", "C"]);
        h.set_hover(Some("D"));
        assert_eq!(h.effective_highlight(), Highlight::Hover("D"));
        assert_eq!(h.opacity_for("A", false, 0.2), 0.2);
        assert_eq!(h.opacity_for("D", false, 0.2), 1.0);
        assert_eq!(h.size_for("D", 5.0, 1.5), 6.5);

        h.set_hover(None);
        assert!(h.effective_highlight().contains("A"));
        assert_eq!(h.selection(CLS).map(|s| s.len()), Some(3));
    }

    #[test]
    fn test_hide_unselected() {
        let h = selecting(&["A"]);
        assert_eq!(h.opacity_for("B", true, 0.3), 0.0);
        assert_eq!(h.opacity_for("B", false, 0.3), 0.3);
        assert_eq!(h.opacity_for("A", true, 0.3), 1.0);
    }

    #[test]
    fn test_selection_is_per_dataset() {
        let mut h = selecting(&["A"]);
        h.set_active(Some(ProjectionKind::Tani));
        assert!(h.effective_highlight().is_empty());
        h.set_active(Some(CLS));
        assert!(h.effective_highlight().contains("A"));
    }

    #[test]
    fn test_toggle_does_not_touch_hover() {
        let mut h = selecting(&[]);
        h.set_hover(Some("X"));
        assert!(h.toggle_selection(CLS, "A"));
        assert_eq!(h.hover(), Some("X"));
        assert!(!h.toggle_selection(CLS, "A"));
    }

    #[test]
    fn test_revision_only_moves_on_change() {
        let mut h = HighlightCoordinator::default();
        let r0 = h.revision();
        assert!(h.set_hover(Some("A")));
        assert!(!h.set_hover(Some("A")));
        assert!(!h.set_dim_opacity(h.dim_opacity()));
        assert_eq!(h.revision(), r0 + 1);
        assert!(h.set_hide_unselected(true));
        assert_eq!(h.revision(), r0 + 2);
    }

    #[test]
    fn test_switching_dataset_clears_hover() {
        let mut h = selecting(&["A"]);
        h.set_hover(Some("A"));
        h.set_active(Some(ProjectionKind::Tani));
        assert_eq!(h.hover(), None);
    }

    #[test]
    fn test_unknown_hover_category_is_valid_target() {
        let mut h = HighlightCoordinator::default();
        h.set_hover(Some("never-registered"));
        assert_eq!(h.styled_opacity("never-registered"), 1.0);
        assert_eq!(h.styled_opacity("other"), DEFAULT_DIM_OPACITY);
    }

    #[test]
    fn test_retain_selection() {
        let mut h = selecting(&["A", "B"]);
        assert_eq!(h.retain_selection(CLS, |c| c == "A"), 1);
        assert_eq!(h.retain_selection(ProjectionKind::Tani, |_| false), 0);
        assert!(h.is_selected(CLS, "A"));
    }

    #[test]
    fn test_status_line() {
        let mut h = selecting(&["B", "A"]);
        assert_eq!(h.status_line(20), "Showing: A, B (selection)");
        h.set_hover(Some("C"));
        assert_eq!(h.status_line(20), "Showing: C (hover)");
        h.clear_selection(CLS);
        h.set_hover(None);
        assert_eq!(h.status_line(20), "Showing: Top-20 by count");
    }

    #[test]
    fn test_status_line_neutral_has_no_source() {
        let h = HighlightCoordinator::default();
        assert_eq!(h.effective_highlight().source(), HighlightSource::None);
        assert_eq!(h.status_line(7), "Showing: Top-7 by count");

        // An active dataset with an emptied selection is neutral too
        let mut h = selecting(&["A"]);
        h.toggle_selection(CLS, "A");
        assert_eq!(h.effective_highlight().source(), HighlightSource::None);
        assert!(!h.status_line(20).ends_with("(selection)"));
    }

    #[test]
    fn test_dim_opacity_clamped() {
        let mut h = HighlightCoordinator::default();
        h.set_dim_opacity(3.0);
        assert!(h.dim_opacity() < 1.0);
        h.set_dim_opacity(-1.0);
        assert_eq!(h.dim_opacity(), 0.0);
    }
}
