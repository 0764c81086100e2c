//! Dashboard State - Single Source of Truth (SSOT)
//!
//! Owns the datasets, the category registry, the highlight coordinator and
//! the layout scheduler, and turns them into render-ready [`ViewModel`]s.
//! Every control change goes through a method here; views are rebuilt when
//! their data or K changes and restyled synchronously on every highlight
//! change.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::catalog::{self, AccuracyKind, Better, ProjectionKind, CHEM_METRICS};
use crate::config::Config;
use crate::heuristics::{self, FontRange, FontSizes};
use crate::highlight::HighlightCoordinator;
use crate::ingest::Datasets;
use crate::layout::{FrameScheduler, ResizePass, ResizeReason, SplitPane, SplitStore};
use crate::palette::{CategoryRegistry, Color};
use crate::views::{
    ConfusionMatrix, ConfusionView, DisplayMode, MetricTable, ProjectionSample, ProjectionView, RankedRow,
    RankedView, SortOrder, TopK,
};

/// Charts the dashboard can mount
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewId {
    Projection,
    Accuracy,
    Metric,
    Chem,
}

/// Render-ready chart: parallel per-item arrays plus presentation hints
#[derive(Debug, Clone, Default, Serialize)]
pub struct ViewModel {
    pub title: String,
    pub categories: Vec<String>,
    pub colors: Vec<Color>,
    /// Bar lengths (empty for scatter views)
    pub values: Vec<f64>,
    /// Scatter coordinates (empty for bar views)
    pub points: Vec<[f64; 2]>,
    /// Bar text
    pub labels: Vec<String>,
    pub opacities: Vec<f32>,
    pub sizes: Vec<f32>,
    #[serde(skip)]
    pub fonts: Option<FontSizes>,
    pub height: f32,
    pub side_margin: f32,
    pub log_axis: bool,
    pub axis_range: Option<(f64, f64)>,
    /// Highlight revision the opacities/sizes were computed at
    pub styled_at: u64,
}

impl ViewModel {
    fn bars(title: String, view: &RankedView, labels: Vec<String>, registry: &CategoryRegistry) -> Self {
        let fonts = heuristics::font_sizes_for_count(view.len(), FontRange::default());
        Self {
            title,
            colors: view.categories.iter().map(|c| registry.color_of(c)).collect(),
            categories: view.categories.clone(),
            values: view.values.clone(),
            side_margin: heuristics::side_margin_for_labels(&labels, fonts.text),
            labels,
            height: heuristics::bar_chart_height(view.len()),
            fonts: Some(fonts),
            ..Default::default()
        }
    }

    fn scatter(title: String, samples: &[ProjectionSample], registry: &CategoryRegistry) -> Self {
        Self {
            title,
            categories: samples.iter().map(|s| s.category.clone()).collect(),
            colors: samples.iter().map(|s| registry.color_of(&s.category)).collect(),
            points: samples.iter().map(|s| [s.x, s.y]).collect(),
            ..Default::default()
        }
    }

    fn restyle(&mut self, highlight: &HighlightCoordinator, point_size: f32) {
        let categories = self.categories.iter().map(String::as_str);
        self.opacities = highlight.opacities(categories.clone());
        self.sizes = highlight.sizes(categories, point_size);
        self.styled_at = highlight.revision();
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }
}

/// Plain parameter state behind the side-panel controls
#[derive(Debug, Clone, PartialEq)]
pub struct Controls {
    pub top_k: TopK,
    pub chem_top_k: TopK,
    pub cm_top_k: TopK,
    pub cm_k: u32,
    pub cm_mode: DisplayMode,
    pub point_size: f32,
    pub sort_descending: bool,
    pub show_n: bool,
    pub filter: String,
}

/// One checklist entry for the active projection
#[derive(Debug, Clone, PartialEq)]
pub struct ChecklistRow {
    pub category: String,
    pub count: usize,
    pub color: Color,
    pub selected: bool,
}

/// Pixel widths of the two top panes after the last resize pass
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PaneWidths {
    pub left: f32,
    pub right: f32,
    pub divider: f32,
    /// Both panes visible with a divider between them
    pub dual: bool,
}

pub struct Dashboard {
    datasets: Datasets,
    registry: CategoryRegistry,
    highlight: HighlightCoordinator,
    scheduler: FrameScheduler,
    split: SplitPane,
    controls: Controls,
    projection_tab: Option<ProjectionKind>,
    accuracy_tab: Option<AccuracyKind>,
    metric_key: Option<&'static str>,
    chem_key: &'static str,
    projection_views: HashMap<ProjectionKind, ProjectionView>,
    models: BTreeMap<ViewId, ViewModel>,
    confusion: ConfusionView,
    container_width: f32,
    panes: PaneWidths,
}

impl Dashboard {
    pub fn new(config: &Config, datasets: Datasets, store: Box<dyn SplitStore>) -> Self {
        let d = &config.defaults;
        let mut dashboard = Self {
            datasets: Datasets::default(),
            registry: CategoryRegistry::new(),
            highlight: HighlightCoordinator::new(d.dim_opacity, d.hide_unselected),
            scheduler: FrameScheduler::new(),
            split: SplitPane::restore(config.layout, store),
            controls: Controls {
                top_k: d.top_k,
                chem_top_k: d.chem_top_k,
                cm_top_k: d.cm_top_k,
                cm_k: d.cm_k,
                cm_mode: d.cm_mode,
                point_size: d.point_size,
                sort_descending: true,
                show_n: d.show_n,
                filter: String::new(),
            },
            projection_tab: None,
            accuracy_tab: None,
            metric_key: None,
            chem_key: CHEM_METRICS[0].key,
            projection_views: HashMap::new(),
            models: BTreeMap::new(),
            confusion: ConfusionView::default(),
            container_width: 0.0,
            panes: PaneWidths::default(),
        };
        dashboard.replace_datasets(datasets);
        dashboard.toggle_projection_tab(ProjectionKind::Cls);
        dashboard
    }

    /// Swap in a whole new data directory's worth of datasets
    pub fn replace_datasets(&mut self, datasets: Datasets) {
        for batch in datasets.category_batches() {
            self.registry.register_categories(batch);
        }
        self.datasets = datasets;
        tracing::info!("Dashboard holds {} categories", self.registry.len());
        self.rebuild_all();
    }

    pub fn load_projection(&mut self, kind: ProjectionKind, samples: Vec<ProjectionSample>) {
        self.registry.register_categories(samples.iter().map(|s| s.category.as_str()));
        self.datasets.projections.insert(kind, samples);
        self.rebuild_projections();
        self.rebuild_metric();
        self.data_changed();
    }

    pub fn load_accuracy(&mut self, kind: AccuracyKind, rows: Vec<RankedRow>) {
        self.registry.register_categories(rows.iter().map(|r| r.category.as_str()));
        self.datasets.accuracy.insert(kind, rows);
        self.rebuild_accuracy();
        self.data_changed();
    }

    pub fn load_metrics(&mut self, table: MetricTable) {
        self.registry.register_categories(table.categories());
        self.datasets.metrics = table;
        self.rebuild_metric();
        self.data_changed();
    }

    pub fn load_chem(&mut self, table: MetricTable) {
        self.registry.register_categories(table.categories());
        self.datasets.chem = table;
        self.rebuild_chem();
        self.data_changed();
    }

    pub fn load_confusion(&mut self, k: u32, matrix: ConfusionMatrix) {
        self.registry.register_categories(matrix.true_labels());
        self.datasets.confusion.insert(k, matrix);
        self.rebuild_confusion();
        self.data_changed();
    }

    fn data_changed(&mut self) {
        self.restyle();
        self.scheduler.request(ResizeReason::Data);
    }

    // ---- accessors ----

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn highlight(&self) -> &HighlightCoordinator {
        &self.highlight
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn datasets(&self) -> &Datasets {
        &self.datasets
    }

    pub fn projection_tab(&self) -> Option<ProjectionKind> {
        self.projection_tab
    }

    pub fn accuracy_tab(&self) -> Option<AccuracyKind> {
        self.accuracy_tab
    }

    pub fn metric_key(&self) -> Option<&'static str> {
        self.metric_key
    }

    pub fn chem_key(&self) -> &'static str {
        self.chem_key
    }

    pub fn view(&self, id: ViewId) -> Option<&ViewModel> {
        self.models.get(&id)
    }

    pub fn projection_view(&self, kind: ProjectionKind) -> Option<&ProjectionView> {
        self.projection_views.get(&kind)
    }

    pub fn confusion(&self) -> &ConfusionView {
        &self.confusion
    }

    pub fn split_fraction(&self) -> f64 {
        self.split.fraction()
    }

    pub fn panes(&self) -> PaneWidths {
        self.panes
    }

    pub fn scheduler(&self) -> &FrameScheduler {
        &self.scheduler
    }

    // ---- tabs ----

    /// Show or hide a projection; its selection drives the highlight
    pub fn toggle_projection_tab(&mut self, kind: ProjectionKind) {
        self.projection_tab = if self.projection_tab == Some(kind) { None } else { Some(kind) };
        self.highlight.set_active(self.projection_tab);
        self.highlight.set_hover(None);
        self.metric_key = self.projection_tab.and_then(|k| {
            let keep = self.metric_key.filter(|key| k.metrics().iter().any(|d| d.key == *key));
            keep.or_else(|| k.default_metric().map(|d| d.key))
        });
        tracing::debug!("Projection tab: {:?}, metric: {:?}", self.projection_tab, self.metric_key);
        self.rebuild_projections();
        self.rebuild_metric();
        self.restyle();
        self.scheduler.request(ResizeReason::Layout);
    }

    /// Show or hide an accuracy chart; resets sort to the kind's natural direction
    pub fn toggle_accuracy_tab(&mut self, kind: AccuracyKind) {
        self.accuracy_tab = if self.accuracy_tab == Some(kind) { None } else { Some(kind) };
        if let Some(kind) = self.accuracy_tab {
            self.controls.sort_descending = kind.default_descending();
        }
        self.highlight.set_hover(None);
        self.rebuild_accuracy();
        self.restyle();
        self.scheduler.request(ResizeReason::Layout);
    }

    /// Switch the per-class metric; keys outside the active projection are ignored
    pub fn set_metric(&mut self, key: &str) -> bool {
        let Some(def) = self.projection_tab.and_then(|k| k.metrics().iter().find(|d| d.key == key)) else {
            return false;
        };
        self.metric_key = Some(def.key);
        self.rebuild_metric();
        self.restyle();
        true
    }

    pub fn set_chem_metric(&mut self, key: &str) -> bool {
        let Some(metric) = catalog::chem_metric(key) else {
            return false;
        };
        self.chem_key = metric.key;
        self.rebuild_chem();
        self.restyle();
        true
    }

    // ---- parameters ----

    /// New K for the projection, accuracy and metric views; prunes selections
    pub fn set_top_k(&mut self, k: i64) {
        let k = TopK::new(k);
        if k == self.controls.top_k {
            return;
        }
        self.controls.top_k = k;
        self.rebuild_projections();
        self.rebuild_accuracy();
        self.rebuild_metric();
        self.restyle();
        self.scheduler.request(ResizeReason::Data);
    }

    pub fn set_chem_top_k(&mut self, k: i64) {
        self.controls.chem_top_k = TopK::new(k);
        self.rebuild_chem();
        self.restyle();
    }

    pub fn set_cm_top_k(&mut self, k: i64) {
        self.controls.cm_top_k = TopK::new(k);
        self.rebuild_confusion();
    }

    /// Pick the confusion counts file; unknown levels are ignored
    pub fn set_cm_k(&mut self, k: u32) -> bool {
        if !catalog::CONFUSION_KS.contains(&k) {
            return false;
        }
        self.controls.cm_k = k;
        self.rebuild_confusion();
        true
    }

    pub fn set_cm_mode(&mut self, mode: DisplayMode) {
        self.controls.cm_mode = mode;
        self.rebuild_confusion();
    }

    pub fn set_sort_descending(&mut self, descending: bool) {
        self.controls.sort_descending = descending;
        self.rebuild_accuracy();
        self.restyle();
    }

    pub fn set_show_n(&mut self, show: bool) {
        self.controls.show_n = show;
        self.rebuild_accuracy();
        self.restyle();
    }

    pub fn set_point_size(&mut self, size: f32) {
        if size.is_finite() && size > 0.0 {
            self.controls.point_size = size;
            self.restyle();
        }
    }

    pub fn set_filter(&mut self, filter: &str) {
        self.controls.filter = filter.to_string();
    }

    // ---- highlight ----

    /// Pointer entered an item (`Some`) or left a view (`None`)
    pub fn set_hover(&mut self, category: Option<&str>) {
        if self.highlight.set_hover(category) {
            self.highlight_changed();
        }
    }

    /// Toggle a category in the active projection's selection
    pub fn toggle_selection(&mut self, category: &str) -> bool {
        let Some(kind) = self.projection_tab else {
            return false;
        };
        let selected = self.highlight.toggle_selection(kind, category);
        self.highlight_changed();
        selected
    }

    pub fn clear_selection(&mut self) {
        if let Some(kind) = self.projection_tab {
            if self.highlight.clear_selection(kind) {
                self.highlight_changed();
            }
        }
    }

    pub fn set_dim_opacity(&mut self, dim: f32) {
        if self.highlight.set_dim_opacity(dim) {
            self.highlight_changed();
        }
    }

    pub fn set_hide_unselected(&mut self, hide: bool) {
        if self.highlight.set_hide_unselected(hide) {
            self.highlight_changed();
        }
    }

    fn highlight_changed(&mut self) {
        tracing::trace!("Highlight revision {}", self.highlight.revision());
        self.restyle();
        self.scheduler.request(ResizeReason::Highlight);
    }

    /// Legend rows of the active projection matching the current filter
    pub fn checklist(&self) -> Vec<ChecklistRow> {
        let Some(kind) = self.projection_tab else {
            return Vec::new();
        };
        let Some(view) = self.projection_views.get(&kind) else {
            return Vec::new();
        };
        view.checklist(&self.controls.filter)
            .into_iter()
            .map(|(c, count)| ChecklistRow {
                category: c.to_string(),
                count,
                color: self.registry.color_of(c),
                selected: self.highlight.is_selected(kind, c),
            })
            .collect()
    }

    pub fn status_line(&self) -> String {
        let showing = self.highlight.status_line(self.controls.top_k.get());
        match self.projection_tab {
            Some(kind) => format!("UMAP: {} • {}", kind.short(), showing),
            None => showing,
        }
    }

    pub fn accuracy_status(&self) -> Option<String> {
        let kind = self.accuracy_tab?;
        let shown = self.models.get(&ViewId::Accuracy).map(ViewModel::len).unwrap_or(0);
        Some(format!(
            "Accuracy: {} • Top-{} by count • {} classes shown",
            kind.label(),
            self.controls.top_k,
            shown
        ))
    }

    pub fn confusion_title(&self) -> String {
        format!("Confusion Matrix - k={} ({})", self.controls.cm_k, self.controls.cm_mode.label())
    }

    // ---- layout ----

    pub fn divider_press(&mut self) {
        self.split.press();
    }

    /// Divider dragged to `x` pixels from the left edge of the pane row
    pub fn divider_drag(&mut self, x: f32) {
        self.split.drag_to(x, &mut self.scheduler);
    }

    pub fn divider_release(&mut self) {
        self.split.release(&mut self.scheduler);
    }

    pub fn request_resize(&mut self) -> bool {
        self.scheduler.request_resize()
    }

    /// Run at the top of every frame: track the container, fire a pending pass
    pub fn begin_frame(&mut self, container_width: f32) -> Option<ResizePass> {
        if (container_width - self.container_width).abs() >= 0.5 {
            self.container_width = container_width;
            self.split.set_container_width(container_width, &mut self.scheduler);
        }
        let pass = self.scheduler.advance_frame()?;
        self.relayout();
        Some(pass)
    }

    fn relayout(&mut self) {
        let dual = self.projection_tab.is_some() && self.accuracy_tab.is_some();
        self.panes = if dual {
            let left = self.split.left_width();
            let geometry = self.split.geometry();
            let avail = geometry.available(self.container_width);
            PaneWidths { left, right: (avail - left).max(0.0), divider: geometry.divider_width, dual }
        } else {
            PaneWidths { left: self.container_width, right: self.container_width, divider: 0.0, dual }
        };
    }

    // ---- view rebuilding ----

    fn rebuild_all(&mut self) {
        self.rebuild_projections();
        self.rebuild_accuracy();
        self.rebuild_metric();
        self.rebuild_chem();
        self.rebuild_confusion();
        self.restyle();
    }

    fn rebuild_projections(&mut self) {
        let k = self.controls.top_k;
        for kind in ProjectionKind::ALL {
            let view = ProjectionView::build(self.datasets.projection(kind), k);
            self.highlight.retain_selection(kind, |c| view.contains(c));
            self.projection_views.insert(kind, view);
        }

        match self.projection_tab.and_then(|kind| self.projection_views.get(&kind).map(|v| (kind, v))) {
            Some((kind, view)) => {
                let model = ViewModel::scatter(kind.label().to_string(), &view.samples, &self.registry);
                self.models.insert(ViewId::Projection, model);
            }
            None => {
                self.models.remove(&ViewId::Projection);
            }
        }
    }

    fn rebuild_accuracy(&mut self) {
        let Some(kind) = self.accuracy_tab else {
            self.models.remove(&ViewId::Accuracy);
            return;
        };
        let k = self.controls.top_k;
        let order = SortOrder::from_descending(self.controls.sort_descending);
        let view = RankedView::build(self.datasets.accuracy(kind), k, order);
        let labels = view.labels(kind.decimals(), self.controls.show_n);
        let title = format!("NP superclass - {} (Top-{} by count)", kind.title(), k);
        let mut model = ViewModel::bars(title, &view, labels, &self.registry);
        model.log_axis = kind.log_axis();
        model.axis_range = (!kind.log_axis()).then_some((0.0, 1.02));
        self.models.insert(ViewId::Accuracy, model);
    }

    fn rebuild_metric(&mut self) {
        let def = self.metric_key.and_then(catalog::metric_def);
        let (Some(_), Some(def)) = (self.projection_tab, def) else {
            self.models.remove(&ViewId::Metric);
            return;
        };
        let k = self.controls.top_k;
        let order = match def.better {
            Better::High => SortOrder::Descending,
            Better::Low => SortOrder::Ascending,
        };
        let view = RankedView::build(&self.datasets.metrics.ranked_rows(def.key), k, order);
        let labels = view.labels(3, true);
        let title = format!("Per-class: {} (Top-{} by count)", def.label, k);
        let mut model = ViewModel::bars(title, &view, labels, &self.registry);
        model.axis_range = def.axis_range;
        self.models.insert(ViewId::Metric, model);
    }

    fn rebuild_chem(&mut self) {
        let k = self.controls.chem_top_k;
        let label = catalog::chem_metric(self.chem_key).map(|m| m.label).unwrap_or(self.chem_key);
        let view = RankedView::build(&self.datasets.chem.ranked_rows(self.chem_key), k, SortOrder::Descending);
        let labels = view.labels(2, true);
        let title = format!("{} (Top-{} by items)", label, k);
        self.models.insert(ViewId::Chem, ViewModel::bars(title, &view, labels, &self.registry));
    }

    fn rebuild_confusion(&mut self) {
        self.confusion = match self.datasets.confusion.get(&self.controls.cm_k) {
            Some(matrix) => ConfusionView::build(matrix, self.controls.cm_top_k, self.controls.cm_mode),
            None => ConfusionView::default(),
        };
    }

    fn restyle(&mut self) {
        let point_size = self.controls.point_size;
        for model in self.models.values_mut() {
            model.restyle(&self.highlight, point_size);
        }
    }
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("categories", &self.registry.len())
            .field("projection_tab", &self.projection_tab)
            .field("accuracy_tab", &self.accuracy_tab)
            .field("metric_key", &self.metric_key)
            .field("controls", &self.controls)
            .field("split", &self.split)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::DEFAULT_DIM_OPACITY;
    use crate::layout::MemoryStore;
    use crate::views::MetricRow;

    fn samples(counts: &[(&str, usize)]) -> Vec<ProjectionSample> {
        counts
            .iter()
            .flat_map(|&(c, n)| (0..n).map(move |i| ProjectionSample::new(i as f64, 1.0, c)))
            .collect()
    }

    fn dashboard() -> Dashboard {
        let mut sets = Datasets::default();
        sets.projections.insert(ProjectionKind::Cls, samples(&[("A", 5), ("B", 3), ("C", 3), ("D", 1)]));
        sets.projections.insert(ProjectionKind::Tani, samples(&[("B", 2), ("E", 1)]));
        sets.accuracy.insert(
            AccuracyKind::Rank1,
            vec![RankedRow::new("A", 0.9, Some(5.0)), RankedRow::new("B", 0.4, Some(3.0))],
        );
        sets.accuracy.insert(
            AccuracyKind::MeanRank,
            vec![RankedRow::new("A", 1.5, Some(5.0)), RankedRow::new("B", 4.0, Some(3.0))],
        );
        Dashboard::new(&Config::default(), sets, Box::new(MemoryStore::default()))
    }

    #[test]
    fn test_boots_on_cls_with_umap_metric() {
        let d = dashboard();
        assert_eq!(d.projection_tab(), Some(ProjectionKind::Cls));
        assert_eq!(d.metric_key(), Some("silhouette_cls_umap"));
        assert_eq!(d.view(ViewId::Projection).map(ViewModel::len), Some(12));
        assert!(d.view(ViewId::Accuracy).is_none());
        assert_eq!(d.registry().len(), 5);
    }

    #[test]
    fn test_hover_restyles_every_view_synchronously() {
        let mut d = dashboard();
        d.toggle_accuracy_tab(AccuracyKind::Rank1);
        d.set_hover(Some("B"));
        let rev = d.highlight().revision();
        for id in [ViewId::Projection, ViewId::Accuracy] {
            let model = d.view(id).unwrap();
            assert_eq!(model.styled_at, rev);
            for (c, o) in model.categories.iter().zip(&model.opacities) {
                let want = if c == "B" { 1.0 } else { DEFAULT_DIM_OPACITY };
                assert_eq!(*o, want);
            }
        }
        d.set_hover(None);
        assert!(d.view(ViewId::Accuracy).unwrap().opacities.iter().all(|&o| o == 1.0));
    }

    #[test]
    fn test_selection_sizes_points() {
        let mut d = dashboard();
        assert!(d.toggle_selection("A"));
        let model = d.view(ViewId::Projection).unwrap();
        let i = model.categories.iter().position(|c| c == "A").unwrap();
        assert_eq!(model.sizes[i], 6.5);
        let j = model.categories.iter().position(|c| c == "B").unwrap();
        assert_eq!(model.sizes[j], 5.0);
        assert!(d.status_line().ends_with("Showing: A (selection)"));
    }

    #[test]
    fn test_top_k_prunes_selection() {
        let mut d = dashboard();
        d.toggle_selection("C");
        d.toggle_selection("A");
        d.set_top_k(2);
        let sel = d.highlight().selection(ProjectionKind::Cls).unwrap();
        assert!(sel.contains("A"));
        assert!(!sel.contains("C"));
        assert_eq!(d.view(ViewId::Projection).map(ViewModel::len), Some(8));
    }

    #[test]
    fn test_accuracy_tab_resets_sort() {
        let mut d = dashboard();
        d.toggle_accuracy_tab(AccuracyKind::MeanRank);
        assert!(!d.controls().sort_descending);
        assert_eq!(d.view(ViewId::Accuracy).unwrap().categories, vec!["A", "B"]);
        assert!(d.view(ViewId::Accuracy).unwrap().log_axis);
        d.toggle_accuracy_tab(AccuracyKind::Rank1);
        assert!(d.controls().sort_descending);
        d.toggle_accuracy_tab(AccuracyKind::Rank1);
        assert!(d.view(ViewId::Accuracy).is_none());
    }

    #[test]
    fn test_closing_projection_hides_metric() {
        let mut d = dashboard();
        d.toggle_projection_tab(ProjectionKind::Cls);
        assert_eq!(d.metric_key(), None);
        assert!(d.view(ViewId::Metric).is_none());
        assert!(d.checklist().is_empty());
        d.toggle_projection_tab(ProjectionKind::Tani);
        assert_eq!(d.metric_key(), Some("silhouette_fp_umap"));
        assert!(!d.set_metric("silhouette_cls_umap"));
    }

    #[test]
    fn test_checklist_uses_filter_and_registry_colors() {
        let mut d = dashboard();
        d.toggle_selection("B");
        d.set_filter("b");
        let rows = d.checklist();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].count, 3);
        assert!(rows[0].selected);
        assert_eq!(rows[0].color, d.registry().color_of("B"));
    }

    #[test]
    fn test_metric_low_is_better_sorts_ascending() {
        let mut d = dashboard();
        let row = |c: &str, n: f64, v: f64| MetricRow {
            category: c.into(),
            n,
            values: [("radius_cls_native".to_string(), v)].into_iter().collect(),
        };
        d.load_metrics(MetricTable::new(vec![row("A", 5.0, 2.0), row("B", 3.0, 1.0), row("Z", 1.0, 9.0)]));
        assert!(d.registry().contains("Z"));
        assert!(d.set_metric("radius_cls_native"));
        assert_eq!(d.view(ViewId::Metric).unwrap().categories, vec!["B", "A", "Z"]);
    }

    #[test]
    fn test_confusion_follows_controls() {
        let mut d = dashboard();
        assert!(d.confusion().is_empty());
        let labels: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let matrix = ConfusionMatrix::new(labels.clone(), labels, vec![vec![1.0; 3]; 3]);
        d.load_confusion(5, matrix);
        assert!(d.confusion().is_empty());
        assert!(d.set_cm_k(5));
        assert!(!d.set_cm_k(7));
        d.set_cm_top_k(1);
        assert_eq!(d.confusion().labels, vec!["A", "Other"]);
        assert_eq!(d.confusion().cmax, 1.0);
    }

    #[test]
    fn test_frame_pass_coalesces_and_lays_out() {
        let mut d = dashboard();
        d.toggle_accuracy_tab(AccuracyKind::Rank1);
        d.set_hover(Some("A"));
        d.set_hover(None);
        let pass = d.begin_frame(1006.0).unwrap();
        assert_eq!(pass.reason, ResizeReason::Window);
        assert!(d.begin_frame(1006.0).is_none());
        let panes = d.panes();
        assert!(panes.dual);
        assert_eq!(panes.left + panes.right, 1000.0);
    }
}
