//! Native dashboard using egui
//!
//! Side panel holds the controls; the central panel shows the projection
//! scatter and the accuracy bars side by side, then the per-class metric,
//! chemistry and confusion charts. All state lives in [`Dashboard`]; this
//! module only draws view models and reports pointer events back.

use eframe::egui;
use egui_plot::{AxisHints, Bar, BarChart, MarkerShape, Plot, PlotPoint, Points, Text};
use tracing::{info, trace};

use crate::catalog::{self, AccuracyKind, ProjectionKind, CHEM_METRICS, CONFUSION_KS};
use crate::heuristics;
use crate::palette::Color;
use crate::state::{Dashboard, ViewId, ViewModel};
use crate::views::{ConfusionView, DisplayMode};

/// Height of the projection/accuracy pane row
const PANE_HEIGHT: f32 = 460.0;

/// Left margin reserved for category tick labels on bar charts
const BAR_LABEL_WIDTH: f32 = 220.0;

/// Pointer distance (px) within which a scatter point counts as hovered
const HOVER_RADIUS: f32 = 8.0;

const HEATMAP_TICK_ANGLE: f32 = 55.0;

/// Cividis-like ramp for row fractions
const ROW_SCALE: [[u8; 3]; 3] = [[0, 32, 77], [124, 123, 120], [255, 234, 70]];
/// Yellow-orange-red ramp for raw counts
const COUNT_SCALE: [[u8; 3]; 4] = [[255, 255, 204], [254, 178, 76], [240, 59, 32], [128, 0, 38]];

/// Run the native dashboard
pub fn run_dashboard(dashboard: Dashboard) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_title("SPECTRE"),
        ..Default::default()
    };

    eframe::run_native(
        "SPECTRE",
        options,
        Box::new(|cc| Ok(Box::new(DashboardApp::new(cc, dashboard)))),
    )
    .map_err(|e| anyhow::anyhow!("GUI error: {}", e))
}

struct DashboardApp {
    dashboard: Dashboard,
    /// View that reported the current hover, so only it can clear it
    hover_source: Option<ViewId>,
    top_k: i64,
    chem_top_k: i64,
    cm_top_k: i64,
    filter: String,
}

impl DashboardApp {
    fn new(cc: &eframe::CreationContext<'_>, dashboard: Dashboard) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());
        info!("Dashboard opened at split fraction {:.3}", dashboard.split_fraction());
        let c = dashboard.controls().clone();
        Self {
            top_k: c.top_k.get() as i64,
            chem_top_k: c.chem_top_k.get() as i64,
            cm_top_k: c.cm_top_k.get() as i64,
            filter: c.filter,
            dashboard,
            hover_source: None,
        }
    }

    /// Apply a chart's pointer state: enter sets hover, leave clears it
    fn report_hover(&mut self, id: ViewId, hit: Option<String>) {
        match hit {
            Some(category) => {
                self.dashboard.set_hover(Some(&category));
                self.hover_source = Some(id);
            }
            None if self.hover_source == Some(id) => {
                self.dashboard.set_hover(None);
                self.hover_source = None;
            }
            None => {}
        }
    }

    fn side_panel(&mut self, ui: &mut egui::Ui) {
        ui.heading("SPECTRE");
        ui.separator();

        ui.label("Projection");
        ui.horizontal(|ui| {
            for kind in ProjectionKind::ALL {
                let on = self.dashboard.projection_tab() == Some(kind);
                if ui.selectable_label(on, kind.label()).clicked() {
                    self.hover_source = None;
                    self.dashboard.toggle_projection_tab(kind);
                }
            }
        });

        ui.horizontal(|ui| {
            ui.label("Top-K:");
            if ui.add(egui::DragValue::new(&mut self.top_k).range(1..=500)).changed() {
                self.dashboard.set_top_k(self.top_k);
            }
        });

        let mut point_size = self.dashboard.controls().point_size;
        if ui.add(egui::Slider::new(&mut point_size, 1.0..=20.0).text("Point size")).changed() {
            self.dashboard.set_point_size(point_size);
        }
        let mut dim = self.dashboard.highlight().dim_opacity();
        if ui.add(egui::Slider::new(&mut dim, 0.0..=0.99).text("Dim opacity")).changed() {
            self.dashboard.set_dim_opacity(dim);
        }
        let mut hide = self.dashboard.highlight().hide_unselected();
        if ui.checkbox(&mut hide, "Hide unselected").changed() {
            self.dashboard.set_hide_unselected(hide);
        }

        ui.separator();
        ui.horizontal(|ui| {
            ui.label("Filter:");
            if ui.text_edit_singleline(&mut self.filter).changed() {
                self.dashboard.set_filter(&self.filter);
            }
        });
        if ui.button("Clear selection").clicked() {
            self.dashboard.clear_selection();
        }

        let mut toggled: Option<String> = None;
        egui::ScrollArea::vertical().max_height(260.0).show(ui, |ui| {
            for row in self.dashboard.checklist() {
                ui.horizontal(|ui| {
                    let mut checked = row.selected;
                    if ui.checkbox(&mut checked, "").changed() {
                        toggled = Some(row.category.clone());
                    }
                    ui.colored_label(color32(row.color, 1.0), "■");
                    ui.label(format!("{} ({})", row.category, row.count));
                });
            }
        });
        if let Some(category) = toggled {
            self.dashboard.toggle_selection(&category);
        }

        ui.separator();
        ui.label("Accuracy");
        ui.horizontal(|ui| {
            for kind in AccuracyKind::ALL {
                let on = self.dashboard.accuracy_tab() == Some(kind);
                if ui.selectable_label(on, kind.label()).clicked() {
                    self.hover_source = None;
                    self.dashboard.toggle_accuracy_tab(kind);
                }
            }
        });
        let mut desc = self.dashboard.controls().sort_descending;
        if ui.checkbox(&mut desc, "Sort descending").changed() {
            self.dashboard.set_sort_descending(desc);
        }
        let mut show_n = self.dashboard.controls().show_n;
        if ui.checkbox(&mut show_n, "Show n").changed() {
            self.dashboard.set_show_n(show_n);
        }

        ui.separator();
        ui.label("Chemistry");
        let chem_key = self.dashboard.chem_key();
        let chem_label = catalog::chem_metric(chem_key).map(|m| m.label).unwrap_or(chem_key);
        let mut picked: Option<&'static str> = None;
        egui::ComboBox::from_id_salt("chem_metric")
            .selected_text(chem_label)
            .show_ui(ui, |ui| {
                for m in CHEM_METRICS.iter() {
                    if ui.selectable_label(m.key == chem_key, m.label).clicked() {
                        picked = Some(m.key);
                    }
                }
            });
        if let Some(key) = picked {
            self.dashboard.set_chem_metric(key);
        }
        ui.horizontal(|ui| {
            ui.label("Top-K:");
            if ui.add(egui::DragValue::new(&mut self.chem_top_k).range(1..=500)).changed() {
                self.dashboard.set_chem_top_k(self.chem_top_k);
            }
        });

        ui.separator();
        ui.label("Confusion matrix");
        ui.horizontal(|ui| {
            for k in CONFUSION_KS {
                let on = self.dashboard.controls().cm_k == k;
                if ui.selectable_label(on, format!("k={}", k)).clicked() {
                    self.dashboard.set_cm_k(k);
                }
            }
        });
        ui.horizontal(|ui| {
            for mode in [DisplayMode::RowNormalized, DisplayMode::Counts] {
                let on = self.dashboard.controls().cm_mode == mode;
                if ui.selectable_label(on, mode.label()).clicked() {
                    self.dashboard.set_cm_mode(mode);
                }
            }
        });
        ui.horizontal(|ui| {
            ui.label("Top-K:");
            if ui.add(egui::DragValue::new(&mut self.cm_top_k).range(1..=500)).changed() {
                self.dashboard.set_cm_top_k(self.cm_top_k);
            }
        });
    }

    /// Projection and accuracy panes, split by the divider when both are open
    fn pane_row(&mut self, ui: &mut egui::Ui) {
        let panes = self.dashboard.panes();
        let projection = self.dashboard.projection_tab().is_some();
        let accuracy = self.dashboard.accuracy_tab().is_some();

        if !projection && !accuracy {
            placeholder(ui, "Select a projection or an accuracy chart.");
            return;
        }

        ui.horizontal_top(|ui| {
            ui.spacing_mut().item_spacing.x = 0.0;
            let row_left = ui.cursor().left();
            if projection {
                let width = if panes.dual { panes.left } else { ui.available_width() };
                let hit = ui
                    .allocate_ui(egui::vec2(width, PANE_HEIGHT), |ui| self.projection_pane(ui))
                    .inner;
                self.report_hover(ViewId::Projection, hit);
            }
            if panes.dual {
                self.divider(ui, row_left);
            }
            if accuracy {
                let width = if panes.dual { panes.right } else { ui.available_width() };
                let hit = ui
                    .allocate_ui(egui::vec2(width, PANE_HEIGHT), |ui| {
                        if let Some(status) = self.dashboard.accuracy_status() {
                            ui.small(status);
                        }
                        match self.dashboard.view(ViewId::Accuracy) {
                            Some(model) => bar_chart(ui, "accuracy_plot", model, Some(PANE_HEIGHT - 24.0)),
                            None => None,
                        }
                    })
                    .inner;
                self.report_hover(ViewId::Accuracy, hit);
            }
        });
    }

    fn projection_pane(&self, ui: &mut egui::Ui) -> Option<String> {
        ui.small(self.dashboard.status_line());
        let model = self.dashboard.view(ViewId::Projection)?;
        if model.is_empty() {
            placeholder(ui, "No projection samples.");
            return None;
        }
        scatter(ui, model, PANE_HEIGHT - 24.0)
    }

    /// `row_left` is the screen x of the pane row's left edge
    fn divider(&mut self, ui: &mut egui::Ui, row_left: f32) {
        let divider_width = self.dashboard.panes().divider;
        let (rect, response) = ui.allocate_exact_size(egui::vec2(divider_width, PANE_HEIGHT), egui::Sense::drag());
        let response = response.on_hover_cursor(egui::CursorIcon::ResizeHorizontal);
        let fill = if response.dragged() || response.hovered() {
            egui::Color32::from_gray(150)
        } else {
            egui::Color32::from_gray(210)
        };
        ui.painter().rect_filled(rect, 2.0, fill);

        if response.drag_started() {
            self.dashboard.divider_press();
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.dashboard.divider_drag(pos.x - row_left);
            }
        }
        if response.drag_stopped() {
            self.dashboard.divider_release();
        }
    }

    fn metric_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Per-class metrics");
        let Some(kind) = self.dashboard.projection_tab() else {
            placeholder(ui, "Select CLS or Tanimoto UMAP to see metrics.");
            return;
        };

        let current = self.dashboard.metric_key();
        let mut picked: Option<&'static str> = None;
        ui.horizontal_wrapped(|ui| {
            for def in kind.metrics() {
                if ui.selectable_label(current == Some(def.key), def.label).clicked() {
                    picked = Some(def.key);
                }
            }
        });
        if let Some(key) = picked {
            self.dashboard.set_metric(key);
        }

        if let Some(def) = self.dashboard.metric_key().and_then(catalog::metric_def) {
            ui.label(egui::RichText::new(def.label).strong());
            ui.label(def.description);
            ui.label(format!("Interpretation: {}", def.interpretation()));
        }

        let hit = match self.dashboard.view(ViewId::Metric) {
            _ if self.dashboard.datasets().metrics.is_empty() => {
                placeholder(ui, "No metrics loaded.");
                None
            }
            Some(model) if !model.is_empty() => bar_chart(ui, "metric_plot", model, None),
            _ => {
                placeholder(ui, "No classes have a value for this metric.");
                None
            }
        };
        self.report_hover(ViewId::Metric, hit);
    }

    fn chem_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Chemistry");
        if let Some(m) = catalog::chem_metric(self.dashboard.chem_key()) {
            ui.label(egui::RichText::new(m.label).strong());
            ui.label(m.explain);
            ui.label("Display: Top-K superclasses by n_items.");
        }
        let hit = match self.dashboard.view(ViewId::Chem) {
            _ if self.dashboard.datasets().chem.is_empty() => {
                placeholder(ui, "No chemistry CSV loaded.");
                None
            }
            Some(model) if !model.is_empty() => bar_chart(ui, "chem_plot", model, None),
            _ => {
                placeholder(ui, "No classes have a value for this metric.");
                None
            }
        };
        self.report_hover(ViewId::Chem, hit);
    }

    fn confusion_section(&self, ui: &mut egui::Ui) {
        ui.heading(self.dashboard.confusion_title());
        let view = self.dashboard.confusion();
        if view.is_empty() {
            placeholder(ui, "No confusion counts loaded for this k.");
            return;
        }
        heatmap(ui, view);
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::SidePanel::left("controls_panel").min_width(260.0).show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| self.side_panel(ui));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(pass) = self.dashboard.begin_frame(ui.available_width()) {
                trace!("Resize pass {} ({:?}, {} requests)", pass.frame, pass.reason, pass.coalesced);
            }

            egui::ScrollArea::vertical().show(ui, |ui| {
                self.pane_row(ui);
                ui.separator();
                self.metric_section(ui);
                ui.separator();
                self.chem_section(ui);
                ui.separator();
                self.confusion_section(ui);
            });
        });

        if self.dashboard.scheduler().is_pending() {
            ctx.request_repaint();
        }
    }
}

fn color32(c: Color, opacity: f32) -> egui::Color32 {
    let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
    egui::Color32::from_rgba_unmultiplied(c.r, c.g, c.b, alpha)
}

fn placeholder(ui: &mut egui::Ui, text: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.set_min_width(ui.available_width());
        ui.weak(text);
    });
}

/// Scatter plot, one marker group per (category, style); returns the hovered category
fn scatter(ui: &mut egui::Ui, model: &ViewModel, height: f32) -> Option<String> {
    let x_axis = AxisHints::new_x().label("UMAP-1");
    let y_axis = AxisHints::new_y().label("UMAP-2");

    Plot::new("projection_plot")
        .height(height)
        .custom_x_axes(vec![x_axis])
        .custom_y_axes(vec![y_axis])
        .show_x(false)
        .show_y(false)
        .show(ui, |plot_ui| {
            let mut groups: Vec<(usize, Vec<[f64; 2]>)> = Vec::new();
            let mut slot: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
            for (i, (c, p)) in model.categories.iter().zip(&model.points).enumerate() {
                let g = *slot.entry(c.as_str()).or_insert_with(|| {
                    groups.push((i, Vec::new()));
                    groups.len() - 1
                });
                groups[g].1.push(*p);
            }

            for (first, pts) in groups {
                let opacity = model.opacities.get(first).copied().unwrap_or(1.0);
                if opacity <= 0.0 {
                    continue;
                }
                let size = model.sizes.get(first).copied().unwrap_or(5.0);
                plot_ui.points(
                    Points::new(pts)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius(size / 2.0)
                        .color(color32(model.colors[first], opacity))
                        .name(&model.categories[first]),
                );
            }

            // Only a pointer over this plot counts
            let at = plot_ui.response().hover_pos()?;
            let clip = plot_ui.response().rect;
            let visible = model
                .points
                .iter()
                .enumerate()
                .filter(|(i, _)| model.opacities.get(*i).copied().unwrap_or(1.0) > 0.0)
                .map(|(i, p)| (i, plot_ui.screen_from_plot(PlotPoint::new(p[0], p[1]))));
            nearest_point(visible, at, clip).map(|i| model.categories[i].clone())
        })
        .inner
}

/// Nearest point within [`HOVER_RADIUS`] of `at`; points outside `clip` are not on screen
fn nearest_point<I>(points: I, at: egui::Pos2, clip: egui::Rect) -> Option<usize>
where
    I: IntoIterator<Item = (usize, egui::Pos2)>,
{
    if !clip.contains(at) {
        return None;
    }
    points
        .into_iter()
        .filter(|(_, p)| clip.contains(*p))
        .map(|(i, p)| (i, p.distance(at)))
        .filter(|(_, d)| *d <= HOVER_RADIUS)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Bar under a plot-space pointer.
///
/// `values` are the plotted lengths in category order; bar `i` sits at
/// `y = n-1-i`. The pointer must be within 0.4 of the bar's row and between
/// the baseline and the bar's end.
fn bar_at(values: &[f64], pointer: PlotPoint) -> Option<usize> {
    let slot = pointer.y.round();
    if slot < 0.0 || (pointer.y - slot).abs() > 0.4 {
        return None;
    }
    let i = values.len().checked_sub(1 + slot as usize)?;
    let v = values[i];
    let (lo, hi) = if v < 0.0 { (v, 0.0) } else { (0.0, v) };
    (pointer.x >= lo && pointer.x <= hi).then_some(i)
}

/// Horizontal bars, first category at the top; returns the hovered category
fn bar_chart(ui: &mut egui::Ui, id: &str, model: &ViewModel, height: Option<f32>) -> Option<String> {
    let n = model.len();
    let fonts = model.fonts.unwrap_or_else(|| heuristics::font_sizes_for_count(n, Default::default()));
    // Bar i sits at y = n-1-i so the list reads top-down
    let position = |i: usize| (n - 1 - i) as f64;
    let value = |v: f64| if model.log_axis { v.max(f64::MIN_POSITIVE).log10() } else { v };

    let names = model.categories.clone();
    let y_axis = AxisHints::new_y()
        .min_thickness(BAR_LABEL_WIDTH)
        .formatter(move |mark, _range| {
            let slot = mark.value.round();
            if (mark.value - slot).abs() > 1e-6 || slot < 0.0 {
                return String::new();
            }
            names.len().checked_sub(1 + slot as usize).map(|i| names[i].clone()).unwrap_or_default()
        });
    let log_axis = model.log_axis;
    let x_axis = AxisHints::new_x().formatter(move |mark, _range| {
        if log_axis {
            format!("{:.3}", 10f64.powf(mark.value))
        } else {
            format!("{:.2}", mark.value)
        }
    });

    let plotted: Vec<f64> = model.values.iter().map(|&v| value(v)).collect();
    let bars: Vec<Bar> = (0..n)
        .map(|i| {
            let opacity = model.opacities.get(i).copied().unwrap_or(1.0);
            Bar::new(position(i), plotted[i])
                .width(0.8)
                .fill(color32(model.colors[i], opacity))
                .name(&model.categories[i])
        })
        .collect();

    let mut plot = Plot::new(id)
        .height(height.unwrap_or(model.height))
        .custom_y_axes(vec![y_axis])
        .custom_x_axes(vec![x_axis])
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show_x(false)
        .show_y(false)
        .include_y(-0.5)
        .include_y(n as f64 - 0.5);
    if let Some((lo, hi)) = model.axis_range.filter(|_| !model.log_axis) {
        plot = plot.include_x(lo).include_x(hi);
    }

    ui.label(egui::RichText::new(&model.title).size(16.0));
    plot.show(ui, |plot_ui| {
        plot_ui.bar_chart(BarChart::new(bars).horizontal());
        for (i, label) in model.labels.iter().enumerate() {
            let opacity = model.opacities.get(i).copied().unwrap_or(1.0);
            if opacity <= 0.0 {
                continue;
            }
            plot_ui.text(
                Text::new(
                    PlotPoint::new(plotted[i], position(i)),
                    egui::RichText::new(format!(" {}", label)).size(fonts.text),
                )
                .anchor(egui::Align2::LEFT_CENTER),
            );
        }

        let at = plot_ui.response().hover_pos()?;
        let i = bar_at(&plotted, plot_ui.plot_from_screen(at))?;
        (model.opacities.get(i).copied().unwrap_or(1.0) > 0.0).then(|| model.categories[i].clone())
    })
    .inner
}

/// Linear interpolation across evenly spaced color stops
fn ramp(stops: &[[u8; 3]], t: f64) -> egui::Color32 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let segments = (stops.len() - 1) as f64;
    let pos = t * segments;
    let i = (pos.floor() as usize).min(stops.len() - 2);
    let f = pos - i as f64;
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    let (a, b) = (stops[i], stops[i + 1]);
    egui::Color32::from_rgb(lerp(a[0], b[0]), lerp(a[1], b[1]), lerp(a[2], b[2]))
}

/// Confusion heatmap painted cell by cell, predicted labels on top
fn heatmap(ui: &mut egui::Ui, view: &ConfusionView) {
    let n = view.labels.len();
    let tick = heuristics::heatmap_font_size(n);
    let font = egui::FontId::proportional(tick);
    let height = heuristics::heatmap_height(n);
    let top = heuristics::top_margin_for_rotated_labels(&view.labels, tick, HEATMAP_TICK_ANGLE);
    let left = BAR_LABEL_WIDTH;

    let width = ui.available_width().max(left + 100.0);
    let (rect, response) = ui.allocate_exact_size(egui::vec2(width, height + top), egui::Sense::hover());
    let painter = ui.painter_at(rect);

    let grid = egui::Rect::from_min_max(
        egui::pos2(rect.left() + left, rect.top() + top),
        egui::pos2(rect.right() - 40.0, rect.bottom() - 20.0),
    );
    let cell = egui::vec2(grid.width() / n as f32, grid.height() / n as f32);
    let stops: &[[u8; 3]] = match view.mode {
        DisplayMode::RowNormalized => &ROW_SCALE,
        DisplayMode::Counts => &COUNT_SCALE,
    };
    let text_color = ui.visuals().text_color();

    for (r, row) in view.z.iter().enumerate() {
        for (c, &z) in row.iter().enumerate() {
            let min = grid.min + egui::vec2(c as f32 * cell.x, r as f32 * cell.y);
            let t = if view.cmax > 0.0 { z / view.cmax } else { 0.0 };
            painter.rect_filled(egui::Rect::from_min_size(min, cell), 0.0, ramp(stops, t));
        }
    }

    for (i, label) in view.labels.iter().enumerate() {
        let y = grid.top() + (i as f32 + 0.5) * cell.y;
        painter.text(
            egui::pos2(grid.left() - 6.0, y),
            egui::Align2::RIGHT_CENTER,
            label,
            font.clone(),
            text_color,
        );

        let x = grid.left() + (i as f32 + 0.5) * cell.x;
        let galley = painter.layout_no_wrap(label.clone(), font.clone(), text_color);
        let shape = egui::epaint::TextShape::new(egui::pos2(x, grid.top() - 4.0), galley, text_color)
            .with_angle(-HEATMAP_TICK_ANGLE.to_radians());
        painter.add(shape);
    }

    let hovered = response.hover_pos().filter(|p| grid.contains(*p)).map(|p| {
        let c = (((p.x - grid.left()) / cell.x) as usize).min(n - 1);
        let r = (((p.y - grid.top()) / cell.y) as usize).min(n - 1);
        (r, c)
    });
    if let Some((r, c)) = hovered {
        let text = match view.mode {
            DisplayMode::RowNormalized => format!(
                "True: {}\nPred: {}\nFraction: {:.3}",
                view.labels[r], view.labels[c], view.z[r][c]
            ),
            DisplayMode::Counts => format!("True: {}\nPred: {}\nCount: {}", view.labels[r], view.labels[c], view.z[r][c]),
        };
        response.on_hover_text_at_pointer(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramp_endpoints() {
        assert_eq!(ramp(&ROW_SCALE, 0.0), egui::Color32::from_rgb(0, 32, 77));
        assert_eq!(ramp(&ROW_SCALE, 1.0), egui::Color32::from_rgb(255, 234, 70));
        assert_eq!(ramp(&COUNT_SCALE, f64::NAN), egui::Color32::from_rgb(255, 255, 204));
        assert_eq!(ramp(&COUNT_SCALE, 7.0), egui::Color32::from_rgb(128, 0, 38));
    }

    fn two_bars() -> ViewModel {
        ViewModel {
            title: "Rank-1".into(),
            categories: vec!["A".into(), "B".into()],
            colors: vec![Color::rgb(200, 0, 0), Color::rgb(0, 0, 200)],
            values: vec![0.9, 0.4],
            points: vec![[0.0, 0.0], [1.0, 1.0]],
            labels: vec!["0.900".into(), "0.400".into()],
            opacities: vec![1.0, 1.0],
            sizes: vec![5.0, 5.0],
            height: 300.0,
            ..Default::default()
        }
    }

    /// Run a few headless frames with the pointer parked at `pointer` and a
    /// 500 px blank strip left of the chart drawn by `chart`
    fn hits_with_pointer<F>(pointer: egui::Pos2, mut chart: F) -> Vec<Option<String>>
    where
        F: FnMut(&mut egui::Ui) -> Option<String>,
    {
        let ctx = egui::Context::default();
        (0..3)
            .map(|_| {
                let input = egui::RawInput {
                    screen_rect: Some(egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(1200.0, 600.0))),
                    events: vec![egui::Event::PointerMoved(pointer)],
                    ..Default::default()
                };
                let mut hit = None;
                let _ = ctx.run(input, |ctx| {
                    egui::CentralPanel::default().show(ctx, |ui| {
                        ui.horizontal_top(|ui| {
                            ui.allocate_space(egui::vec2(500.0, 400.0));
                            ui.vertical(|ui| hit = chart(ui));
                        });
                    });
                });
                hit
            })
            .collect()
    }

    #[test]
    fn test_bar_chart_ignores_pointer_outside_plot() {
        let model = two_bars();
        let hits = hits_with_pointer(egui::pos2(50.0, 150.0), |ui| bar_chart(ui, "bars", &model, Some(300.0)));
        assert_eq!(hits, vec![None, None, None]);
    }

    #[test]
    fn test_scatter_ignores_pointer_outside_plot() {
        let model = two_bars();
        let hits = hits_with_pointer(egui::pos2(50.0, 150.0), |ui| scatter(ui, &model, 300.0));
        assert_eq!(hits, vec![None, None, None]);
    }

    #[test]
    fn test_bar_at_needs_row_and_extent() {
        // A at y=1 (length 0.9), B at y=0 (length 0.4)
        let values = [0.9, 0.4];
        assert_eq!(bar_at(&values, PlotPoint::new(0.5, 1.1)), Some(0));
        assert_eq!(bar_at(&values, PlotPoint::new(0.2, 0.0)), Some(1));
        assert_eq!(bar_at(&values, PlotPoint::new(0.6, 0.0)), None);
        assert_eq!(bar_at(&values, PlotPoint::new(-0.1, 1.0)), None);
        assert_eq!(bar_at(&values, PlotPoint::new(0.2, 0.5)), None);
        assert_eq!(bar_at(&values, PlotPoint::new(0.2, 2.0)), None);
        assert_eq!(bar_at(&values, PlotPoint::new(0.2, -1.0)), None);
        assert_eq!(bar_at(&[-0.5], PlotPoint::new(-0.3, 0.0)), Some(0));
    }

    #[test]
    fn test_nearest_point_respects_clip_and_radius() {
        let clip = egui::Rect::from_min_size(egui::Pos2::ZERO, egui::vec2(100.0, 100.0));
        let points = [(0, egui::pos2(10.0, 10.0)), (1, egui::pos2(14.0, 10.0)), (2, egui::pos2(150.0, 12.0))];
        assert_eq!(nearest_point(points, egui::pos2(13.0, 10.0), clip), Some(1));
        assert_eq!(nearest_point(points, egui::pos2(60.0, 60.0), clip), None);
        // Pointer outside the plot, even on top of an off-screen point
        assert_eq!(nearest_point(points, egui::pos2(150.0, 12.0), clip), None);
    }

    #[test]
    fn test_color32_alpha() {
        let c = color32(Color::rgb(10, 20, 30), 0.0);
        assert_eq!(c.a(), 0);
        assert_eq!(color32(Color::rgb(10, 20, 30), 1.0), egui::Color32::from_rgb(10, 20, 30));
    }
}
