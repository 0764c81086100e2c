//! Layout Scheduler - coalesced resize passes and the split-pane divider
//!
//! Resize requests only mark a frame as pending. The pass itself runs when
//! the frame fires ([`FrameScheduler::advance_frame`]), so any burst of
//! requests within one frame costs exactly one layout pass.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage key of the persisted split fraction
pub const SPLIT_KEY: &str = "spectre_split_frac";

/// Fraction used when nothing valid was persisted
pub const DEFAULT_SPLIT: f64 = 0.5;

/// Smallest pane width when the container cannot honor both minimums
const DEGRADED_MIN_WIDTH: f32 = 100.0;

/// Why a resize pass was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeReason {
    /// Generic request from a pane observer
    Layout,
    Divider,
    Window,
    Data,
    Highlight,
}

/// One executed resize pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePass {
    pub reason: ResizeReason,
    /// Requests folded into this pass
    pub coalesced: usize,
    pub frame: u64,
}

#[derive(Debug, Clone, Copy)]
struct PendingFrame {
    reason: ResizeReason,
    requests: usize,
}

/// Next-frame scheduler with a single queued task
#[derive(Debug, Clone, Default)]
pub struct FrameScheduler {
    pending: Option<PendingFrame>,
    frame: u64,
    passes: u64,
    cancelled: u64,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a resize pass on the next frame
    pub fn request_resize(&mut self) -> bool {
        self.request(ResizeReason::Layout)
    }

    /// Request a pass for `reason`.
    ///
    /// Same-reason requests coalesce into the pending frame. A different
    /// reason cancels the pending frame and reschedules with the new one.
    /// Returns `true` if a frame was (re)scheduled.
    pub fn request(&mut self, reason: ResizeReason) -> bool {
        match &mut self.pending {
            Some(pending) if pending.reason == reason => {
                pending.requests += 1;
                false
            }
            Some(pending) => {
                self.cancelled += 1;
                tracing::trace!("Resize frame for {:?} superseded by {:?}", pending.reason, reason);
                *pending = PendingFrame { reason, requests: pending.requests + 1 };
                true
            }
            None => {
                self.pending = Some(PendingFrame { reason, requests: 1 });
                true
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Fire the next frame: run the queued pass, if any, and clear the flag
    pub fn advance_frame(&mut self) -> Option<ResizePass> {
        self.frame += 1;
        let pending = self.pending.take()?;
        self.passes += 1;
        let pass = ResizePass { reason: pending.reason, coalesced: pending.requests, frame: self.frame };
        tracing::debug!(
            "Resize pass #{} on frame {} ({:?}, {} requests coalesced)",
            self.passes,
            pass.frame,
            pass.reason,
            pass.coalesced
        );
        Some(pass)
    }

    /// Executed passes so far
    pub fn passes(&self) -> u64 {
        self.passes
    }

    /// Frames superseded by a request with a different reason
    pub fn cancelled(&self) -> u64 {
        self.cancelled
    }
}

/// Fixed pixel constraints of the two-pane layout
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaneGeometry {
    pub divider_width: f32,
    pub min_left: f32,
    pub min_right: f32,
}

impl Default for PaneGeometry {
    fn default() -> Self {
        Self { divider_width: 6.0, min_left: 220.0, min_right: 220.0 }
    }
}

impl PaneGeometry {
    /// Container width minus the divider, never negative
    pub fn available(&self, container_width: f32) -> f32 {
        (container_width - self.divider_width).max(0.0)
    }

    /// Feasible `(min, max)` fraction range for a container.
    ///
    /// When the minimums do not fit, both panes get half the available
    /// width (at least 100 px) instead.
    pub fn fraction_bounds(&self, container_width: f32) -> (f64, f64) {
        let avail = self.available(container_width);
        if avail <= 0.0 {
            return (DEFAULT_SPLIT, DEFAULT_SPLIT);
        }
        let (min_l, min_r) = if avail < self.min_left + self.min_right {
            let half = DEGRADED_MIN_WIDTH.max((avail / 2.0).floor());
            (half, half)
        } else {
            (self.min_left, self.min_right)
        };
        let avail = avail as f64;
        (min_l as f64 / avail, 1.0 - min_r as f64 / avail)
    }

    pub fn clamp_fraction(&self, fraction: f64, container_width: f32) -> f64 {
        let fraction = if fraction.is_finite() { fraction } else { DEFAULT_SPLIT };
        let (lo, hi) = self.fraction_bounds(container_width);
        // An inverted range (tiny container) resolves to `lo`
        lo.max(hi.min(fraction))
    }

    /// Left pane width in whole pixels
    pub fn left_width(&self, fraction: f64, container_width: f32) -> f32 {
        let avail = self.available(container_width);
        (avail as f64 * self.clamp_fraction(fraction, container_width)).round() as f32
    }
}

/// Accept a persisted value only if it lies strictly inside (0, 1)
pub fn restore_fraction(raw: Option<f64>) -> f64 {
    match raw {
        Some(v) if v.is_finite() && v > 0.0 && v < 1.0 => v,
        _ => DEFAULT_SPLIT,
    }
}

#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("Failed to write preferences {path:?}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("Failed to encode preferences: {0}")]
    Encode(#[from] serde_yaml::Error),
}

/// Persistence for the one scalar that outlives the process
pub trait SplitStore {
    fn load(&self) -> Option<f64>;
    fn save(&mut self, fraction: f64) -> Result<(), PrefsError>;
}

/// In-process store (tests, CLI one-shots)
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub value: Option<f64>,
    pub writes: usize,
}

impl SplitStore for MemoryStore {
    fn load(&self) -> Option<f64> {
        self.value
    }

    fn save(&mut self, fraction: f64) -> Result<(), PrefsError> {
        self.value = Some(fraction);
        self.writes += 1;
        Ok(())
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PrefsFile {
    #[serde(rename = "spectre_split_frac", default, skip_serializing_if = "Option::is_none")]
    split_frac: Option<f64>,
}

/// YAML preferences file holding the split fraction under [`SPLIT_KEY`]
#[derive(Debug, Clone)]
pub struct YamlPrefs {
    path: PathBuf,
}

impl YamlPrefs {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SplitStore for YamlPrefs {
    fn load(&self) -> Option<f64> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        match serde_yaml::from_str::<PrefsFile>(&contents) {
            Ok(prefs) => prefs.split_frac,
            Err(e) => {
                tracing::warn!("Ignoring unreadable preferences {:?}: {}", self.path, e);
                None
            }
        }
    }

    fn save(&mut self, fraction: f64) -> Result<(), PrefsError> {
        let yaml = serde_yaml::to_string(&PrefsFile { split_frac: Some(fraction) })?;
        std::fs::write(&self.path, yaml)
            .map_err(|source| PrefsError::Write { path: self.path.clone(), source })?;
        tracing::debug!("Saved {}={:.4} to {:?}", SPLIT_KEY, fraction, self.path);
        Ok(())
    }
}

/// Two side-by-side panes separated by a draggable divider
pub struct SplitPane {
    fraction: f64,
    geometry: PaneGeometry,
    container_width: f32,
    dragging: bool,
    store: Box<dyn SplitStore>,
}

impl SplitPane {
    /// Restore the persisted fraction (default 0.5 if absent or out of range)
    pub fn restore(geometry: PaneGeometry, store: Box<dyn SplitStore>) -> Self {
        let fraction = restore_fraction(store.load());
        tracing::info!("Split fraction restored: {:.3}", fraction);
        Self { fraction, geometry, container_width: 0.0, dragging: false, store }
    }

    pub fn fraction(&self) -> f64 {
        self.fraction
    }

    pub fn geometry(&self) -> PaneGeometry {
        self.geometry
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    pub fn left_width(&self) -> f32 {
        self.geometry.left_width(self.fraction, self.container_width)
    }

    /// Clamp into the feasible range for the current container and keep it.
    ///
    /// Outside a drag the result is persisted right away; during a drag it
    /// is persisted once on release.
    pub fn set_split_fraction(&mut self, fraction: f64) -> f64 {
        self.fraction = self.geometry.clamp_fraction(fraction, self.container_width);
        if !self.dragging {
            self.persist();
        }
        self.fraction
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(self.fraction) {
            tracing::warn!("Split fraction not persisted: {}", e);
        }
    }

    /// Container width changed (window resize, pane shown/hidden).
    ///
    /// The requested fraction is kept as is; [`Self::left_width`] clamps it
    /// against the current width, so a narrow window never overwrites it.
    pub fn set_container_width(&mut self, width: f32, scheduler: &mut FrameScheduler) {
        if (width - self.container_width).abs() < f32::EPSILON {
            return;
        }
        self.container_width = width.max(0.0);
        scheduler.request(ResizeReason::Window);
    }

    pub fn press(&mut self) {
        self.dragging = true;
    }

    /// Pointer moved to `x` pixels from the container's left edge
    pub fn drag_to(&mut self, x: f32, scheduler: &mut FrameScheduler) -> f64 {
        if !self.dragging {
            return self.fraction;
        }
        let avail = self.geometry.available(self.container_width).max(1.0);
        let fraction = self.set_split_fraction((x / avail) as f64);
        scheduler.request(ResizeReason::Divider);
        fraction
    }

    /// End the gesture: persist once and schedule a final resize
    pub fn release(&mut self, scheduler: &mut FrameScheduler) {
        if !self.dragging {
            return;
        }
        self.dragging = false;
        self.persist();
        scheduler.request(ResizeReason::Divider);
    }
}

impl std::fmt::Debug for SplitPane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitPane")
            .field("fraction", &self.fraction)
            .field("geometry", &self.geometry)
            .field("container_width", &self.container_width)
            .field("dragging", &self.dragging)
            .finish()
    }
}
