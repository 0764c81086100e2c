//! Adaptive presentation heuristics
//!
//! Pure functions that keep charts legible from a handful of categories up
//! to a hundred and fifty: font sizes shrink across a fixed knee, margins
//! grow with the longest label.

/// At or below this many categories fonts stay at their largest
const KNEE_START: usize = 20;
/// At or above this many categories fonts are at their smallest
const KNEE_END: usize = 71;

/// Rough glyph width as a fraction of the font size
const CHAR_WIDTH_RATIO: f32 = 0.62;

const BAR_HEIGHT: f32 = 26.0;
const BAR_CHART_PADDING: f32 = 90.0;
const MIN_BAR_CHART_HEIGHT: f32 = 220.0;

/// Font range for a crowded chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontRange {
    pub tick_max: f32,
    pub tick_min: f32,
    /// Bar text is this much smaller than tick labels
    pub text_delta: f32,
}

impl Default for FontRange {
    fn default() -> Self {
        Self { tick_max: 12.0, tick_min: 5.0, text_delta: 1.0 }
    }
}

/// Tick and bar-text font sizes for a chart
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSizes {
    pub tick: f32,
    pub text: f32,
}

/// 0.0 up to the knee start, 1.0 past the knee end, linear in between
fn knee(count: usize) -> f32 {
    if count <= KNEE_START {
        0.0
    } else if count >= KNEE_END {
        1.0
    } else {
        (count - KNEE_START) as f32 / (KNEE_END - KNEE_START) as f32
    }
}

pub fn font_sizes_for_count(count: usize, range: FontRange) -> FontSizes {
    let t = knee(count);
    let tick = (range.tick_max - (range.tick_max - range.tick_min) * t).round();
    let text = range.tick_min.max(tick - range.text_delta);
    FontSizes { tick, text }
}

fn max_chars<S: AsRef<str>>(labels: &[S]) -> usize {
    labels.iter().map(|l| l.as_ref().chars().count()).max().unwrap_or(0)
}

/// Side margin (px) wide enough for the longest label, clamped to [60, 260]
pub fn side_margin_for_labels<S: AsRef<str>>(labels: &[S], font_px: f32) -> f32 {
    if labels.is_empty() {
        return 40.0;
    }
    let px = (max_chars(labels) as f32 * font_px * CHAR_WIDTH_RATIO).round();
    (px + 16.0).clamp(60.0, 260.0)
}

/// Step-wise tick font for heatmap axes
pub fn heatmap_font_size(count: usize) -> f32 {
    match count {
        n if n >= 80 => 8.0,
        n if n >= 60 => 9.0,
        n if n >= 40 => 10.0,
        n if n >= 28 => 11.0,
        _ => 12.0,
    }
}

/// Room above a heatmap for labels rotated by `angle_deg`, plus the title band
pub fn top_margin_for_rotated_labels<S: AsRef<str>>(labels: &[S], tick_px: f32, angle_deg: f32) -> f32 {
    if labels.is_empty() {
        return 80.0;
    }
    let char_w = tick_px * CHAR_WIDTH_RATIO;
    let band = angle_deg.abs().to_radians().sin() * (max_chars(labels) as f32 * char_w) + tick_px * 1.2;
    (band.round() + 34.0).clamp(90.0, 254.0)
}

/// Height of a horizontal bar chart with `count` bars
pub fn bar_chart_height(count: usize) -> f32 {
    MIN_BAR_CHART_HEIGHT.max(BAR_CHART_PADDING + BAR_HEIGHT * count as f32)
}

/// Height of a confusion heatmap with `count` rows
pub fn heatmap_height(count: usize) -> f32 {
    (160.0 + BAR_HEIGHT * count as f32).clamp(380.0, 900.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_knee() {
        let r = FontRange::default();
        assert_eq!(font_sizes_for_count(5, r), FontSizes { tick: 12.0, text: 11.0 });
        assert_eq!(font_sizes_for_count(20, r), FontSizes { tick: 12.0, text: 11.0 });
        assert_eq!(font_sizes_for_count(71, r), FontSizes { tick: 5.0, text: 5.0 });
        assert_eq!(font_sizes_for_count(150, r), FontSizes { tick: 5.0, text: 5.0 });
        let mid = font_sizes_for_count(45, r);
        assert!(mid.tick < 12.0 && mid.tick > 5.0);
    }

    #[test]
    fn test_fonts_monotonic() {
        let r = FontRange::default();
        let mut last = f32::MAX;
        for n in 0..160 {
            let s = font_sizes_for_count(n, r);
            assert!(s.tick <= last);
            last = s.tick;
        }
    }

    #[test]
    fn test_side_margin() {
        let none: [&str; 0] = [];
        assert_eq!(side_margin_for_labels(&none, 12.0), 40.0);
        assert_eq!(side_margin_for_labels(&["ab"], 12.0), 60.0);
        // 20 chars * 12 * 0.62 = 148.8 -> 149 + 16
        assert_eq!(side_margin_for_labels(&["x".repeat(20)], 12.0), 165.0);
        assert_eq!(side_margin_for_labels(&["x".repeat(200)], 12.0), 260.0);
    }

    #[test]
    fn test_heatmap_sizes() {
        assert_eq!(heatmap_font_size(10), 12.0);
        assert_eq!(heatmap_font_size(28), 11.0);
        assert_eq!(heatmap_font_size(100), 8.0);
        assert_eq!(heatmap_height(2), 380.0);
        assert_eq!(heatmap_height(100), 900.0);
        assert_eq!(bar_chart_height(1), 220.0);
        assert_eq!(bar_chart_height(10), 350.0);
    }

    #[test]
    fn test_top_margin_bounds() {
        let none: [&str; 0] = [];
        assert_eq!(top_margin_for_rotated_labels(&none, 12.0, 55.0), 80.0);
        assert_eq!(top_margin_for_rotated_labels(&["A"], 12.0, 55.0), 90.0);
        assert_eq!(top_margin_for_rotated_labels(&["x".repeat(100)], 12.0, 55.0), 254.0);
    }
}
