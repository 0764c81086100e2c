//! Category Registry - stable, extend-only category colors
//!
//! Every dataset load feeds its category names through
//! [`CategoryRegistry::register_categories`]. Names already seen keep their
//! color forever; unseen names are sorted and appended after all existing
//! assignments, so the order datasets arrive in never recolors anything.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// Colorblind-friendly hues followed by Tableau-20
const BASE_PALETTE: [&str; 30] = [
    "#1f77b4", "#E69F00", "#56B4E9", "#009E73", "#F0E442", "#0072B2", "#D55E00", "#CC79A7",
    "#999999", "#17BECF", "#4E79A7", "#F28E2B", "#E15759", "#76B7B2", "#59A14F", "#EDC948",
    "#B07AA1", "#FF9DA7", "#9C755F", "#BAB0AC", "#1F77B4", "#FF7F0E", "#2CA02C", "#D62728",
    "#9467BD", "#8C564B", "#E377C2", "#7F7F7F", "#BCBD22", "#17BECF",
];

/// Lightness shift (percent) applied per overflow cycle
const OVERFLOW_LIGHTNESS_STEP: f64 = 6.0;
const MIN_LIGHTNESS: f64 = 25.0;
const MAX_LIGHTNESS: f64 = 80.0;

/// Returned for names that were never registered
pub const FALLBACK_COLOR: Color = Color::rgb(0x9a, 0xa0, 0xa6);

/// 8-bit sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (case-insensitive)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Hue in degrees, saturation and lightness in percent
    pub fn to_hsl(self) -> (f64, f64, f64) {
        let r = self.r as f64 / 255.0;
        let g = self.g as f64 / 255.0;
        let b = self.b as f64 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return (0.0, 0.0, l * 100.0);
        }

        let d = max - min;
        let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
        let h = if max == r {
            (g - b) / d + if g < b { 6.0 } else { 0.0 }
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };

        (h * 60.0, s * 100.0, l * 100.0)
    }

    pub fn from_hsl(h: f64, s: f64, l: f64) -> Self {
        let s = s / 100.0;
        let l = l / 100.0;
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let x = c * (1.0 - ((h / 60.0) % 2.0 - 1.0).abs());
        let m = l - c / 2.0;

        let (r, g, b) = match h {
            h if (0.0..60.0).contains(&h) => (c, x, 0.0),
            h if (60.0..120.0).contains(&h) => (x, c, 0.0),
            h if (120.0..180.0).contains(&h) => (0.0, c, x),
            h if (180.0..240.0).contains(&h) => (0.0, x, c),
            h if (240.0..300.0).contains(&h) => (x, 0.0, c),
            _ => (c, 0.0, x),
        };

        let to_u8 = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        Self::rgb(to_u8(r), to_u8(g), to_u8(b))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

fn base_color(index: usize) -> Color {
    // Every entry of BASE_PALETTE is a valid literal; the fallback is unreachable
    Color::from_hex(BASE_PALETTE[index % BASE_PALETTE.len()]).unwrap_or(FALLBACK_COLOR)
}

/// Generate a deterministic palette of `n` colors.
///
/// The first 30 are the base hues. Past that, overflow color `i` reuses base
/// hue `i % 30` with its lightness pushed down on even cycles and up on odd
/// ones, clamped to a legible band. A palette of size `n` is always a prefix
/// of any larger palette.
pub fn make_palette(n: usize) -> Vec<Color> {
    let base_len = BASE_PALETTE.len();
    (0..n)
        .map(|i| {
            if i < base_len {
                return base_color(i);
            }
            let extra = i - base_len;
            let (h, s, l) = base_color(extra).to_hsl();
            let cycle = extra / base_len;
            let dl = if cycle % 2 == 1 { OVERFLOW_LIGHTNESS_STEP } else { -OVERFLOW_LIGHTNESS_STEP };
            Color::from_hsl(h, s, (l + dl).clamp(MIN_LIGHTNESS, MAX_LIGHTNESS))
        })
        .collect()
}

/// Universe of categories seen across all loaded datasets.
///
/// Owned by the dashboard and passed by reference to every view; mutation
/// is append-only.
#[derive(Debug, Clone, Default)]
pub struct CategoryRegistry {
    colors: HashMap<String, Color>,
    /// Names in assignment order; index == palette slot
    order: Vec<String>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every name in `names`, appending colors for unseen ones.
    ///
    /// Returns `true` if anything was appended. When nothing is new the map
    /// is left untouched.
    pub fn register_categories<I, S>(&mut self, names: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let unseen: BTreeSet<String> = names
            .into_iter()
            .map(|n| n.as_ref().to_string())
            .filter(|n| !n.is_empty() && !self.colors.contains_key(n))
            .collect();

        if unseen.is_empty() {
            return false;
        }

        let start = self.order.len();
        let palette = make_palette(start + unseen.len());
        for (offset, name) in unseen.into_iter().enumerate() {
            self.colors.insert(name.clone(), palette[start + offset]);
            self.order.push(name);
        }

        tracing::debug!(
            "Category registry extended from {} to {} names",
            start,
            self.order.len()
        );
        true
    }

    /// Assigned color, or [`FALLBACK_COLOR`] for unknown names
    pub fn color_of(&self, name: &str) -> Color {
        self.colors.get(name).copied().unwrap_or(FALLBACK_COLOR)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.colors.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// (name, color) pairs in assignment order
    pub fn assignments(&self) -> impl Iterator<Item = (&str, Color)> + '_ {
        self.order
            .iter()
            .map(move |name| (name.as_str(), self.color_of(name)))
    }
}
