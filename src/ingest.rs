//! Dataset ingestion - CSV files into typed rows
//!
//! Parsers are strict about headers and lenient about rows: a missing
//! required column is an [`IngestError`], while a row with an unusable
//! value is silently dropped. The `load_*` wrappers never fail; any error
//! is logged and turned into an empty dataset.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::catalog::{AccuracyKind, ProjectionKind, CHEM_METRICS, CONFUSION_KS};
use crate::config::DataPaths;
use crate::views::{ConfusionMatrix, MetricRow, MetricTable, ProjectionSample, RankedRow};

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to read {path:?}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("CSV has no header line")]
    Empty,
    #[error("CSV is missing column '{0}'")]
    MissingColumn(&'static str),
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Header plus trimmed, non-blank data lines
struct Csv<'a> {
    header: Vec<&'a str>,
    rows: Vec<Vec<&'a str>>,
}

impl<'a> Csv<'a> {
    fn parse(text: &'a str) -> Result<Self> {
        let mut lines = text.trim().lines();
        let header = lines
            .next()
            .filter(|l| !l.trim().is_empty())
            .ok_or(IngestError::Empty)?;
        let header = split_line(header);
        let rows = lines
            .filter(|l| !l.trim().is_empty())
            .map(split_line)
            .collect();
        Ok(Self { header, rows })
    }

    fn column(&self, name: &'static str) -> Option<usize> {
        self.header.iter().position(|h| *h == name)
    }

    fn require(&self, name: &'static str) -> Result<usize> {
        self.column(name).ok_or(IngestError::MissingColumn(name))
    }
}

fn split_line(line: &str) -> Vec<&str> {
    line.split(',').map(str::trim).collect()
}

fn cell<'a>(row: &[&'a str], idx: usize) -> &'a str {
    row.get(idx).copied().unwrap_or("")
}

/// Parse a numeric cell; blank or garbage reads as NaN
fn number(row: &[&str], idx: usize) -> f64 {
    cell(row, idx).parse().unwrap_or(f64::NAN)
}

/// Parse a count cell; blank reads as zero
fn count(row: &[&str], idx: Option<usize>) -> f64 {
    match idx.map(|i| cell(row, i)) {
        Some(s) if !s.is_empty() => s.parse().unwrap_or(f64::NAN),
        _ => 0.0,
    }
}

/// `umap_x, umap_y, superclass`
pub fn parse_projection_csv(text: &str) -> Result<Vec<ProjectionSample>> {
    let csv = Csv::parse(text)?;
    let ix = csv.require("umap_x")?;
    let iy = csv.require("umap_y")?;
    let ic = csv.require("superclass")?;

    Ok(csv
        .rows
        .iter()
        .filter_map(|row| {
            let (x, y, c) = (number(row, ix), number(row, iy), cell(row, ic));
            (x.is_finite() && y.is_finite() && !c.is_empty()).then(|| ProjectionSample::new(x, y, c))
        })
        .collect())
}

/// `superclass, value[, n]`
pub fn parse_accuracy_csv(text: &str) -> Result<Vec<RankedRow>> {
    let csv = Csv::parse(text)?;
    let ic = csv.require("superclass")?;
    let iv = csv.require("value")?;
    let in_ = csv.column("n");

    Ok(csv
        .rows
        .iter()
        .filter_map(|row| {
            let (c, v) = (cell(row, ic), number(row, iv));
            if c.is_empty() || !v.is_finite() {
                return None;
            }
            let n = in_.map(|i| count(row, Some(i))).filter(|n| n.is_finite());
            Some(RankedRow::new(c, v, n))
        })
        .collect())
}

/// `class, n, <metric columns...>`; unparseable metric cells become NaN
pub fn parse_metrics_csv(text: &str) -> Result<MetricTable> {
    let csv = Csv::parse(text)?;
    let ic = csv.require("class")?;
    let in_ = csv.column("n");
    let metric_cols: Vec<(usize, &str)> = csv
        .header
        .iter()
        .enumerate()
        .filter(|(_, h)| **h != "class" && **h != "n" && !h.is_empty())
        .map(|(i, h)| (i, *h))
        .collect();

    let rows = csv
        .rows
        .iter()
        .filter(|row| !cell(row, ic).is_empty())
        .map(|row| MetricRow {
            category: cell(row, ic).to_string(),
            n: count(row, in_),
            values: metric_cols
                .iter()
                .map(|&(i, h)| (h.to_string(), number(row, i)))
                .collect(),
        })
        .collect();
    Ok(MetricTable::new(rows))
}

const CHEM_REQUIRED: [&str; 3] = ["superclass", "n_items", "n_valid_smiles"];

/// `superclass, n_items, n_valid_smiles, mean_carbons, ...`; rows are keyed by `n_items`
pub fn parse_chem_csv(text: &str) -> Result<MetricTable> {
    let csv = Csv::parse(text)?;
    for name in CHEM_REQUIRED.into_iter().chain(CHEM_METRICS.iter().map(|m| m.key)) {
        csv.require(name)?;
    }
    let ic = csv.require("superclass")?;
    let in_ = csv.column("n_items");
    let iv = csv.column("n_valid_smiles");

    let rows = csv
        .rows
        .iter()
        .filter(|row| !cell(row, ic).is_empty())
        .map(|row| {
            let mut values: BTreeMap<String, f64> = CHEM_METRICS
                .iter()
                .filter_map(|m| csv.column(m.key).map(|i| (m.key.to_string(), number(row, i))))
                .collect();
            values.insert("n_valid_smiles".to_string(), count(row, iv));
            MetricRow { category: cell(row, ic).to_string(), n: count(row, in_), values }
        })
        .collect();
    Ok(MetricTable::new(rows))
}

/// `true_class, <pred1>, <pred2>, ...`; first column holds the true label
pub fn parse_confusion_csv(text: &str) -> Result<ConfusionMatrix> {
    let csv = Csv::parse(text)?;
    let pred_labels: Vec<String> = csv.header.iter().skip(1).map(|s| s.to_string()).collect();

    let mut true_labels = Vec::new();
    let mut counts = Vec::new();
    for row in &csv.rows {
        let label = cell(row, 0);
        if label.is_empty() {
            continue;
        }
        true_labels.push(label.to_string());
        counts.push(row.iter().skip(1).map(|v| v.parse().unwrap_or(0.0)).collect());
    }
    Ok(ConfusionMatrix::new(true_labels, pred_labels, counts))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| IngestError::Read { path: path.to_path_buf(), source })
}

/// Read and parse `path`, logging and swallowing any error
fn load_or_default<T, F>(path: &Path, what: &str, parse: F) -> T
where
    T: Default,
    F: FnOnce(&str) -> Result<T>,
{
    match read(path).and_then(|text| parse(&text)) {
        Ok(data) => {
            tracing::info!("Loaded {} from {:?}", what, path);
            data
        }
        Err(e) => {
            tracing::warn!("No {} ({}); using empty dataset", what, e);
            T::default()
        }
    }
}

pub fn load_projection(path: &Path) -> Vec<ProjectionSample> {
    load_or_default(path, "projection", parse_projection_csv)
}

pub fn load_accuracy(path: &Path) -> Vec<RankedRow> {
    load_or_default(path, "accuracy", parse_accuracy_csv)
}

pub fn load_metrics(path: &Path) -> MetricTable {
    load_or_default(path, "clustering metrics", parse_metrics_csv)
}

pub fn load_chem(path: &Path) -> MetricTable {
    load_or_default(path, "chemistry summary", parse_chem_csv)
}

pub fn load_confusion(path: &Path) -> ConfusionMatrix {
    load_or_default(path, "confusion counts", parse_confusion_csv)
}

const SAMPLE_CLASSES: [&str; 4] = ["Alkaloids", "Terpenoids", "Polyketides", "Flavonoids"];
const SAMPLE_CENTERS: [(f64, f64); 4] = [(0.0, 0.0), (3.2, 1.8), (-2.5, 2.0), (1.2, -2.8)];
const SAMPLE_POINTS: usize = 600;

/// 32-bit LCG (Numerical Recipes constants) yielding values in [0, 1)
struct Lcg(u32);

impl Lcg {
    fn next_unit(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.0 as f64 / 4_294_967_296.0
    }

    fn jitter(&mut self) -> f64 {
        (self.next_unit() - 0.5) * 0.7
    }
}

/// Deterministic 4-class cloud shown when a projection file is missing
pub fn sample_points() -> Vec<ProjectionSample> {
    let mut rng = Lcg(42);
    (0..SAMPLE_POINTS)
        .map(|i| {
            let k = i % SAMPLE_CLASSES.len();
            let (cx, cy) = SAMPLE_CENTERS[k];
            let x = cx + rng.jitter();
            let y = cy + rng.jitter();
            ProjectionSample::new(x, y, SAMPLE_CLASSES[k])
        })
        .collect()
}

/// Rank-1 rows shown when no accuracy file could be loaded
pub fn sample_bars() -> Vec<RankedRow> {
    vec![
        RankedRow::new("Steroids", 0.60, Some(188.0)),
        RankedRow::new("Isoflavonoids", 0.60, Some(94.0)),
        RankedRow::new("Triterpenoids", 0.59, Some(342.0)),
        RankedRow::new("Flavonoids", 0.53, Some(348.0)),
        RankedRow::new("Meroterpenoids", 0.52, Some(116.0)),
    ]
}

/// Everything the dashboard shows, as loaded from the data directory
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub projections: HashMap<ProjectionKind, Vec<ProjectionSample>>,
    pub accuracy: HashMap<AccuracyKind, Vec<RankedRow>>,
    pub metrics: MetricTable,
    pub chem: MetricTable,
    pub confusion: BTreeMap<u32, ConfusionMatrix>,
    /// Projection kinds that fell back to the synthetic sample
    pub sampled: Vec<ProjectionKind>,
}

impl Datasets {
    /// Load every configured file under `data_dir`, substituting samples where needed
    pub fn load(data_dir: &Path, paths: &DataPaths) -> Self {
        let mut sets = Datasets::default();

        for kind in ProjectionKind::ALL {
            let mut samples = load_projection(&data_dir.join(paths.projection(kind)));
            if samples.is_empty() {
                tracing::info!("{} projection falls back to synthetic sample", kind.short());
                samples = sample_points();
                sets.sampled.push(kind);
            }
            sets.projections.insert(kind, samples);
        }

        for kind in AccuracyKind::ALL {
            let rows = load_accuracy(&data_dir.join(paths.accuracy(kind)));
            sets.accuracy.insert(kind, rows);
        }
        if sets.accuracy.values().all(Vec::is_empty) {
            tracing::info!("No accuracy files; using sample Rank-1 bars");
            sets.accuracy.insert(AccuracyKind::Rank1, sample_bars());
        }

        sets.metrics = load_metrics(&data_dir.join(&paths.metrics));
        sets.chem = load_chem(&data_dir.join(&paths.chem));

        for k in CONFUSION_KS {
            if let Some(file) = paths.confusion(k) {
                let matrix = load_confusion(&data_dir.join(file));
                if !matrix.is_empty() {
                    sets.confusion.insert(k, matrix);
                }
            }
        }

        sets
    }

    pub fn projection(&self, kind: ProjectionKind) -> &[ProjectionSample] {
        self.projections.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn accuracy(&self, kind: AccuracyKind) -> &[RankedRow] {
        self.accuracy.get(&kind).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every category name, dataset by dataset, for palette registration
    pub fn category_batches(&self) -> Vec<Vec<&str>> {
        let mut batches: Vec<Vec<&str>> = Vec::new();
        for kind in ProjectionKind::ALL {
            batches.push(self.projection(kind).iter().map(|s| s.category.as_str()).collect());
        }
        for kind in AccuracyKind::ALL {
            batches.push(self.accuracy(kind).iter().map(|r| r.category.as_str()).collect());
        }
        batches.push(self.metrics.categories().collect());
        batches.push(self.chem.categories().collect());
        for m in self.confusion.values() {
            batches.push(m.true_labels().iter().map(String::as_str).collect());
        }
        batches
    }
}
