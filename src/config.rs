//! Configuration loader - YAML dashboard manifest + .env overrides

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::{AccuracyKind, ProjectionKind, CONFUSION_KS};
use crate::layout::PaneGeometry;
use crate::views::{DisplayMode, TopK};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("Invalid config {path:?}: {source}")]
    Parse { path: PathBuf, source: serde_yaml::Error },
}

/// Main configuration loaded from dashboard.yaml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataPaths,
    pub defaults: Defaults,
    pub layout: PaneGeometry,
}

/// Dataset file names, relative to the data directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataPaths {
    pub cls_umap: String,
    pub tani_umap: String,
    pub acc_rank1: String,
    pub acc_meanrank: String,
    pub acc_tanimoto: String,
    pub metrics: String,
    pub chem: String,
    /// Top-k prediction level -> counts file
    pub confusion: BTreeMap<u32, String>,
}

impl Default for DataPaths {
    fn default() -> Self {
        Self {
            cls_umap: "cls_umap.csv".into(),
            tani_umap: "tanimoto_umap.csv".into(),
            acc_rank1: "acc_rank1.csv".into(),
            acc_meanrank: "acc_meanrank.csv".into(),
            acc_tanimoto: "acc_tanimoto.csv".into(),
            metrics: "metrics.csv".into(),
            chem: "chem_summary.csv".into(),
            confusion: CONFUSION_KS
                .iter()
                .map(|&k| (k, format!("conf_k{}_counts.csv", k)))
                .collect(),
        }
    }
}

impl DataPaths {
    pub fn projection(&self, kind: ProjectionKind) -> &str {
        match kind {
            ProjectionKind::Cls => &self.cls_umap,
            ProjectionKind::Tani => &self.tani_umap,
        }
    }

    pub fn accuracy(&self, kind: AccuracyKind) -> &str {
        match kind {
            AccuracyKind::Rank1 => &self.acc_rank1,
            AccuracyKind::MeanRank => &self.acc_meanrank,
            AccuracyKind::Tanimoto => &self.acc_tanimoto,
        }
    }

    pub fn confusion(&self, k: u32) -> Option<&str> {
        self.confusion.get(&k).map(String::as_str)
    }

    /// (dataset name, file) pairs in display order
    pub fn entries(&self) -> Vec<(String, &str)> {
        let mut out: Vec<(String, &str)> = Vec::new();
        for kind in ProjectionKind::ALL {
            out.push((kind.label().to_string(), self.projection(kind)));
        }
        for kind in AccuracyKind::ALL {
            out.push((kind.title().to_string(), self.accuracy(kind)));
        }
        out.push(("Clustering metrics".to_string(), self.metrics.as_str()));
        out.push(("Chemistry summary".to_string(), self.chem.as_str()));
        for (k, file) in &self.confusion {
            out.push((format!("Confusion k={}", k), file.as_str()));
        }
        out
    }
}

/// Initial values of the user-facing controls
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub top_k: TopK,
    pub chem_top_k: TopK,
    pub cm_top_k: TopK,
    pub cm_k: u32,
    pub cm_mode: DisplayMode,
    pub point_size: f32,
    pub dim_opacity: f32,
    pub hide_unselected: bool,
    pub show_n: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            top_k: TopK::default(),
            chem_top_k: TopK::default(),
            cm_top_k: TopK::default(),
            cm_k: 1,
            cm_mode: DisplayMode::RowNormalized,
            point_size: 5.0,
            dim_opacity: crate::highlight::DEFAULT_DIM_OPACITY,
            hide_unselected: false,
            show_n: true,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
    }

    /// Load `path` if it exists, otherwise fall back to built-in defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        Self::load(path)
    }
}

/// Process environment, with `.env` applied first
#[derive(Debug, Clone, PartialEq)]
pub struct Env {
    pub data_dir: PathBuf,
    pub prefs_path: PathBuf,
    pub log_dir: PathBuf,
}

impl Env {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let path = |key: &str, default: &str| PathBuf::from(lookup(key).unwrap_or_else(|| default.to_string()));
        Env {
            data_dir: path("SPECTRE_DATA_DIR", "./data"),
            prefs_path: path("SPECTRE_PREFS", "spectre_prefs.yaml"),
            log_dir: path("SPECTRE_LOG_DIR", "logs"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "defaults:\n  top_k: 0\n  cm_mode: counts\nlayout:\n  min_left: 300\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.defaults.top_k.get(), 1);
        assert_eq!(config.defaults.cm_mode, DisplayMode::Counts);
        assert_eq!(config.defaults.point_size, 5.0);
        assert_eq!(config.layout.min_left, 300.0);
        assert_eq!(config.layout.min_right, 220.0);
        assert_eq!(config.data, DataPaths::default());
    }

    #[test]
    fn test_default_confusion_files() {
        let paths = DataPaths::default();
        assert_eq!(paths.confusion(5), Some("conf_k5_counts.csv"));
        assert_eq!(paths.confusion(7), None);
        assert_eq!(paths.entries().len(), 10);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("dashboard.yaml")).unwrap();
        assert_eq!(config.defaults, Defaults::default());
        assert!(Config::load(dir.path().join("dashboard.yaml")).is_err());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.yaml");
        std::fs::write(&path, "defaults: [1, 2").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_env_defaults_and_overrides() {
        let env = Env::from_lookup(|_| None);
        assert_eq!(env.data_dir, PathBuf::from("./data"));
        let env = Env::from_lookup(|k| (k == "SPECTRE_LOG_DIR").then(|| "/tmp/spectre".to_string()));
        assert_eq!(env.log_dir, PathBuf::from("/tmp/spectre"));
        assert_eq!(env.prefs_path, PathBuf::from("spectre_prefs.yaml"));
    }
}
