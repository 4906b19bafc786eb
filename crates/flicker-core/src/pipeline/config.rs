use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SAMPLE_FREQUENCY;
use crate::repository::{DatasetFilter, PlaneSelection};

/// Settings for one batch run over a repository.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Root directory of the local image repository.
    pub repository: PathBuf,
    /// Directory receiving tables, JSON and plots.
    pub output: PathBuf,
    /// Used for every image whose repository entry has no rate of its own.
    #[serde(default = "default_sample_frequency")]
    pub sample_frequency: f64,
    #[serde(default)]
    pub filter: DatasetFilter,
    #[serde(default)]
    pub planes: PlaneSelection,
    #[serde(default)]
    pub reports: ReportConfig,
}

fn default_sample_frequency() -> f64 {
    DEFAULT_SAMPLE_FREQUENCY
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            repository: PathBuf::from("data"),
            output: PathBuf::from("results"),
            sample_frequency: DEFAULT_SAMPLE_FREQUENCY,
            filter: DatasetFilter::default(),
            planes: PlaneSelection::default(),
            reports: ReportConfig::default(),
        }
    }
}

/// Which report artifacts a run writes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Per-statistic tables plus the per-image table.
    #[serde(default = "default_true")]
    pub tables: bool,
    #[serde(default = "default_true")]
    pub json: bool,
    #[serde(default = "default_true")]
    pub plots: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            tables: true,
            json: true,
            plots: true,
        }
    }
}

impl std::fmt::Display for ReportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let enabled: Vec<&str> = [
            (self.tables, "tables"),
            (self.json, "json"),
            (self.plots, "plots"),
        ]
        .iter()
        .filter(|(on, _)| *on)
        .map(|(_, name)| *name)
        .collect();
        if enabled.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", enabled.join(", "))
        }
    }
}
