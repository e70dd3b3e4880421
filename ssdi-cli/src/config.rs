//! Configuration loading from ssdi.toml
//!
//! Settings can be given in an `ssdi.toml` file. The file is discovered by walking
//! up from the current directory, or passed explicitly with `--config`. Command-line
//! flags override file values.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// SSDi calculator configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SsdiConfig {
    /// Analysis configuration
    #[serde(default)]
    pub analysis: AnalysisSection,
    /// Input configuration
    #[serde(default)]
    pub input: InputSection,
    /// Output configuration
    #[serde(default)]
    pub output: OutputSection,
}

/// Permutation test and classification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSection {
    /// Number of permutation replicates
    #[serde(default = "default_replicates")]
    pub replicates: usize,
    /// Significance level for the dimorphism classification
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    /// Seed for reproducible permutation draws
    #[serde(default)]
    pub seed: Option<u64>,
    /// Run species and replicates on the Rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            replicates: default_replicates(),
            alpha: default_alpha(),
            seed: None,
            parallel: default_parallel(),
        }
    }
}

fn default_replicates() -> usize {
    ssdi_stats::DEFAULT_REPLICATES
}
fn default_alpha() -> f64 {
    ssdi_stats::DEFAULT_ALPHA
}
fn default_parallel() -> bool {
    true
}

/// Input file settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct InputSection {
    /// Input format when `--fileformat` is not given: "tab" or "csv"
    #[serde(default)]
    pub format: Option<String>,
}

/// Output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    /// Result formats to write: "tsv", "csv", "json"
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
    /// Decimal places for written numbers
    #[serde(default = "default_decimals")]
    pub decimals: usize,
    /// Row order: "species" or "input"
    #[serde(default = "default_sort")]
    pub sort: String,
    /// Base name of result files
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
    /// Run log written to the output directory
    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            formats: default_formats(),
            decimals: default_decimals(),
            sort: default_sort(),
            file_stem: default_file_stem(),
            log_file: default_log_file(),
        }
    }
}

fn default_formats() -> Vec<String> {
    vec!["tsv".to_string(), "csv".to_string()]
}
fn default_decimals() -> usize {
    ssdi_report::DEFAULT_DECIMALS
}
fn default_sort() -> String {
    "species".to_string()
}
fn default_file_stem() -> String {
    "SSDi-Results".to_string()
}
fn default_log_file() -> String {
    "SSDi-Calculator-Run.log".to_string()
}

impl SsdiConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Try to discover and load configuration by walking up from current directory
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("ssdi.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }

    /// Generate a default configuration as TOML string
    pub fn default_toml() -> String {
        r#"# SSDi Calculator Configuration

[analysis]
# Number of permutation replicates
replicates = 10000
# Significance level for classifying a species as dimorphic
alpha = 0.05
# Seed for reproducible permutation draws (uncomment to enable)
# seed = 42
# Analyse species and replicates in parallel
parallel = true

[input]
# Input format when --fileformat is not given: "tab" or "csv" (uncomment to enable)
# format = "csv"

[output]
# Result files to write: tsv, csv, json
formats = ["tsv", "csv"]
# Decimal places in written results
decimals = 3
# Row order: "species" (alphabetical) or "input" (first encountered)
sort = "species"
# Base name of result files
file_stem = "SSDi-Results"
# Run log written to the output directory
log_file = "SSDi-Calculator-Run.log"
"#
        .to_string()
    }
}
