#![warn(missing_docs)]
//! SSDi Report - Result Writers
//!
//! Renders per-species SSDi results:
//! - Tab-delimited text (the reference `SSDi-Results.txt` layout)
//! - CSV (`SSDi-Results.csv`)
//! - JSON with run metadata and summary
//!
//! Absent values are written as `NA`; numbers are rounded for display only.

mod delimited;
mod json;
mod report;

pub use delimited::{COLUMNS, Delimiter, format_value, generate_delimited_report};
pub use json::generate_json_report;
pub use report::{Report, ReportMeta, ReportSummary, RunSettings};

/// Default number of decimal places in written results
pub const DEFAULT_DECIMALS: usize = 3;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// Tab-delimited text
    Tsv,
    /// Comma-separated values
    Csv,
    /// JSON with metadata
    Json,
}

impl OutputFormat {
    /// File extension used when writing to the output directory
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Tsv => "txt",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    /// Render a report in this format
    pub fn render(self, report: &Report, decimals: usize) -> Result<String, serde_json::Error> {
        match self {
            OutputFormat::Tsv => Ok(generate_delimited_report(report, Delimiter::Tab, decimals)),
            OutputFormat::Csv => Ok(generate_delimited_report(report, Delimiter::Comma, decimals)),
            OutputFormat::Json => generate_json_report(report),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tsv" | "tab" | "txt" => Ok(OutputFormat::Tsv),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

/// Order of species in written results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Alphabetical by species name
    #[default]
    Species,
    /// Order in which species were first encountered in the input
    Input,
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "species" | "name" | "alphabetical" => Ok(SortOrder::Species),
            "input" | "encounter" => Ok(SortOrder::Input),
            other => Err(format!("Unknown sort order: {}", other)),
        }
    }
}
