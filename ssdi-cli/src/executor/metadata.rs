//! Run Metadata Collection
//!
//! Collects the information recorded in report metadata:
//!
//! - **Version**: version of the calculator that produced the report
//! - **Timestamp**: UTC time of report generation
//! - **Input**: path of the analysed file, when known
//! - **Settings**: replicates, significance level, seed and display precision

use chrono::Utc;
use ssdi_report::{ReportMeta, RunSettings};
use std::path::Path;

/// Current report schema version
pub const SCHEMA_VERSION: u32 = 1;

/// Build report metadata for this run
pub fn build_report_meta(input: Option<&Path>, settings: RunSettings) -> ReportMeta {
    ReportMeta {
        schema_version: SCHEMA_VERSION,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        input: input.map(|p| p.display().to_string()),
        settings,
    }
}
