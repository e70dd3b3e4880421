//! Report Building
//!
//! Assembles the [`Report`] from species analyses and writes one result file per
//! requested format into the output directory.
//!
//! ```text
//! SpeciesAnalysis (per species)
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │       Report        │  Results, metadata, classification summary
//!   └──────────┬──────────┘
//!              │
//!              ▼
//!   ┌─────────────────────┐
//!   │   {stem}.txt/.csv   │  One file per output format
//!   │      /.json         │
//!   └─────────────────────┘
//! ```

use anyhow::Context;
use ssdi_report::{OutputFormat, Report, ReportMeta, SortOrder};
use ssdi_stats::SpeciesAnalysis;
use std::path::{Path, PathBuf};

/// Build a complete Report from species analyses
///
/// # Arguments
/// * `analyses` - Per-species analyses in group order
/// * `meta` - Run metadata
/// * `sort` - Row order for written results
/// * `records` - Number of validated records
/// * `skipped_rows` - Number of rows dropped during ingestion
/// * `total_duration_ms` - Wall time of the analysis in milliseconds
pub fn build_report(
    analyses: &[SpeciesAnalysis],
    meta: ReportMeta,
    sort: SortOrder,
    records: usize,
    skipped_rows: usize,
    total_duration_ms: f64,
) -> Report {
    let results = analyses.iter().map(|a| a.result.clone()).collect();
    let mut report = Report::new(meta, results);
    report.sort(sort);
    report.summary.records = records;
    report.summary.skipped_rows = skipped_rows;
    report.summary.total_duration_ms = total_duration_ms;
    report
}

/// Write the report in every requested format
///
/// Files are named `{file_stem}.{extension}` inside `outdir`. Returns the written
/// paths in format order.
pub fn write_outputs(
    report: &Report,
    outdir: &Path,
    file_stem: &str,
    formats: &[OutputFormat],
    decimals: usize,
) -> anyhow::Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(formats.len());

    for &format in formats {
        let path = outdir.join(format!("{}.{}", file_stem, format.extension()));
        let content = format
            .render(report, decimals)
            .with_context(|| format!("Failed to render {:?} report", format))?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}
