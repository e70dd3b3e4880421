//! Report Data Structures

use crate::SortOrder;
use chrono::{DateTime, Utc};
use serde::Serialize;
use ssdi_stats::{Classification, SsdiResult};

/// Complete SSDi report for one run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub meta: ReportMeta,
    pub results: Vec<SsdiResult>,
    pub summary: ReportSummary,
}

/// Report metadata
#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub schema_version: u32,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub input: Option<String>,
    pub settings: RunSettings,
}

/// Analysis settings captured in report metadata
#[derive(Debug, Clone, Serialize)]
pub struct RunSettings {
    pub replicates: usize,
    pub alpha: f64,
    pub seed: Option<u64>,
    pub decimals: usize,
}

/// Report summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReportSummary {
    pub total_species: usize,
    pub dimorphic: usize,
    pub not_distinguishable: usize,
    pub insufficient_data: usize,
    pub records: usize,
    pub skipped_rows: usize,
    pub total_duration_ms: f64,
}

impl ReportSummary {
    /// Count classifications over a result set
    pub fn from_results(results: &[SsdiResult], alpha: f64) -> Self {
        let mut summary = Self {
            total_species: results.len(),
            ..Default::default()
        };
        for result in results {
            match result.classification(alpha) {
                Classification::Dimorphic => summary.dimorphic += 1,
                Classification::NotDistinguishable => summary.not_distinguishable += 1,
                Classification::InsufficientData => summary.insufficient_data += 1,
            }
        }
        summary
    }
}

impl Report {
    /// Build a report and its classification summary
    pub fn new(meta: ReportMeta, results: Vec<SsdiResult>) -> Self {
        let summary = ReportSummary::from_results(&results, meta.settings.alpha);
        Self {
            meta,
            results,
            summary,
        }
    }

    /// Reorder results for writing
    ///
    /// `SortOrder::Input` leaves the order as produced by the analysis.
    pub fn sort(&mut self, order: SortOrder) {
        if order == SortOrder::Species {
            self.results.sort_by(|a, b| a.species.cmp(&b.species));
        }
    }

    /// Classification of one result under this run's significance level
    pub fn classification(&self, result: &SsdiResult) -> Classification {
        result.classification(self.meta.settings.alpha)
    }
}
