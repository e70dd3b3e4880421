//! Analysis Executor
//!
//! Runs the per-species analysis and turns results into written reports.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Record (validated by ingest)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  analysis   │  SSDi, pairwise SSDi, permutation test (parallel)
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Build Report, write txt/csv/json
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable output
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`analysis`] - Species analysis with progress reporting and diagnostic logging
//! - [`report`] - Report building and result file writing
//! - [`formatting`] - Human-readable output formatting
//! - [`metadata`] - Run metadata collection

mod analysis;
mod formatting;
mod metadata;
mod report;

pub use analysis::{emit_diagnostics, run_analysis};
pub use formatting::format_human_output;
pub use metadata::build_report_meta;
pub use report::{build_report, write_outputs};
