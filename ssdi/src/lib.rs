#![warn(missing_docs)]
//! # SSDi
//!
//! Sexual size dimorphism index (SSDi) calculator with permutation testing.
//!
//! For every species in a table of (species, sex, size) measurements, SSDi computes:
//! - **Standard SSDi**: `larger/smaller - 1` of the per-sex mean sizes, negative when
//!   males are larger
//! - **Pairwise SSDi**: the mean SSDi over every male/female pair
//! - **Permutation Test**: a two-tailed p-value and 2.5/97.5 percentile bounds from
//!   10,000 random relabelings of the pooled sizes
//! - **Result Files**: tab-delimited, CSV and JSON, with `NA` for absent values
//!
//! ## Quick Start
//!
//! ```
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use ssdi::prelude::*;
//!
//! let records = vec![
//!     Record::new("Emys orbicularis", Sex::Male, 33.1),
//!     Record::new("Emys orbicularis", Sex::Male, 33.5),
//!     Record::new("Emys orbicularis", Sex::Female, 33.7),
//!     Record::new("Emys orbicularis", Sex::Female, 34.5),
//! ];
//! let groups = group_by_species(&records);
//! let analyses = analyze_groups(
//!     groups.as_slice(),
//!     &AnalysisConfig::default(),
//!     &mut StdRng::seed_from_u64(42),
//! )
//! .unwrap();
//!
//! let result = &analyses[0].result;
//! assert_eq!(result.n_male, 2);
//! assert!((result.standard_ssdi.unwrap() - 0.024).abs() < 1e-3);
//! assert!(result.p_value.is_some());
//! ```

// Re-export the statistical engine
pub use ssdi_stats::{
    AnalysisConfig, AnalysisError, Classification, Diagnostic, DiagnosticLevel, InvalidSize,
    NullPosition, OneSampleTTest, PValue, PermutationConfig, PermutationError, PermutationResult,
    Record, SampleSizeTally, Sex, SpeciesAnalysis, SpeciesGroup, SpeciesGroups, SsdiEstimates,
    SsdiResult, analyze_groups, analyze_groups_with, analyze_species, compute_percentile,
    estimate, group_by_species, is_valid_size, mean, mean_pairwise_ssdi, one_sample_ttest,
    pairwise_ssdi, percentile_of_sorted, permutation_test, ssdi,
};

// Re-export writers
pub use ssdi_report::{
    COLUMNS, Delimiter, OutputFormat, Report, ReportMeta, ReportSummary, RunSettings, SortOrder,
    generate_delimited_report, generate_json_report,
};

// Re-export the front end
pub use ssdi_cli::{Cli, InputFormat, RunOptions, SsdiConfig, read_records, run_with_cli};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        AnalysisConfig, PermutationConfig, Record, Sex, SpeciesGroup, SsdiResult, analyze_groups,
        group_by_species, permutation_test, ssdi,
    };
}

/// Run the SSDi calculator CLI.
///
/// Call this from a binary's `main()`:
/// ```ignore
/// fn main() {
///     ssdi::run().unwrap();
/// }
/// ```
pub use ssdi_cli::run;
