#![warn(missing_docs)]
//! SSDi Statistical Engine
//!
//! Computes the sexual size dimorphism index (SSDi) per species and tests it
//! against a label-permutation null distribution:
//! - Partitioning of validated measurements into per-species groups
//! - Standard SSDi from per-sex means and pairwise SSDi over every male/female pair
//! - Permutation test with percentile bounds and a two-tailed p-value
//! - One-sample t-test on pairwise values (diagnostic only)
//! - Assembly of one result per species with explicit absent values

mod analysis;
mod diagnostic;
mod grouping;
mod index;
mod percentiles;
mod permutation;
mod record;
mod ttest;

pub use analysis::{
    AnalysisConfig, AnalysisError, Classification, SpeciesAnalysis, SsdiResult, analyze_groups,
    analyze_groups_with, analyze_species,
};
pub use diagnostic::{Diagnostic, DiagnosticLevel};
pub use grouping::{SampleSizeTally, SpeciesGroup, SpeciesGroups, group_by_species};
pub use index::{
    InvalidSize, SsdiEstimates, estimate, is_valid_size, mean, mean_pairwise_ssdi, pairwise_ssdi,
    ssdi,
};
pub use percentiles::{compute_percentile, percentile_of_sorted};
pub use permutation::{
    NullPosition, PValue, PermutationConfig, PermutationError, PermutationResult,
    permutation_test,
};
pub use record::{Record, Sex};
pub use ttest::{OneSampleTTest, one_sample_ttest};

/// Default number of permutation replicates
pub const DEFAULT_REPLICATES: usize = 10_000;

/// Default significance level for the dimorphism classification
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Lower percentile of the simulated null distribution
pub const LOWER_PERCENTILE: f64 = 2.5;

/// Upper percentile of the simulated null distribution
pub const UPPER_PERCENTILE: f64 = 97.5;

/// P-values below this threshold are displayed as `<0.001`
pub const P_VALUE_FLOOR: f64 = 0.001;

/// Fewest decimal places a p-value is displayed with, enough to show the floor
pub const MIN_P_VALUE_DECIMALS: usize = 3;
