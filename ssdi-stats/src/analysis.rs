//! Per-Species Analysis
//!
//! Runs the estimators and the permutation test on each species group and packages
//! one [`SsdiResult`] per species. Fields that the data cannot support stay `None`
//! and are never replaced by zero:
//! - no male or no female: every SSDi-dependent field is `None`
//! - exactly one male and one female: pairwise, p-value and percentiles are `None`

use crate::diagnostic::Diagnostic;
use crate::grouping::SpeciesGroup;
use crate::index::{estimate, pairwise_ssdi};
use crate::permutation::{PValue, PermutationConfig, PermutationError, permutation_test};
use crate::ttest::{OneSampleTTest, one_sample_ttest};
use crate::DEFAULT_ALPHA;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

/// Analysis configuration
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Permutation test settings
    pub permutation: PermutationConfig,
    /// Significance level for the classification (default: 0.05)
    pub alpha: f64,
    /// Whether to analyse species on the Rayon pool
    pub parallel_species: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            permutation: PermutationConfig::default(),
            alpha: DEFAULT_ALPHA,
            parallel_species: true,
        }
    }
}

impl AnalysisConfig {
    /// Check the configuration before any work is done
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "alpha must be between 0 and 1, got {}",
                self.alpha
            )));
        }
        if self.permutation.replicates == 0 {
            return Err(AnalysisError::InvalidConfig(
                "replicates must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Dimorphism result for one species
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SsdiResult {
    /// Species name
    pub species: String,
    /// Number of male measurements
    pub n_male: usize,
    /// Number of female measurements
    pub n_female: usize,
    /// Mean male size
    pub avg_male: Option<f64>,
    /// Mean female size
    pub avg_female: Option<f64>,
    /// SSDi from the per-sex means
    pub standard_ssdi: Option<f64>,
    /// Mean SSDi over all male/female pairs
    pub avg_pairwise_ssdi: Option<f64>,
    /// `|standard_ssdi - avg_pairwise_ssdi|`
    pub abs_difference: Option<f64>,
    /// Two-tailed permutation p-value
    pub p_value: Option<PValue>,
    /// 2.5th percentile of the permutation distribution
    pub lower_2_5: Option<f64>,
    /// 97.5th percentile of the permutation distribution
    pub upper_97_5: Option<f64>,
}

impl SsdiResult {
    /// Classify against a significance level
    pub fn classification(&self, alpha: f64) -> Classification {
        match self.p_value {
            None => Classification::InsufficientData,
            Some(p) if p.value() < alpha => Classification::Dimorphic,
            Some(_) => Classification::NotDistinguishable,
        }
    }
}

/// Outcome of the dimorphism test for one species
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Null rejected: the species is sexually size-dimorphic
    Dimorphic,
    /// Null not rejected; this is not evidence of monomorphism
    NotDistinguishable,
    /// No permutation test could be run
    InsufficientData,
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Dimorphic => write!(f, "dimorphic"),
            Classification::NotDistinguishable => write!(f, "not distinguishable"),
            Classification::InsufficientData => write!(f, "insufficient data"),
        }
    }
}

/// Result, diagnostic t-test and messages for one species
#[derive(Debug, Clone)]
pub struct SpeciesAnalysis {
    /// Packaged result
    pub result: SsdiResult,
    /// One-sample t-test on pairwise values, diagnostic only
    pub ttest: Option<OneSampleTTest>,
    /// Messages for the caller to emit
    pub diagnostics: Vec<Diagnostic>,
}

/// Errors that abort an analysis
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    /// No species groups were given
    #[error("Nothing to analyze: no valid records")]
    NothingToAnalyze,

    /// A size that should have been rejected during ingestion
    #[error("Species {species}: size {size} is not a positive finite number")]
    InvalidSize {
        /// Species holding the size
        species: String,
        /// The offending size
        size: f64,
    },

    /// Out-of-range alpha or zero replicates
    #[error("Invalid analysis configuration: {0}")]
    InvalidConfig(String),

    /// Permutation test failure
    #[error(transparent)]
    Permutation(#[from] PermutationError),
}

/// Analyse one species group
///
/// Sizes must already be validated upstream; a non-positive or non-finite size is a
/// contract violation and is reported as [`AnalysisError::InvalidSize`].
pub fn analyze_species<R: RngCore + ?Sized>(
    group: &SpeciesGroup,
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<SpeciesAnalysis, AnalysisError> {
    let estimates = estimate(group).map_err(|e| AnalysisError::InvalidSize {
        species: group.species.clone(),
        size: e.0,
    })?;

    let species = &group.species;
    let mut diagnostics = vec![
        Diagnostic::info(format!("Species: {}", species)),
        Diagnostic::info(format!("Males: {}", group.n_male())),
        Diagnostic::info(format!("Females: {}", group.n_female())),
    ];

    match estimates.standard_ssdi {
        Some(standard) => diagnostics.push(Diagnostic::info(format!("Standard SSDi: {:.3}", standard))),
        None => diagnostics.push(Diagnostic::warn(format!(
            "Species {} does not have at least 1 M and 1 F, SSDi values reported as NA",
            species
        ))),
    }

    let mut ttest = None;
    let mut permutation = None;

    if group.supports_pairwise() {
        if let Some(avg) = estimates.avg_pairwise_ssdi {
            diagnostics.push(Diagnostic::info(format!(
                "Pairwise analyses: average pairwise SSDi: {:.3}",
                avg
            )));
        }

        ttest = one_sample_ttest(&pairwise_ssdi(&group.male_sizes, &group.female_sizes), 0.0);
        diagnostics.push(match &ttest {
            Some(t) => Diagnostic::debug(format!(
                "Pairwise analyses: one-sample t-test P-value: {:.3} (t = {:.3}, df = {})",
                t.p_value, t.t_statistic, t.degrees_of_freedom
            )),
            None => Diagnostic::debug("Pairwise analyses: one-sample t-test not computed (no variance)"),
        });

        let perm = permutation_test(&group.male_sizes, &group.female_sizes, &config.permutation, rng)?;
        diagnostics.push(Diagnostic::info(format!(
            "Permutation test: 2.5 and 97.5 percentile values: {:.3}, {:.3}",
            perm.lower, perm.upper
        )));
        diagnostics.push(Diagnostic::info(format!(
            "Permutation test: empirical value: {:.3}",
            perm.observed
        )));
        diagnostics.push(Diagnostic::info(format!(
            "Permutation test: empirical value lies {}",
            perm.null_position()
        )));
        diagnostics.push(Diagnostic::info(format!(
            "Permutation test: P-value: {}",
            perm.p_value
        )));
        permutation = Some(perm);
    } else if group.is_single_pair() {
        diagnostics.push(Diagnostic::info(
            "Single male and female: pairwise analyses and permutation test skipped",
        ));
    }

    let result = SsdiResult {
        species: species.clone(),
        n_male: group.n_male(),
        n_female: group.n_female(),
        avg_male: estimates.avg_male,
        avg_female: estimates.avg_female,
        standard_ssdi: estimates.standard_ssdi,
        avg_pairwise_ssdi: estimates.avg_pairwise_ssdi,
        abs_difference: estimates.abs_difference,
        p_value: permutation.as_ref().map(|p| p.p_value),
        lower_2_5: permutation.as_ref().map(|p| p.lower),
        upper_97_5: permutation.as_ref().map(|p| p.upper),
    };

    Ok(SpeciesAnalysis {
        result,
        ttest,
        diagnostics,
    })
}

/// Analyse every group, preserving group order
///
/// One stream key per species is drawn from `rng` up front, so results do not depend
/// on whether species run in parallel.
pub fn analyze_groups<R: RngCore + ?Sized>(
    groups: &[SpeciesGroup],
    config: &AnalysisConfig,
    rng: &mut R,
) -> Result<Vec<SpeciesAnalysis>, AnalysisError> {
    analyze_groups_with(groups, config, rng, |_| {})
}

/// [`analyze_groups`] with a callback invoked as each species finishes
///
/// The callback may run on any Rayon worker and in any order.
pub fn analyze_groups_with<R, F>(
    groups: &[SpeciesGroup],
    config: &AnalysisConfig,
    rng: &mut R,
    on_species: F,
) -> Result<Vec<SpeciesAnalysis>, AnalysisError>
where
    R: RngCore + ?Sized,
    F: Fn(&SpeciesAnalysis) + Sync,
{
    if groups.is_empty() {
        return Err(AnalysisError::NothingToAnalyze);
    }
    config.validate()?;

    let keys: Vec<u64> = groups.iter().map(|_| rng.next_u64()).collect();
    let run = |group: &SpeciesGroup, key: u64| -> Result<SpeciesAnalysis, AnalysisError> {
        let analysis = analyze_species(group, config, &mut StdRng::seed_from_u64(key))?;
        on_species(&analysis);
        Ok(analysis)
    };

    if config.parallel_species {
        groups
            .par_iter()
            .zip(keys.par_iter())
            .map(|(group, &key)| run(group, key))
            .collect()
    } else {
        groups.iter().zip(&keys).map(|(group, &key)| run(group, key)).collect()
    }
}
