//! Label-Permutation Test
//!
//! Builds the null distribution of the mean pairwise SSDi by pooling male and female
//! sizes and repeatedly splitting the pool into groups of the original sizes, without
//! replacement. The observed statistic is then located in that distribution.
//!
//! Replicates draw from independent generators keyed by `(stream key, replicate index)`.
//! The stream key is taken from the caller's generator, so a seeded caller gets the
//! same null distribution whether replicates run serially or on the Rayon pool.

use crate::index::{check_sizes, mean_pairwise_ssdi, pairwise_sum};
use crate::percentiles::{percentile_of_sorted, sort_values};
use crate::{
    DEFAULT_REPLICATES, LOWER_PERCENTILE, MIN_P_VALUE_DECIMALS, P_VALUE_FLOOR, UPPER_PERCENTILE,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

/// Relative tolerance when comparing simulated and observed statistics
const EXTREME_TOLERANCE: f64 = 1e-12;

/// Permutation test configuration
#[derive(Debug, Clone)]
pub struct PermutationConfig {
    /// Number of relabeling replicates (default: 10,000)
    pub replicates: usize,
    /// Whether to run replicates on the Rayon pool
    pub parallel: bool,
}

impl Default for PermutationConfig {
    fn default() -> Self {
        Self {
            replicates: DEFAULT_REPLICATES,
            parallel: true,
        }
    }
}

/// Two-tailed permutation p-value
///
/// Kept as a count so the display rule can tell a true zero from a rounded one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PValue {
    extreme_count: usize,
    replicates: usize,
}

impl PValue {
    /// P-value from the number of replicates at least as extreme as observed
    pub fn new(extreme_count: usize, replicates: usize) -> Self {
        debug_assert!(replicates > 0, "p-value needs at least one replicate");
        debug_assert!(extreme_count <= replicates);
        Self {
            extreme_count,
            replicates,
        }
    }

    /// Proportion of extreme replicates
    pub fn value(&self) -> f64 {
        self.extreme_count as f64 / self.replicates as f64
    }

    /// Replicates at least as extreme as observed
    pub fn extreme_count(&self) -> usize {
        self.extreme_count
    }

    /// Total replicates
    pub fn replicates(&self) -> usize {
        self.replicates
    }

    /// Below the display floor, shown as `<0.001`
    pub fn is_below_floor(&self) -> bool {
        self.value() < P_VALUE_FLOOR
    }

    /// Render with `decimals` places, or `<0.001` below the floor
    ///
    /// At least [`MIN_P_VALUE_DECIMALS`] places are used so a value at or above the
    /// floor never rounds to zero.
    pub fn format(&self, decimals: usize) -> String {
        if self.is_below_floor() {
            "<0.001".to_string()
        } else {
            format!("{:.*}", decimals.max(MIN_P_VALUE_DECIMALS), self.value())
        }
    }
}

impl std::fmt::Display for PValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.format(3))
    }
}

impl Serialize for PValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PValue", 4)?;
        state.serialize_field("value", &self.value())?;
        state.serialize_field("display", &self.to_string())?;
        state.serialize_field("extreme_count", &self.extreme_count)?;
        state.serialize_field("replicates", &self.replicates)?;
        state.end()
    }
}

/// Where the observed statistic falls relative to the percentile bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPosition {
    /// At or below the 2.5th percentile
    BelowLower,
    /// Strictly between the bounds
    Within,
    /// At or above the 97.5th percentile
    AboveUpper,
}

impl std::fmt::Display for NullPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NullPosition::BelowLower => write!(f, "outside the 2.5 percentile"),
            NullPosition::Within => write!(f, "within the 2.5 and 97.5 percentiles"),
            NullPosition::AboveUpper => write!(f, "outside the 97.5 percentile"),
        }
    }
}

/// Result of a permutation test
#[derive(Debug, Clone)]
pub struct PermutationResult {
    /// Observed (non-permuted) mean pairwise SSDi
    pub observed: f64,
    /// 2.5th percentile of the null distribution
    pub lower: f64,
    /// 97.5th percentile of the null distribution
    pub upper: f64,
    /// Two-tailed p-value
    pub p_value: PValue,
}

impl PermutationResult {
    /// Locate the observed statistic relative to the percentile bounds
    pub fn null_position(&self) -> NullPosition {
        if self.observed <= self.lower {
            NullPosition::BelowLower
        } else if self.observed >= self.upper {
            NullPosition::AboveUpper
        } else {
            NullPosition::Within
        }
    }
}

/// Errors that can occur during a permutation test
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PermutationError {
    /// One of the sexes has no sizes
    #[error("Need at least one male and one female size (got {n_male} and {n_female})")]
    MissingSex {
        /// Number of male sizes
        n_male: usize,
        /// Number of female sizes
        n_female: usize,
    },

    /// Exactly one size per sex
    #[error("A single male/female pair has no permutation distribution")]
    SinglePair,

    /// A size is zero, negative or not finite
    #[error("Size {size} is not a positive finite number")]
    InvalidSize {
        /// The offending size
        size: f64,
    },

    /// `replicates` was zero
    #[error("Number of replicates must be positive")]
    ZeroReplicates,
}

/// Run the permutation test for one species
///
/// `rng` is advanced by exactly one 64-bit draw.
pub fn permutation_test<R: RngCore + ?Sized>(
    males: &[f64],
    females: &[f64],
    config: &PermutationConfig,
    rng: &mut R,
) -> Result<PermutationResult, PermutationError> {
    let n_male = males.len();
    let n_female = females.len();
    if n_male == 0 || n_female == 0 {
        return Err(PermutationError::MissingSex { n_male, n_female });
    }
    if n_male == 1 && n_female == 1 {
        return Err(PermutationError::SinglePair);
    }
    check_sizes(males.iter().chain(females))
        .map_err(|e| PermutationError::InvalidSize { size: e.0 })?;
    if config.replicates == 0 {
        return Err(PermutationError::ZeroReplicates);
    }

    let observed = mean_pairwise_ssdi(males, females).ok_or(PermutationError::MissingSex {
        n_male,
        n_female,
    })?;

    let pool: Vec<f64> = males.iter().chain(females).copied().collect();
    let stream_key = rng.next_u64();

    let mut null = if config.parallel {
        simulate_parallel(&pool, n_male, stream_key, config.replicates)
    } else {
        simulate_serial(&pool, n_male, stream_key, config.replicates)
    };
    sort_values(&mut null);

    let lower = percentile_of_sorted(&null, LOWER_PERCENTILE).unwrap_or(f64::NAN);
    let upper = percentile_of_sorted(&null, UPPER_PERCENTILE).unwrap_or(f64::NAN);

    let threshold = observed.abs() - EXTREME_TOLERANCE * observed.abs().max(1.0);
    let extreme_count = null.iter().filter(|x| x.abs() >= threshold).count();

    Ok(PermutationResult {
        observed,
        lower,
        upper,
        p_value: PValue::new(extreme_count, config.replicates),
    })
}

/// Simulate the null distribution on the Rayon pool
fn simulate_parallel(pool: &[f64], n_male: usize, stream_key: u64, replicates: usize) -> Vec<f64> {
    (0..replicates)
        .into_par_iter()
        .map_init(
            || Vec::with_capacity(pool.len()),
            |scratch, i| relabel_once(pool, n_male, stream_key, i as u64, scratch),
        )
        .collect()
}

/// Simulate the null distribution on the calling thread
fn simulate_serial(pool: &[f64], n_male: usize, stream_key: u64, replicates: usize) -> Vec<f64> {
    let mut scratch = Vec::with_capacity(pool.len());
    (0..replicates)
        .map(|i| relabel_once(pool, n_male, stream_key, i as u64, &mut scratch))
        .collect()
}

/// One replicate: random split of the pool into `n_male` and the rest
fn relabel_once(
    pool: &[f64],
    n_male: usize,
    stream_key: u64,
    replicate: u64,
    scratch: &mut Vec<f64>,
) -> f64 {
    let mut rng = StdRng::seed_from_u64(replicate_seed(stream_key, replicate));
    scratch.clear();
    scratch.extend_from_slice(pool);
    let (males, females) = scratch.partial_shuffle(&mut rng, n_male);
    pairwise_sum(males, females) / (males.len() * females.len()) as f64
}

/// SplitMix64 finalizer over the stream key and replicate index
fn replicate_seed(stream_key: u64, replicate: u64) -> u64 {
    let mut z = stream_key ^ replicate.wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(replicates: usize, parallel: bool) -> PermutationConfig {
        PermutationConfig {
            replicates,
            parallel,
        }
    }

    #[test]
    fn test_rejects_missing_sex() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = permutation_test(&[1.0, 2.0], &[], &config(100, false), &mut rng).unwrap_err();
        assert_eq!(
            err,
            PermutationError::MissingSex {
                n_male: 2,
                n_female: 0
            }
        );
    }

    #[test]
    fn test_rejects_single_pair() {
        let mut rng = StdRng::seed_from_u64(1);
        let err = permutation_test(&[1.0], &[2.0], &config(100, false), &mut rng).unwrap_err();
        assert_eq!(err, PermutationError::SinglePair);
    }

    #[test]
    fn test_rejects_invalid_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        let err =
            permutation_test(&[0.0, 1.0], &[1.0, 2.0], &config(100, true), &mut rng).unwrap_err();
        assert_eq!(err, PermutationError::InvalidSize { size: 0.0 });

        let err =
            permutation_test(&[-1.0, 1.0], &[1.0, 2.0], &config(100, true), &mut rng).unwrap_err();
        assert_eq!(err, PermutationError::InvalidSize { size: -1.0 });

        let err = permutation_test(&[1.0, 2.0], &[1.0, f64::NAN], &config(100, true), &mut rng)
            .unwrap_err();
        assert!(matches!(err, PermutationError::InvalidSize { .. }));
    }

    #[test]
    fn test_rejects_zero_replicates() {
        let mut rng = StdRng::seed_from_u64(1);
        let err =
            permutation_test(&[1.0, 2.0], &[2.0, 3.0], &config(0, false), &mut rng).unwrap_err();
        assert_eq!(err, PermutationError::ZeroReplicates);
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let males = [33.1, 33.5, 32.9, 34.0];
        let females = [33.7, 34.5, 35.2];

        let a = permutation_test(&males, &females, &config(2_000, true), &mut StdRng::seed_from_u64(7))
            .unwrap();
        let b = permutation_test(&males, &females, &config(2_000, true), &mut StdRng::seed_from_u64(7))
            .unwrap();

        assert_eq!(a.p_value, b.p_value);
        assert_eq!(a.lower.to_bits(), b.lower.to_bits());
        assert_eq!(a.upper.to_bits(), b.upper.to_bits());
    }

    #[test]
    fn test_parallel_matches_serial() {
        let males = [10.0, 11.5, 9.8, 10.4, 12.0];
        let females = [11.0, 12.5, 13.1, 12.2];

        let parallel =
            permutation_test(&males, &females, &config(3_000, true), &mut StdRng::seed_from_u64(99))
                .unwrap();
        let serial =
            permutation_test(&males, &females, &config(3_000, false), &mut StdRng::seed_from_u64(99))
                .unwrap();

        assert_eq!(parallel.p_value, serial.p_value);
        assert_eq!(parallel.lower.to_bits(), serial.lower.to_bits());
        assert_eq!(parallel.upper.to_bits(), serial.upper.to_bits());
    }

    #[test]
    fn test_advances_caller_rng_once() {
        let mut used = StdRng::seed_from_u64(5);
        permutation_test(&[1.0, 2.0], &[3.0, 4.0], &config(10, false), &mut used).unwrap();

        let mut reference = StdRng::seed_from_u64(5);
        reference.next_u64();
        assert_eq!(used.next_u64(), reference.next_u64());
    }

    #[test]
    fn test_separated_groups_reject_null() {
        let males = [10.0, 10.2, 10.4, 10.1, 10.3, 10.5];
        let females = [20.0, 20.2, 20.4, 20.1, 20.3, 20.5];
        let result =
            permutation_test(&males, &females, &config(10_000, true), &mut StdRng::seed_from_u64(3))
                .unwrap();

        assert!(result.observed > 0.9);
        assert!(result.p_value.value() < 0.05);
        assert_eq!(result.null_position(), NullPosition::AboveUpper);
    }

    #[test]
    fn test_interleaved_groups_fail_to_reject() {
        let males = [1.0, 3.0, 5.0, 7.0, 9.0, 11.0];
        let females = [2.0, 4.0, 6.0, 8.0, 10.0, 12.0];
        let result =
            permutation_test(&males, &females, &config(10_000, true), &mut StdRng::seed_from_u64(3))
                .unwrap();

        assert!(result.p_value.value() >= 0.05);
        assert!(result.lower < 0.0 && result.upper > 0.0);
        assert_eq!(result.null_position(), NullPosition::Within);
    }

    #[test]
    fn test_identical_sizes_are_all_extreme() {
        // Every relabeling gives 0, which is as extreme as the observed 0
        let result = permutation_test(
            &[5.0, 5.0, 5.0],
            &[5.0, 5.0],
            &config(500, false),
            &mut StdRng::seed_from_u64(11),
        )
        .unwrap();
        assert_eq!(result.observed, 0.0);
        assert_eq!(result.p_value.extreme_count(), 500);
        assert_eq!(result.lower, 0.0);
        assert_eq!(result.upper, 0.0);
    }

    #[test]
    fn test_p_value_display() {
        assert_eq!(PValue::new(0, 10_000).to_string(), "<0.001");
        assert_eq!(PValue::new(9, 10_000).to_string(), "<0.001");
        assert_eq!(PValue::new(10, 10_000).to_string(), "0.001");
        assert_eq!(PValue::new(500, 10_000).to_string(), "0.050");
        assert_eq!(PValue::new(10_000, 10_000).to_string(), "1.000");
        assert_eq!(PValue::new(1234, 10_000).format(4), "0.1234");
    }

    #[test]
    fn test_p_value_never_rounds_to_zero() {
        assert_eq!(PValue::new(40, 10_000).format(2), "0.004");
        assert_eq!(PValue::new(10, 10_000).format(0), "0.001");
        assert_eq!(PValue::new(3_000, 10_000).format(0), "0.300");
        assert_eq!(PValue::new(0, 10_000).format(1), "<0.001");
    }

    #[test]
    fn test_null_position() {
        let at = |observed| PermutationResult {
            observed,
            lower: -0.1,
            upper: 0.1,
            p_value: PValue::new(1, 10),
        };
        assert_eq!(at(-0.1).null_position(), NullPosition::BelowLower);
        assert_eq!(at(0.0).null_position(), NullPosition::Within);
        assert_eq!(at(0.1).null_position(), NullPosition::AboveUpper);
    }

    #[test]
    fn test_replicate_seeds_differ() {
        assert_ne!(replicate_seed(0, 0), replicate_seed(0, 1));
        assert_ne!(replicate_seed(1, 0), replicate_seed(0, 0));
    }
}
