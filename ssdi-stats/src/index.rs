//! SSDi Estimators
//!
//! The signed index of Lovich & Gibbons (1992): `larger / smaller - 1`, negative
//! when males are larger and positive when females are larger.
//!
//! Two estimators are provided for a species:
//! - Standard SSDi from the per-sex means
//! - Pairwise SSDi, the mean index over every male/female pair

use crate::grouping::SpeciesGroup;
use thiserror::Error;

/// A size that is zero, negative or not finite
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("size {0} is not a positive finite number")]
pub struct InvalidSize(pub f64);

/// Sizes must be strictly positive and finite
#[inline]
pub fn is_valid_size(size: f64) -> bool {
    size.is_finite() && size > 0.0
}

/// First invalid size in `sizes`, as an error
pub(crate) fn check_sizes<'a>(sizes: impl IntoIterator<Item = &'a f64>) -> Result<(), InvalidSize> {
    match sizes.into_iter().find(|&&s| !is_valid_size(s)) {
        Some(&size) => Err(InvalidSize(size)),
        None => Ok(()),
    }
}

/// Signed size dimorphism index for one male size and one female size
///
/// # Panics
///
/// Panics if either size is not strictly positive and finite.
#[inline]
pub fn ssdi(male: f64, female: f64) -> f64 {
    assert!(
        is_valid_size(male) && is_valid_size(female),
        "sizes must be positive and finite (male {male}, female {female})"
    );
    if male > female {
        -(male / female - 1.0)
    } else if female > male {
        female / male - 1.0
    } else {
        0.0
    }
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Index for every male/female pair, male-major order
pub fn pairwise_ssdi(males: &[f64], females: &[f64]) -> Vec<f64> {
    let mut values = Vec::with_capacity(males.len() * females.len());
    for &m in males {
        for &f in females {
            values.push(ssdi(m, f));
        }
    }
    values
}

/// Mean index over every male/female pair without materializing the pairs
///
/// Returns `None` when either sex is empty.
pub fn mean_pairwise_ssdi(males: &[f64], females: &[f64]) -> Option<f64> {
    if males.is_empty() || females.is_empty() {
        return None;
    }
    Some(pairwise_sum(males, females) / (males.len() * females.len()) as f64)
}

/// Sum of the index over every male/female pair
#[inline]
pub(crate) fn pairwise_sum(males: &[f64], females: &[f64]) -> f64 {
    let mut sum = 0.0;
    for &m in males {
        for &f in females {
            sum += ssdi(m, f);
        }
    }
    sum
}

/// Point estimates for one species group
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SsdiEstimates {
    /// Mean male size
    pub avg_male: Option<f64>,
    /// Mean female size
    pub avg_female: Option<f64>,
    /// Index from the per-sex means
    pub standard_ssdi: Option<f64>,
    /// Mean index over all male/female pairs
    pub avg_pairwise_ssdi: Option<f64>,
    /// `|standard - pairwise|`
    pub abs_difference: Option<f64>,
}

/// Compute both estimators for a group
///
/// The pairwise estimator is skipped for a single male/female pair, where it would
/// only repeat the standard estimate. Fails on the first size that is not strictly
/// positive and finite.
pub fn estimate(group: &SpeciesGroup) -> Result<SsdiEstimates, InvalidSize> {
    check_sizes(group.male_sizes.iter().chain(&group.female_sizes))?;

    let avg_male = mean(&group.male_sizes);
    let avg_female = mean(&group.female_sizes);

    let standard_ssdi = match (avg_male, avg_female) {
        (Some(m), Some(f)) => Some(ssdi(m, f)),
        _ => None,
    };

    let avg_pairwise_ssdi = if group.is_single_pair() {
        None
    } else {
        mean_pairwise_ssdi(&group.male_sizes, &group.female_sizes)
    };

    let abs_difference = match (standard_ssdi, avg_pairwise_ssdi) {
        (Some(s), Some(p)) => Some((s - p).abs()),
        _ => None,
    };

    Ok(SsdiEstimates {
        avg_male,
        avg_female,
        standard_ssdi,
        avg_pairwise_ssdi,
        abs_difference,
    })
}
