//! One-sample t-test on pairwise SSDi values
//!
//! Tests whether the observed pairwise values differ from a hypothesized mean of
//! zero. Pairwise values share individuals and are not independent, so the degrees
//! of freedom are inflated; the result is reported as a diagnostic and never drives
//! the dimorphism classification.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Result of a one-sample t-test against zero
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OneSampleTTest {
    /// t statistic
    pub t_statistic: f64,
    /// Degrees of freedom (`n - 1`)
    pub degrees_of_freedom: f64,
    /// Two-tailed p-value
    pub p_value: f64,
}

/// One-sample t-test of `values` against a hypothesized mean
///
/// Returns `None` for fewer than 2 values or zero variance.
pub fn one_sample_ttest(values: &[f64], hypothesized_mean: f64) -> Option<OneSampleTTest> {
    let n = values.len();
    if n < 2 {
        return None;
    }

    let n_f = n as f64;
    let mean = values.iter().sum::<f64>() / n_f;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n_f - 1.0);
    if !variance.is_finite() || variance <= 0.0 {
        return None;
    }

    let standard_error = (variance / n_f).sqrt();
    let t_statistic = (mean - hypothesized_mean) / standard_error;
    let degrees_of_freedom = n_f - 1.0;

    let dist = StudentsT::new(0.0, 1.0, degrees_of_freedom).ok()?;
    let p_value = (2.0 * (1.0 - dist.cdf(t_statistic.abs()))).clamp(0.0, 1.0);

    Some(OneSampleTTest {
        t_statistic,
        degrees_of_freedom,
        p_value,
    })
}
