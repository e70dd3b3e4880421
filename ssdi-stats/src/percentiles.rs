//! Percentile Computation
//!
//! Percentiles of the simulated null distribution use linear interpolation between
//! order statistics at rank `p / 100 * (n - 1)` (zero-based). With 10,000 replicates
//! the 2.5th percentile sits at rank 249.975 and the 97.5th at rank 9749.025.

use std::cmp::Ordering;

/// Percentile of an already sorted slice
///
/// Returns `None` for an empty slice. `percentile` is clamped to `[0, 100]`.
///
/// # Examples
///
/// ```
/// # use ssdi_stats::percentile_of_sorted;
/// let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(percentile_of_sorted(&sorted, 50.0), Some(3.0));
/// let p2_5 = percentile_of_sorted(&sorted, 2.5).unwrap();
/// assert!((p2_5 - 1.1).abs() < 1e-12);
/// ```
pub fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> Option<f64> {
    let n = sorted.len();
    match n {
        0 => return None,
        1 => return Some(sorted[0]),
        _ => {}
    }

    let p = percentile.clamp(0.0, 100.0) / 100.0;
    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(n - 1);
    let fraction = rank - lower_idx as f64;

    Some(sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx]))
}

/// Percentile of unsorted samples
///
/// Sorts a copy of `samples`; prefer [`percentile_of_sorted`] when several
/// percentiles are needed from the same data.
pub fn compute_percentile(samples: &[f64], percentile: f64) -> Option<f64> {
    let mut sorted = samples.to_vec();
    sort_values(&mut sorted);
    percentile_of_sorted(&sorted, percentile)
}

/// Ascending sort treating incomparable values as equal
pub(crate) fn sort_values(values: &mut [f64]) {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
}
