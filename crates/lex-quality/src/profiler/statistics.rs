//! Statistical helpers for numeric column profiling.

use crate::types::NumericStats;

/// Quantile of sorted values using linear interpolation.
///
/// The rank is `p * (n - 1)`; the result interpolates between the values
/// at the floor and ceiling ranks. Returns `None` for an empty slice.
pub(crate) fn quantile(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    let (a, b) = (sorted[lower], sorted[upper]);
    let gap = b - a;
    if gap.is_finite() {
        Some(a + fraction * gap)
    } else {
        Some(a * (1.0 - fraction) + b * fraction)
    }
}

/// Arithmetic mean; 0 for an empty slice.
///
/// Falls back to summing `v / n` when the plain sum overflows, so the
/// result stays finite for finite input.
pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if mean.is_finite() {
        mean
    } else {
        values.iter().map(|v| v / n).sum()
    }
}

/// Standard deviation with `ddof` delta degrees of freedom; 0 when there
/// are no more than `ddof` values.
fn std_dev(values: &[f64], mean: f64, ddof: usize) -> f64 {
    let n = values.len();
    if n <= ddof {
        return 0.0;
    }
    let denominator = (n - ddof) as f64;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / denominator;
    if variance.is_finite() {
        return variance.sqrt();
    }

    // Squared deviations overflowed: work on values scaled into [-1, 1]
    let scale = values
        .iter()
        .fold(mean.abs(), |acc, v| acc.max(v.abs()));
    let scaled = values
        .iter()
        .map(|v| (v / scale - mean / scale).powi(2))
        .sum::<f64>()
        / denominator;
    (scale * scaled.sqrt()).min(f64::MAX)
}

/// Sample standard deviation (n - 1); 0 for fewer than two values.
pub(crate) fn sample_std(values: &[f64], mean: f64) -> f64 {
    std_dev(values, mean, 1)
}

/// Population standard deviation (n); 0 for an empty slice.
pub(crate) fn population_std(values: &[f64], mean: f64) -> f64 {
    std_dev(values, mean, 0)
}

/// Compute the numeric summary of already sorted values.
pub(crate) fn numeric_stats(sorted: &[f64]) -> Option<NumericStats> {
    let first = *sorted.first()?;
    let last = *sorted.last()?;
    let mean = mean(sorted);
    Some(NumericStats {
        min: first,
        max: last,
        q1: quantile(sorted, 0.25)?,
        median: quantile(sorted, 0.5)?,
        q3: quantile(sorted, 0.75)?,
        mean,
        std: sample_std(sorted, mean),
    })
}
