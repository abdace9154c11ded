//! Population statistics over plain `f64` slices.
//!
//! Empty input yields 0.0 rather than NaN so callers can treat sparse
//! metrics as a normal state.

/// Arithmetic mean. 0.0 for an empty slice.
pub fn mean(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    data.iter().sum::<f64>() / data.len() as f64
}

/// Population variance (divides by n). 0.0 for an empty slice.
pub fn population_variance(data: &[f64]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let m = mean(data);
    data.iter().map(|v| (v - m).powi(2)).sum::<f64>() / data.len() as f64
}

/// Population standard deviation.
pub fn population_std_dev(data: &[f64]) -> f64 {
    population_variance(data).sqrt()
}

/// Standard deviation divided by the absolute mean.
///
/// Returns 0.0 when the mean is zero.
pub fn coefficient_of_variation(data: &[f64]) -> f64 {
    let m = mean(data);
    if m == 0.0 {
        return 0.0;
    }
    population_std_dev(data) / m.abs()
}

/// Largest value, or `None` for an empty slice. NaNs are ignored.
pub fn max_value(data: &[f64]) -> Option<f64> {
    data.iter()
        .copied()
        .filter(|v| !v.is_nan())
        .fold(None, |acc, v| Some(acc.map_or(v, |a: f64| a.max(v))))
}
