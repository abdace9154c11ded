//! Raw (non-normalized) lagged products.
//!
//! The value at lag `k` is the mean of `x[i] * x[i - k]` over all valid `i`.
//! It is not centred or divided by the variance, so its scale follows the
//! scale of the data.

/// Mean lagged product at `lag`, or `None` when `lag` is 0 or leaves no pairs.
pub fn raw_autocorrelation(data: &[f64], lag: usize) -> Option<f64> {
    if lag == 0 || lag >= data.len() {
        return None;
    }
    let sum: f64 = (lag..data.len()).map(|i| data[i] * data[i - lag]).sum();
    Some(sum / (data.len() - lag) as f64)
}

/// Mean lagged products for lags `1..=max_lag` that have at least one pair.
pub fn raw_autocorrelations(data: &[f64], max_lag: usize) -> Vec<f64> {
    (1..=max_lag)
        .filter_map(|lag| raw_autocorrelation(data, lag))
        .collect()
}
