//! Exponential smoothing and trailing moving averages.

/// Simple exponential smoothing.
///
/// `S_0 = x_0`, `S_t = alpha * x_t + (1 - alpha) * S_{t-1}`. Returns the final
/// smoothed level, or `None` for an empty series.
pub fn exponential_smoothing(data: &[f64], alpha: f64) -> Option<f64> {
    let (first, rest) = data.split_first()?;
    let mut smoothed = *first;
    for &x in rest {
        smoothed = alpha * x + (1.0 - alpha) * smoothed;
    }
    Some(smoothed)
}

/// Trailing moving average.
///
/// Each output point averages the last `window` inputs up to and including
/// itself; the first few points average over the shorter prefix. A window of
/// 0 is treated as 1.
pub fn moving_average(data: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut result = Vec::with_capacity(data.len());
    let mut running = 0.0;
    for i in 0..data.len() {
        running += data[i];
        if i >= window {
            running -= data[i - window];
        }
        let len = (i + 1).min(window);
        result.push(running / len as f64);
    }
    result
}
