//! Ordinary least-squares line fit against the sample index.
//!
//! The independent variable is the position `0..n-1`, so callers pass plain
//! ordered values. Degenerate input (fewer than two points, a constant
//! series) resolves to defined values instead of NaN.

use serde::{Deserialize, Serialize};

/// Result of a linear fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Change per step.
    pub slope: f64,
    /// Fitted value at index 0.
    pub intercept: f64,
    /// Coefficient of determination, clamped to [0, 1].
    pub r_squared: f64,
}

impl LinearFit {
    /// Fitted value at `index` (may be past the end for extrapolation).
    pub fn predict(&self, index: f64) -> f64 {
        self.slope * index + self.intercept
    }

    /// Residuals `y_i - fit(i)`.
    pub fn residuals(&self, data: &[f64]) -> Vec<f64> {
        data.iter()
            .enumerate()
            .map(|(i, y)| y - self.predict(i as f64))
            .collect()
    }
}

/// Fit `y = slope * i + intercept` by least squares.
///
/// - `n == 0`: all zeros.
/// - `n == 1`: slope 0, intercept the single value, r² 0.
/// - constant series: r² 0.
pub fn linear_regression(data: &[f64]) -> LinearFit {
    let n = data.len();
    if n < 2 {
        return LinearFit {
            slope: 0.0,
            intercept: data.first().copied().unwrap_or(0.0),
            r_squared: 0.0,
        };
    }

    let nf = n as f64;
    let x_mean = (nf - 1.0) / 2.0;
    let y_mean = data.iter().sum::<f64>() / nf;

    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for (i, y) in data.iter().enumerate() {
        let dx = i as f64 - x_mean;
        sxx += dx * dx;
        sxy += dx * (y - y_mean);
    }

    let slope = sxy / sxx;
    let intercept = y_mean - slope * x_mean;

    let constant = data.iter().all(|&y| y == data[0]);
    let ss_tot: f64 = data.iter().map(|y| (y - y_mean).powi(2)).sum();
    let ss_res: f64 = data
        .iter()
        .enumerate()
        .map(|(i, y)| (y - (slope * i as f64 + intercept)).powi(2))
        .sum();

    let r_squared = if constant || ss_tot <= 0.0 {
        0.0
    } else {
        let r2 = 1.0 - ss_res / ss_tot;
        if r2.is_finite() {
            r2.clamp(0.0, 1.0)
        } else {
            0.0
        }
    };

    LinearFit {
        slope: if slope.is_finite() { slope } else { 0.0 },
        intercept: if intercept.is_finite() { intercept } else { 0.0 },
        r_squared,
    }
}
