//! Local near-term predictions via exponential smoothing.
//!
//! The smoothed level of a series is perturbed by a multiplicative noise
//! envelope to form next-hour and next-day point forecasts. The random
//! source is passed in by the caller, so a seeded RNG (or a zero-width
//! envelope) gives reproducible output.

use ma_common::{change_percent, PredictionOrigin, PredictionTrend, PredictiveMetric};
use ma_config::{NoiseConfig, SmoothingConfig};
use ma_math::{exponential_smoothing, linear_regression};
use rand::Rng;

/// Multiplicative noise bands for point forecasts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseEnvelope {
    pub next_hour_band: f64,
    pub next_day_band: f64,
}

impl NoiseEnvelope {
    pub fn from_config(config: &NoiseConfig) -> Self {
        Self {
            next_hour_band: config.next_hour_band,
            next_day_band: config.next_day_band,
        }
    }

    /// Zero-width envelope: forecasts equal the smoothed level.
    pub fn disabled() -> Self {
        Self {
            next_hour_band: 0.0,
            next_day_band: 0.0,
        }
    }
}

impl Default for NoiseEnvelope {
    fn default() -> Self {
        Self::from_config(&NoiseConfig::default())
    }
}

/// Draw a factor uniformly from `[1 - band, 1 + band)`.
///
/// A non-positive band returns exactly 1.0 without consuming randomness.
pub fn noise_factor<R: Rng>(band: f64, rng: &mut R) -> f64 {
    if band <= 0.0 {
        return 1.0;
    }
    1.0 - band + rng.random::<f64>() * 2.0 * band
}

/// Exponential-smoothing predictor.
#[derive(Debug, Clone)]
pub struct LocalPredictor {
    smoothing: SmoothingConfig,
    noise: NoiseEnvelope,
}

impl LocalPredictor {
    pub fn new(smoothing: SmoothingConfig, noise: NoiseEnvelope) -> Self {
        Self { smoothing, noise }
    }

    /// Predict from an ordered series whose last value is the current one.
    ///
    /// Returns `None` for an empty series.
    pub fn predict<R: Rng>(&self, series: &[f64], rng: &mut R) -> Option<PredictiveMetric> {
        let current = *series.last()?;
        let smoothed = exponential_smoothing(series, self.smoothing.alpha)?;
        let fit = linear_regression(series);

        let trend = PredictionTrend::from_slope(fit.slope, self.smoothing.trend_slope_threshold);
        let next_hour = smoothed * noise_factor(self.noise.next_hour_band, rng);
        let next_day = smoothed * noise_factor(self.noise.next_day_band, rng);
        let confidence =
            (fit.r_squared + self.smoothing.confidence_floor).min(self.smoothing.confidence_cap);

        Some(PredictiveMetric {
            current,
            predicted: next_hour,
            confidence,
            trend,
            change_percent: change_percent(current, next_hour),
            next_hour_prediction: next_hour,
            next_day_prediction: next_day,
            source: PredictionOrigin::Local,
        })
    }

    /// Predict from the current value alone (degenerate single-point series).
    pub fn predict_current<R: Rng>(&self, current: f64, rng: &mut R) -> PredictiveMetric {
        let next_hour = current * noise_factor(self.noise.next_hour_band, rng);
        let next_day = current * noise_factor(self.noise.next_day_band, rng);
        PredictiveMetric {
            current,
            predicted: next_hour,
            confidence: self
                .smoothing
                .confidence_floor
                .min(self.smoothing.confidence_cap),
            trend: PredictionTrend::Stable,
            change_percent: change_percent(current, next_hour),
            next_hour_prediction: next_hour,
            next_day_prediction: next_day,
            source: PredictionOrigin::Local,
        }
    }
}

impl Default for LocalPredictor {
    fn default() -> Self {
        Self::new(SmoothingConfig::default(), NoiseEnvelope::default())
    }
}
