//! Periodic-pattern detection from raw lagged products.
//!
//! For each lag in `1..=period` the mean of `x[i] * x[i - lag]` is computed;
//! seasonality is declared when the largest of these exceeds the configured
//! threshold. The measure is not centred or variance-normalized, so it is
//! scale dependent: series of values comfortably above 1 will usually pass.
//! Series shorter than two full periods are never seasonal.

use ma_config::SeasonalityConfig;
use ma_math::raw_autocorrelations;
use serde::Serialize;

/// Peak of the lagged-product profile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeasonalitySignal {
    /// Lag (1-based) with the largest mean product.
    pub peak_lag: usize,
    /// Mean product at `peak_lag`.
    pub peak_value: f64,
    /// Whether `peak_value` exceeds the threshold.
    pub detected: bool,
}

/// Profile the series, or `None` when it is shorter than two periods.
pub fn seasonality_signal(series: &[f64], config: &SeasonalityConfig) -> Option<SeasonalitySignal> {
    if config.period == 0 || series.len() < config.period * 2 {
        return None;
    }

    let correlations = raw_autocorrelations(series, config.period);
    let (idx, peak) = correlations
        .iter()
        .copied()
        .enumerate()
        .filter(|(_, v)| !v.is_nan())
        .max_by(|a, b| a.1.total_cmp(&b.1))?;

    Some(SeasonalitySignal {
        peak_lag: idx + 1,
        peak_value: peak,
        detected: peak > config.threshold,
    })
}

/// Whether the series shows a periodic pattern at the configured period.
pub fn detect_seasonality(series: &[f64], config: &SeasonalityConfig) -> bool {
    seasonality_signal(series, config).is_some_and(|s| s.detected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn daily_cycle(days: usize) -> Vec<f64> {
        (0..days * 24)
            .map(|h| 100.0 + 40.0 * (h as f64 / 24.0 * std::f64::consts::TAU).sin())
            .collect()
    }

    #[test]
    fn short_series_never_seasonal() {
        let config = SeasonalityConfig::default();
        let data = vec![100.0; 47];
        assert!(!detect_seasonality(&data, &config));
        assert!(seasonality_signal(&data, &config).is_none());
    }

    #[test]
    fn daily_cycle_detected() {
        let signal = seasonality_signal(&daily_cycle(3), &SeasonalityConfig::default()).unwrap();
        assert!(signal.detected);
        assert!(signal.peak_lag >= 1 && signal.peak_lag <= 24);
    }

    #[test]
    fn small_amplitude_series_below_threshold() {
        // Values around 0.5: every lagged product is near 0.25.
        let data: Vec<f64> = (0..48).map(|i| 0.5 + 0.01 * ((i % 2) as f64)).collect();
        assert!(!detect_seasonality(&data, &SeasonalityConfig::default()));
    }

    #[test]
    fn threshold_is_raw_not_normalized() {
        // A flat series of ones has mean product 1.0 > 0.7 at every lag.
        let data = vec![1.0; 48];
        assert!(detect_seasonality(&data, &SeasonalityConfig::default()));
    }

    #[test]
    fn custom_period() {
        let config = SeasonalityConfig {
            period: 4,
            threshold: 0.7,
        };
        let data = vec![2.0; 8];
        let signal = seasonality_signal(&data, &config).unwrap();
        assert_eq!(signal.peak_value, 4.0);
        assert!(signal.detected);
    }
}
