//! Trend estimation and classification for metric histories.
//!
//! Classifies an ordered series into stable, increasing, decreasing, or
//! volatile, with a strength score, the fit quality, a seasonality flag and
//! a short linear forecast.
//!
//! The slope is taken from a least-squares fit of the moving-average
//! smoothed series. Volatility is measured on the residuals of a fit of the
//! raw series, so a clean ramp is classified by direction rather than as
//! noise.

use std::collections::BTreeMap;

use ma_common::{TrendAnalysis, TrendCategory};
use ma_config::{SeasonalityConfig, TrendConfig};
use ma_math::{
    coefficient_of_variation, linear_regression, max_value, mean, moving_average,
    population_std_dev, LinearFit,
};
use tracing::debug;

use super::seasonality::detect_seasonality;

/// Fit a linear trend against the sample index.
///
/// Fewer than two points yields slope 0 and r² 0; a constant series yields
/// r² 0.
pub fn estimate_trend(series: &[f64]) -> LinearFit {
    linear_regression(series)
}

/// Direction of a slope with a symmetric dead band.
pub fn classify_slope(slope: f64, stable_slope: f64) -> TrendCategory {
    if slope.abs() < stable_slope {
        TrendCategory::Stable
    } else if slope > 0.0 {
        TrendCategory::Increasing
    } else {
        TrendCategory::Decreasing
    }
}

/// Spread of the series around its own linear fit, relative to its mean.
///
/// This is not the raw coefficient of variation (`std_dev / mean` of the
/// series itself), which the dashboard's volatility check used. Under the raw
/// measure a steady ramp counts as volatile; here it scores near zero. The raw
/// value is still logged by [`analyze_trend`] for comparison.
///
/// Returns 0.0 for an empty series or a zero mean.
pub fn detrended_volatility(series: &[f64]) -> f64 {
    let m = mean(series);
    if series.is_empty() || m == 0.0 {
        return 0.0;
    }
    let residuals = linear_regression(series).residuals(series);
    population_std_dev(&residuals) / m.abs()
}

/// Analyze one metric's history.
///
/// Returns `None` when the series is shorter than `config.min_points`.
pub fn analyze_trend(
    metric: &str,
    series: &[f64],
    config: &TrendConfig,
    seasonality: &SeasonalityConfig,
) -> Option<TrendAnalysis> {
    if series.len() < config.min_points {
        return None;
    }

    let smoothed = moving_average(series, config.moving_average_window);
    let fit = linear_regression(&smoothed);

    let mut trend = classify_slope(fit.slope, config.stable_slope);
    let mut strength = match max_value(series) {
        Some(max) if max > 0.0 => (fit.slope.abs() / max * 10.0).min(1.0),
        _ => 0.0,
    };

    let volatility = detrended_volatility(series);
    debug!(
        metric,
        slope = fit.slope,
        volatility,
        raw_cv = coefficient_of_variation(series),
        "trend fitted"
    );
    if volatility > config.volatility_threshold {
        trend = TrendCategory::Volatile;
        strength = volatility.min(1.0);
    }

    let last = *series.last()?;
    let forecast = (1..=config.forecast_horizon)
        .map(|i| last + fit.slope * i as f64)
        .collect();

    Some(TrendAnalysis {
        metric: metric.to_string(),
        trend,
        strength,
        period: config.period_label.clone(),
        slope: fit.slope,
        r2: fit.r_squared,
        seasonality: detect_seasonality(series, seasonality),
        forecast,
    })
}

/// Analyze every history, skipping series that are too short.
pub fn analyze_trends(
    histories: &BTreeMap<String, Vec<f64>>,
    config: &TrendConfig,
    seasonality: &SeasonalityConfig,
) -> Vec<TrendAnalysis> {
    histories
        .iter()
        .filter_map(|(metric, series)| analyze_trend(metric, series, config, seasonality))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f64> {
        (1..=n).map(|i| i as f64).collect()
    }

    fn make_stable(n: usize, value: f64, noise: f64) -> Vec<f64> {
        // LCG jitter: deterministic and non-periodic.
        let mut state = 12345u64;
        (0..n)
            .map(|_| {
                state = state
                    .wrapping_mul(6364136223846793005)
                    .wrapping_add(1442695040888963407);
                let frac = (state >> 33) as f64 / (1u64 << 31) as f64;
                value + noise * (frac - 0.5)
            })
            .collect()
    }

    #[test]
    fn estimator_increasing_ramp() {
        let fit = estimate_trend(&ramp(20));
        assert!(fit.slope > 0.0);
        assert!((fit.r_squared - 1.0).abs() < 1e-6);
        assert_eq!(classify_slope(fit.slope, 0.001), TrendCategory::Increasing);
    }

    #[test]
    fn estimator_degenerate_input() {
        let fit = estimate_trend(&[5.0]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 0.0);
        let fit = estimate_trend(&[]);
        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.r_squared, 0.0);
    }

    #[test]
    fn classify_slope_bands() {
        assert_eq!(classify_slope(0.0005, 0.001), TrendCategory::Stable);
        assert_eq!(classify_slope(-0.0005, 0.001), TrendCategory::Stable);
        assert_eq!(classify_slope(0.5, 0.001), TrendCategory::Increasing);
        assert_eq!(classify_slope(-0.5, 0.001), TrendCategory::Decreasing);
    }

    #[test]
    fn analyze_ramp_is_increasing_not_volatile() {
        let t = analyze_trend(
            "clicks",
            &ramp(20),
            &TrendConfig::default(),
            &SeasonalityConfig::default(),
        )
        .unwrap();
        assert_eq!(t.trend, TrendCategory::Increasing);
        assert!(t.slope > 0.0);
        assert!(t.r2 > 0.95);
        assert!(!t.seasonality);
        assert_eq!(t.period, "24h");
        assert_eq!(t.forecast.len(), 7);
        assert!(t.forecast.windows(2).all(|w| w[1] > w[0]));
        assert!(t.strength > 0.0 && t.strength <= 1.0);
    }

    #[test]
    fn analyze_decreasing() {
        let data: Vec<f64> = (0..30).map(|i| 300.0 - 5.0 * i as f64).collect();
        let t = analyze_trend(
            "revenue",
            &data,
            &TrendConfig::default(),
            &SeasonalityConfig::default(),
        )
        .unwrap();
        assert_eq!(t.trend, TrendCategory::Decreasing);
        assert!(t.forecast[0] < *data.last().unwrap());
    }

    #[test]
    fn analyze_constant_is_stable() {
        let t = analyze_trend(
            "x",
            &[100.0; 10],
            &TrendConfig::default(),
            &SeasonalityConfig::default(),
        )
        .unwrap();
        assert_eq!(t.trend, TrendCategory::Stable);
        assert_eq!(t.r2, 0.0);
        assert_eq!(t.strength, 0.0);
        assert!(t.forecast.iter().all(|v| (*v - 100.0).abs() < 1e-9));
    }

    #[test]
    fn analyze_noisy_flat_is_stable() {
        let data = make_stable(40, 50.0, 0.5);
        let t = analyze_trend(
            "cpu",
            &data,
            &TrendConfig::default(),
            &SeasonalityConfig::default(),
        )
        .unwrap();
        assert_ne!(t.trend, TrendCategory::Volatile);
    }

    #[test]
    fn analyze_spiky_is_volatile() {
        let data = [10.0, 90.0, 5.0, 120.0, 8.0, 100.0, 3.0, 95.0];
        let t = analyze_trend(
            "sessions",
            &data,
            &TrendConfig::default(),
            &SeasonalityConfig::default(),
        )
        .unwrap();
        assert_eq!(t.trend, TrendCategory::Volatile);
        assert!(t.strength > 0.5 && t.strength <= 1.0);
    }

    #[test]
    fn short_series_skipped() {
        assert!(analyze_trend(
            "x",
            &[1.0, 2.0, 3.0, 4.0],
            &TrendConfig::default(),
            &SeasonalityConfig::default()
        )
        .is_none());
    }

    #[test]
    fn analyze_trends_skips_short_histories() {
        let mut histories = BTreeMap::new();
        histories.insert("long".to_string(), ramp(10));
        histories.insert("short".to_string(), ramp(3));
        let trends = analyze_trends(
            &histories,
            &TrendConfig::default(),
            &SeasonalityConfig::default(),
        );
        assert_eq!(trends.len(), 1);
        assert_eq!(trends[0].metric, "long");
    }

    #[test]
    fn volatility_zero_mean() {
        assert_eq!(detrended_volatility(&[]), 0.0);
        assert_eq!(detrended_volatility(&[-1.0, 1.0, -1.0, 1.0]), 0.0);
    }

    #[test]
    fn ramp_is_volatile_only_by_raw_cv() {
        let series = ramp(20);
        let threshold = TrendConfig::default().volatility_threshold;
        assert!(coefficient_of_variation(&series) > threshold);
        assert!(detrended_volatility(&series) < 1e-9);
    }
}
