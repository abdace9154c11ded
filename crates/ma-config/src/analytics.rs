//! Analytics engine configuration types.
//!
//! Every section is `#[serde(default)]`, so a partial analytics.json only
//! needs the keys it changes.

use serde::{Deserialize, Serialize};

use crate::validate::{ValidationError, ValidationResult};

/// Complete analytics configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub schema_version: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    pub smoothing: SmoothingConfig,
    pub noise: NoiseConfig,
    pub anomaly: AnomalyConfig,
    pub trend: TrendConfig,
    pub seasonality: SeasonalityConfig,
    pub recommendations: RecommendationConfig,
    pub insights: InsightConfig,
    pub history: HistoryConfig,
    pub backend: BackendConfig,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            schema_version: crate::CONFIG_SCHEMA_VERSION.to_string(),
            description: None,
            smoothing: SmoothingConfig::default(),
            noise: NoiseConfig::default(),
            anomaly: AnomalyConfig::default(),
            trend: TrendConfig::default(),
            seasonality: SeasonalityConfig::default(),
            recommendations: RecommendationConfig::default(),
            insights: InsightConfig::default(),
            history: HistoryConfig::default(),
            backend: BackendConfig::default(),
        }
    }
}

/// Exponential smoothing predictor parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Smoothing factor α.
    pub alpha: f64,
    /// Slope dead band for up/down classification.
    pub trend_slope_threshold: f64,
    /// Added to r² to form the local confidence.
    pub confidence_floor: f64,
    /// Upper bound on local confidence.
    pub confidence_cap: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            alpha: 0.3,
            trend_slope_threshold: 0.01,
            confidence_floor: 0.3,
            confidence_cap: 0.95,
        }
    }
}

/// Multiplicative noise envelope applied to point forecasts.
///
/// A band of `b` draws a factor uniformly from `[1 - b, 1 + b)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseConfig {
    pub next_hour_band: f64,
    pub next_day_band: f64,
    /// Band applied to the backend prediction to derive next-day.
    pub backend_next_day_band: f64,
    /// Fixed RNG seed; unset means OS entropy per run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            next_hour_band: 0.05,
            next_day_band: 0.10,
            backend_next_day_band: 0.05,
            seed: None,
        }
    }
}

impl NoiseConfig {
    /// Envelope with every band at zero.
    pub fn disabled() -> Self {
        Self {
            next_hour_band: 0.0,
            next_day_band: 0.0,
            backend_next_day_band: 0.0,
            seed: None,
        }
    }
}

/// Z-score anomaly thresholds (exclusive lower bounds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalyConfig {
    /// Histories shorter than this are skipped.
    pub min_history: usize,
    pub low: f64,
    pub medium: f64,
    pub high: f64,
    pub critical: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            min_history: 5,
            low: 1.5,
            medium: 2.0,
            high: 2.5,
            critical: 3.0,
        }
    }
}

/// Trend analysis parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub min_points: usize,
    pub moving_average_window: usize,
    /// |slope| below this is "stable".
    pub stable_slope: f64,
    /// Detrended coefficient of variation above this is "volatile".
    pub volatility_threshold: f64,
    pub forecast_horizon: usize,
    pub period_label: String,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            min_points: 5,
            moving_average_window: 3,
            stable_slope: 0.001,
            volatility_threshold: 0.3,
            forecast_horizon: 7,
            period_label: "24h".to_string(),
        }
    }
}

/// Seasonality detection parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeasonalityConfig {
    /// Candidate period in samples (24 = daily cycle of hourly data).
    pub period: usize,
    /// Raw lagged-product threshold.
    pub threshold: f64,
}

impl Default for SeasonalityConfig {
    fn default() -> Self {
        Self {
            period: 24,
            threshold: 0.7,
        }
    }
}

/// Rule thresholds and fixed confidences for recommendations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecommendationConfig {
    pub growth_change_percent: f64,
    pub decline_change_percent: f64,
    pub volatility_strength: f64,
    pub anomaly_confidence: f64,
    pub volatility_confidence: f64,
    pub seasonal_confidence: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            growth_change_percent: 10.0,
            decline_change_percent: 15.0,
            volatility_strength: 0.5,
            anomaly_confidence: 0.9,
            volatility_confidence: 0.8,
            seasonal_confidence: 0.85,
        }
    }
}

/// Thresholds for the insight summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    pub growth_change_percent: f64,
    pub volatile_strength: f64,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            growth_change_percent: 5.0,
            volatile_strength: 0.4,
        }
    }
}

/// History provider parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Trailing points taken from a provider series.
    pub window: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { window: 24 }
    }
}

/// Categorical context sent with every prediction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PredictionContext {
    pub company: Option<String>,
    pub campaign_type: Option<String>,
    pub channel: Option<String>,
    pub target_audience: Option<String>,
    pub location: Option<String>,
    pub language: Option<String>,
    pub customer_segment: Option<String>,
}

impl Default for PredictionContext {
    fn default() -> Self {
        Self {
            company: Some("TechCorp".to_string()),
            campaign_type: Some("Email".to_string()),
            channel: Some("Social".to_string()),
            target_audience: Some("Young Professionals".to_string()),
            location: Some("Global".to_string()),
            language: Some("English".to_string()),
            customer_segment: Some("Premium".to_string()),
        }
    }
}

/// External prediction service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub enabled: bool,
    pub base_url: String,
    pub predict_path: String,
    pub timeout_secs: u64,
    pub horizon: u32,
    pub context: PredictionContext,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "http://localhost:3001".to_string(),
            predict_path: "/api/predict".to_string(),
            timeout_secs: 30,
            horizon: 1,
            context: PredictionContext::default(),
        }
    }
}

impl BackendConfig {
    /// Full prediction endpoint URL.
    pub fn predict_url(&self) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            self.predict_path.trim_start_matches('/')
        )
    }
}

impl AnalyticsConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> ValidationResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ValidationError::IoError(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Self::parse_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn parse_json(json: &str) -> ValidationResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| ValidationError::ParseError(format!("Invalid JSON: {e}")))
    }

    /// Check semantic constraints that serde cannot express.
    pub fn validate(&self) -> ValidationResult {
        let s = &self.smoothing;
        if !(s.alpha > 0.0 && s.alpha <= 1.0) {
            return Err(ValidationError::invalid(
                "smoothing.alpha",
                format!("must be in (0, 1], got {}", s.alpha),
            ));
        }
        if !(0.0..=1.0).contains(&s.confidence_cap) {
            return Err(ValidationError::invalid(
                "smoothing.confidence_cap",
                format!("must be in [0, 1], got {}", s.confidence_cap),
            ));
        }
        if s.trend_slope_threshold < 0.0 {
            return Err(ValidationError::invalid(
                "smoothing.trend_slope_threshold",
                "must be non-negative",
            ));
        }

        for (field, band) in [
            ("noise.next_hour_band", self.noise.next_hour_band),
            ("noise.next_day_band", self.noise.next_day_band),
            ("noise.backend_next_day_band", self.noise.backend_next_day_band),
        ] {
            if !(0.0..1.0).contains(&band) {
                return Err(ValidationError::invalid(
                    field,
                    format!("must be in [0, 1), got {band}"),
                ));
            }
        }

        let a = &self.anomaly;
        if a.min_history < 2 {
            return Err(ValidationError::invalid(
                "anomaly.min_history",
                "must be at least 2",
            ));
        }
        if !(a.low > 0.0 && a.low < a.medium && a.medium < a.high && a.high < a.critical) {
            return Err(ValidationError::invalid(
                "anomaly",
                format!(
                    "thresholds must be positive and strictly ascending (low={}, medium={}, high={}, critical={})",
                    a.low, a.medium, a.high, a.critical
                ),
            ));
        }

        if self.trend.min_points < 2 {
            return Err(ValidationError::invalid(
                "trend.min_points",
                "must be at least 2",
            ));
        }
        if self.seasonality.period == 0 {
            return Err(ValidationError::invalid(
                "seasonality.period",
                "must be at least 1",
            ));
        }
        if self.history.window == 0 {
            return Err(ValidationError::invalid(
                "history.window",
                "must be at least 1",
            ));
        }

        let r = &self.recommendations;
        for (field, c) in [
            ("recommendations.anomaly_confidence", r.anomaly_confidence),
            ("recommendations.volatility_confidence", r.volatility_confidence),
            ("recommendations.seasonal_confidence", r.seasonal_confidence),
        ] {
            if !(0.0..=1.0).contains(&c) {
                return Err(ValidationError::invalid(
                    field,
                    format!("must be in [0, 1], got {c}"),
                ));
            }
        }

        if self.backend.timeout_secs == 0 {
            return Err(ValidationError::invalid(
                "backend.timeout_secs",
                "must be greater than 0",
            ));
        }
        if self.backend.base_url.trim().is_empty() {
            return Err(ValidationError::invalid(
                "backend.base_url",
                "must not be empty",
            ));
        }

        Ok(())
    }
}
