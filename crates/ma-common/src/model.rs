//! Analytics data model.
//!
//! These types form the output contract of one analytics run. They serialize
//! to plain JSON documents with camelCase keys so presentation and export
//! collaborators can consume them without a Rust dependency.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::id::RunId;

/// A single observation in a metric series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SeriesPoint {
    /// Observed value.
    pub value: f64,
    /// Observation time, when the source records one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Ordered (oldest first) observations for one named metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetricSeries {
    pub metric: String,
    pub points: Vec<SeriesPoint>,
}

impl MetricSeries {
    /// Build an untimed series from raw values.
    pub fn from_values(metric: impl Into<String>, values: &[f64]) -> Self {
        Self {
            metric: metric.into(),
            points: values
                .iter()
                .map(|&value| SeriesPoint {
                    value,
                    timestamp: None,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All values in time order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    /// The trailing `n` values (or all of them when shorter).
    pub fn tail(&self, n: usize) -> Vec<f64> {
        let start = self.points.len().saturating_sub(n);
        self.points[start..].iter().map(|p| p.value).collect()
    }

    /// Most recent observation.
    pub fn latest(&self) -> Option<&SeriesPoint> {
        self.points.last()
    }
}

/// Signed percentage change from `current` to `predicted`.
///
/// Returns 0.0 when `current` is zero or non-finite, so a zero baseline
/// never produces an infinite or NaN percentage.
pub fn change_percent(current: f64, predicted: f64) -> f64 {
    if current == 0.0 || !current.is_finite() || !predicted.is_finite() {
        return 0.0;
    }
    (predicted - current) / current * 100.0
}

/// Direction of a near-term prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PredictionTrend {
    Up,
    Down,
    Stable,
}

impl PredictionTrend {
    /// Classify a slope against a symmetric dead band.
    pub fn from_slope(slope: f64, threshold: f64) -> Self {
        if slope > threshold {
            PredictionTrend::Up
        } else if slope < -threshold {
            PredictionTrend::Down
        } else {
            PredictionTrend::Stable
        }
    }

    /// Classify by comparing a prediction to the current value.
    pub fn from_change(current: f64, predicted: f64) -> Self {
        if predicted > current {
            PredictionTrend::Up
        } else if predicted < current {
            PredictionTrend::Down
        } else {
            PredictionTrend::Stable
        }
    }
}

impl fmt::Display for PredictionTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PredictionTrend::Up => write!(f, "up"),
            PredictionTrend::Down => write!(f, "down"),
            PredictionTrend::Stable => write!(f, "stable"),
        }
    }
}

/// Where a prediction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PredictionOrigin {
    /// The external prediction service.
    Backend,
    /// Local exponential smoothing.
    Local,
}

/// Near-term estimate for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PredictiveMetric {
    /// Latest observed value.
    pub current: f64,
    /// Point forecast (same as `next_hour_prediction`).
    pub predicted: f64,
    /// Confidence in the forecast, 0..1.
    pub confidence: f64,
    pub trend: PredictionTrend,
    /// `(next_hour_prediction - current) / current * 100`, 0 when current is 0.
    pub change_percent: f64,
    pub next_hour_prediction: f64,
    pub next_day_prediction: f64,
    pub source: PredictionOrigin,
}

/// Anomaly severity, ordered from least to most severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

/// One flagged observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyAlert {
    pub id: String,
    pub metric: String,
    /// Observed (current) value.
    pub value: f64,
    /// Baseline mean of the history.
    pub expected_value: f64,
    /// Absolute z-score.
    pub deviation: f64,
    pub severity: Severity,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Trend category of a historical series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TrendCategory {
    Increasing,
    Decreasing,
    Stable,
    Volatile,
}

impl fmt::Display for TrendCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendCategory::Increasing => write!(f, "increasing"),
            TrendCategory::Decreasing => write!(f, "decreasing"),
            TrendCategory::Stable => write!(f, "stable"),
            TrendCategory::Volatile => write!(f, "volatile"),
        }
    }
}

/// Trend analysis of one metric's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrendAnalysis {
    pub metric: String,
    pub trend: TrendCategory,
    /// 0..1
    pub strength: f64,
    /// Window label, e.g. "24h".
    pub period: String,
    pub slope: f64,
    /// Coefficient of determination, 0..1.
    pub r2: f64,
    pub seasonality: bool,
    pub forecast: Vec<f64>,
}

/// Category of a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    Optimization,
    Alert,
    Insight,
    Action,
}

/// Recommendation priority.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    /// Numeric rank, higher is more urgent.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Medium => 2,
            Priority::Low => 1,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

/// Expected business impact of the situation a recommendation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Impact {
    Positive,
    Negative,
    Neutral,
}

/// A prioritized, human-readable action item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SmartRecommendation {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub priority: Priority,
    pub title: String,
    pub description: String,
    pub impact: Impact,
    /// 0..1
    pub confidence: f64,
    pub actions: Vec<String>,
    pub metrics: Vec<String>,
}

/// Aggregate output of one analytics run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResult {
    /// Version of this document's layout, see [`crate::SCHEMA_VERSION`].
    pub schema_version: String,
    pub run_id: RunId,
    pub generated_at: DateTime<Utc>,
    /// True when the top-level fallback path produced this result.
    pub degraded: bool,
    pub predictions: BTreeMap<String, PredictiveMetric>,
    pub anomalies: Vec<AnomalyAlert>,
    pub trends: Vec<TrendAnalysis>,
    pub recommendations: Vec<SmartRecommendation>,
    pub insights: Vec<String>,
}

impl AnalyticsResult {
    /// Number of anomalies at exactly `severity`.
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.anomalies
            .iter()
            .filter(|a| a.severity == severity)
            .count()
    }

    /// Whether any high or critical anomaly was raised.
    pub fn has_urgent_anomalies(&self) -> bool {
        self.anomalies.iter().any(|a| a.severity >= Severity::High)
    }
}
