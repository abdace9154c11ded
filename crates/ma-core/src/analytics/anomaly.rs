//! Z-score anomaly detection against historical baselines.
//!
//! Each metric's current value is scored against the population mean and
//! standard deviation of its history. Scores are classified into four
//! severities, but only medium and above are reported: `low` is computed
//! and then dropped from the returned alert list.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use ma_common::{AnomalyAlert, Severity};
use ma_config::AnomalyConfig;
use ma_math::{mean, population_std_dev};
use serde::Serialize;
use tracing::debug;

/// Scoring detail for one metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnomalyScore {
    pub mean: f64,
    pub std_dev: f64,
    /// |current - mean| / std_dev
    pub z: f64,
    /// `None` when z is at or below the lowest threshold.
    pub severity: Option<Severity>,
}

/// Z-score detector.
#[derive(Debug, Clone, Default)]
pub struct AnomalyDetector {
    config: AnomalyConfig,
}

impl AnomalyDetector {
    pub fn new(config: AnomalyConfig) -> Self {
        Self { config }
    }

    /// Map a z-score to a severity (thresholds are exclusive lower bounds).
    pub fn classify(&self, z: f64) -> Option<Severity> {
        let c = &self.config;
        if z > c.critical {
            Some(Severity::Critical)
        } else if z > c.high {
            Some(Severity::High)
        } else if z > c.medium {
            Some(Severity::Medium)
        } else if z > c.low {
            Some(Severity::Low)
        } else {
            None
        }
    }

    /// Score `current` against `history`.
    ///
    /// Returns `None` when the history is shorter than `min_history` or has
    /// no spread (a constant history gives no basis for a deviation).
    pub fn score(&self, current: f64, history: &[f64]) -> Option<AnomalyScore> {
        if history.len() < self.config.min_history {
            return None;
        }
        let mean = mean(history);
        let std_dev = population_std_dev(history);
        if !std_dev.is_finite() || std_dev < 1e-10 * mean.abs().max(1.0) {
            return None;
        }
        let z = ((current - mean) / std_dev).abs();
        if !z.is_finite() {
            return None;
        }
        Some(AnomalyScore {
            mean,
            std_dev,
            z,
            severity: self.classify(z),
        })
    }

    /// Every classified anomaly, including `low`.
    pub fn scan(
        &self,
        current: &BTreeMap<String, f64>,
        histories: &BTreeMap<String, Vec<f64>>,
        now: DateTime<Utc>,
    ) -> Vec<AnomalyAlert> {
        let mut alerts = Vec::new();
        for (metric, &value) in current {
            let Some(history) = histories.get(metric) else {
                continue;
            };
            let Some(score) = self.score(value, history) else {
                debug!(metric = %metric, points = history.len(), "anomaly check skipped");
                continue;
            };
            let Some(severity) = score.severity else {
                continue;
            };
            alerts.push(AnomalyAlert {
                id: format!("anomaly-{}-{}", now.timestamp_millis(), metric),
                metric: metric.clone(),
                value,
                expected_value: score.mean,
                deviation: score.z,
                severity,
                description: describe(metric, severity, score.z),
                timestamp: now,
            });
        }
        alerts
    }

    /// Reported anomalies: medium, high, and critical only.
    pub fn detect(
        &self,
        current: &BTreeMap<String, f64>,
        histories: &BTreeMap<String, Vec<f64>>,
        now: DateTime<Utc>,
    ) -> Vec<AnomalyAlert> {
        self.scan(current, histories, now)
            .into_iter()
            .filter(|a| a.severity > Severity::Low)
            .collect()
    }
}

fn describe(metric: &str, severity: Severity, z: f64) -> String {
    match severity {
        Severity::Critical => format!(
            "Critical anomaly detected: {metric} is {z:.1} standard deviations from normal"
        ),
        Severity::High => {
            format!("High anomaly detected: {metric} significantly deviates from normal range")
        }
        Severity::Medium => format!("Medium anomaly detected: {metric} shows unusual behavior"),
        Severity::Low => format!("Minor anomaly detected: {metric} slightly outside normal range"),
    }
}
