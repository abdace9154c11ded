//! Historical series providers.
//!
//! A provider is pulled once per metric per run. It owns its data; the
//! engine never mutates or schedules updates on it.

pub mod synthetic;

use std::collections::BTreeMap;

use ma_common::MetricSeries;
use thiserror::Error;

pub use synthetic::{DatasetBaseline, MetricDataset, SyntheticDatasets, SYNTHETIC_METRICS};

/// Errors from a history provider.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("history provider unavailable: {0}")]
    Unavailable(String),

    #[error("malformed series for {metric}: {reason}")]
    Malformed { metric: String, reason: String },
}

/// Pull interface for historical series.
pub trait HistoryProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Series for `metric`, oldest first. `Ok(None)` when the provider has
    /// no data for it.
    fn history(&self, metric: &str) -> Result<Option<MetricSeries>, HistoryError>;
}

/// In-memory provider.
#[derive(Debug, Clone, Default)]
pub struct StaticHistory {
    series: BTreeMap<String, MetricSeries>,
}

impl StaticHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(data: &BTreeMap<String, Vec<f64>>) -> Self {
        let series = data
            .iter()
            .map(|(metric, values)| {
                (metric.clone(), MetricSeries::from_values(metric.clone(), values))
            })
            .collect();
        Self { series }
    }

    pub fn insert(&mut self, series: MetricSeries) {
        self.series.insert(series.metric.clone(), series);
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl HistoryProvider for StaticHistory {
    fn name(&self) -> &str {
        "static"
    }

    fn history(&self, metric: &str) -> Result<Option<MetricSeries>, HistoryError> {
        let Some(series) = self.series.get(metric) else {
            return Ok(None);
        };
        if let Some(idx) = series.points.iter().position(|p| !p.value.is_finite()) {
            return Err(HistoryError::Malformed {
                metric: metric.to_string(),
                reason: format!("non-finite value at index {idx}"),
            });
        }
        Ok(Some(series.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_history_lookup() {
        let mut data = BTreeMap::new();
        data.insert("clicks".to_string(), vec![1.0, 2.0, 3.0]);
        let provider = StaticHistory::from_values(&data);
        assert_eq!(provider.len(), 1);
        let series = provider.history("clicks").unwrap().unwrap();
        assert_eq!(series.values(), vec![1.0, 2.0, 3.0]);
        assert!(provider.history("missing").unwrap().is_none());
    }

    #[test]
    fn non_finite_values_are_malformed() {
        let mut provider = StaticHistory::new();
        provider.insert(MetricSeries::from_values("x", &[1.0, f64::NAN]));
        let err = provider.history("x").unwrap_err();
        assert!(matches!(err, HistoryError::Malformed { .. }));
        assert!(err.to_string().contains("index 1"));
    }
}
