//! Synthetic dashboard datasets.
//!
//! Thirty days of plausible observations for the six dashboard metrics,
//! shaped by hour-of-day, weekend and month multipliers with random
//! variation and occasional spikes. Generation is seeded, so the same seed
//! and end time always give the same series.
//!
//! Nothing here runs in the background. Callers append observations with
//! [`SyntheticDatasets::advance`] when they want the data to move.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};
use ma_common::{MetricSeries, SeriesPoint};
use ma_math::{max_value, mean, population_std_dev};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use super::{HistoryError, HistoryProvider};

/// Metric names, in dashboard order.
pub const SYNTHETIC_METRICS: [&str; 6] = [
    "activeReports",
    "emailsSentToday",
    "distributionLists",
    "failedDeliveries",
    "userSessions",
    "apiResponseTime",
];

const DAYS: i64 = 30;
/// Thirty days of hourly points.
const MAX_POINTS: usize = 720;
const MONTHLY: [f64; 12] = [0.9, 0.95, 1.0, 1.05, 1.1, 1.15, 1.1, 1.05, 1.0, 0.95, 0.9, 0.85];

/// Summary statistics of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DatasetBaseline {
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub normal_range: (f64, f64),
}

impl DatasetBaseline {
    fn compute(values: &[f64], wide_range: bool) -> Self {
        let mean = mean(values);
        let std_dev = population_std_dev(values);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let normal_range = if wide_range {
            (0.0, (mean + 2.0 * std_dev).round())
        } else {
            ((mean - std_dev).round(), (mean + std_dev).round())
        };
        Self {
            mean,
            std_dev,
            min: if min.is_finite() { min } else { 0.0 },
            max: max_value(values).unwrap_or(0.0),
            normal_range,
        }
    }
}

/// One generated metric.
#[derive(Debug, Clone, Serialize)]
pub struct MetricDataset {
    pub name: String,
    pub description: String,
    pub unit: String,
    pub series: MetricSeries,
    pub baseline: DatasetBaseline,
    pub has_seasonality: bool,
}

impl MetricDataset {
    pub fn current(&self) -> f64 {
        self.series.latest().map(|p| p.value).unwrap_or(0.0)
    }

    fn refresh_baseline(&mut self) {
        let wide = self.name == "failedDeliveries";
        self.baseline = DatasetBaseline::compute(&self.series.values(), wide);
    }
}

fn is_weekend(at: DateTime<Utc>) -> bool {
    matches!(at.weekday(), Weekday::Sat | Weekday::Sun)
}

fn is_peak_hour(hour: u32) -> bool {
    (11..=14).contains(&hour) || (16..=17).contains(&hour)
}

/// Deterministic part of the seasonal pattern.
pub fn seasonal_multiplier(at: DateTime<Utc>) -> f64 {
    let hour = at.hour();
    let mut m = if (9..=17).contains(&hour) {
        1.3
    } else if (6..=8).contains(&hour) {
        0.8
    } else {
        0.4
    };
    if is_weekend(at) {
        m *= 0.6;
    }
    if is_peak_hour(hour) {
        m *= 1.2;
    }
    m * MONTHLY[at.month0() as usize]
}

fn seasonal_value<R: Rng>(base: f64, at: DateTime<Utc>, rng: &mut R) -> f64 {
    let variation = 0.85 + rng.random::<f64>() * 0.3;
    (base * seasonal_multiplier(at) * variation).round()
}

fn timestamps(end: DateTime<Utc>, step: Duration) -> Vec<DateTime<Utc>> {
    let count = (Duration::days(DAYS).num_minutes() / step.num_minutes()).max(1);
    (0..count).rev().map(|i| end - step * i as i32).collect()
}

fn to_series(metric: &str, points: Vec<(DateTime<Utc>, f64)>) -> MetricSeries {
    MetricSeries {
        metric: metric.to_string(),
        points: points
            .into_iter()
            .map(|(at, value)| SeriesPoint {
                value,
                timestamp: Some(at),
            })
            .collect(),
    }
}

fn dataset(
    name: &str,
    description: &str,
    unit: &str,
    has_seasonality: bool,
    points: Vec<(DateTime<Utc>, f64)>,
) -> MetricDataset {
    let mut ds = MetricDataset {
        name: name.to_string(),
        description: description.to_string(),
        unit: unit.to_string(),
        series: to_series(name, points),
        baseline: DatasetBaseline::compute(&[], false),
        has_seasonality,
    };
    ds.refresh_baseline();
    ds
}

fn failed_deliveries_value<R: Rng>(at: DateTime<Utc>, rng: &mut R) -> f64 {
    let mut value = if rng.random::<f64>() < 0.7 {
        0
    } else if rng.random::<f64>() < 0.9 {
        rng.random_range(1..=3)
    } else {
        rng.random_range(3..=7)
    };
    if is_peak_hour(at.hour()) && rng.random::<f64>() < 0.3 {
        value += 1;
    }
    f64::from(value)
}

fn api_latency_value<R: Rng>(at: DateTime<Utc>, rng: &mut R) -> f64 {
    let mut value = 250.0 + (rng.random::<f64>() - 0.5) * 100.0;
    if is_peak_hour(at.hour()) {
        value *= 1.3;
    }
    if rng.random::<f64>() < 0.02 {
        value *= 2.5;
    }
    value.round()
}

/// Seeded generator and store for the dashboard metrics.
#[derive(Debug, Clone)]
pub struct SyntheticDatasets {
    datasets: BTreeMap<String, MetricDataset>,
    rng: StdRng,
}

impl SyntheticDatasets {
    /// Generate thirty days of data ending at `end`.
    pub fn generate(seed: u64, end: DateTime<Utc>) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let hourly = timestamps(end, Duration::hours(1));
        let daily = timestamps(end, Duration::days(1));

        let mut datasets = BTreeMap::new();
        let mut add = |ds: MetricDataset| {
            datasets.insert(ds.name.clone(), ds);
        };

        let points = hourly
            .iter()
            .map(|&at| (at, seasonal_value(25.0, at, &mut rng)))
            .collect();
        add(dataset("activeReports", "Number of active reports", "count", true, points));

        let points = hourly
            .iter()
            .map(|&at| {
                let mut v = seasonal_value(150.0, at, &mut rng);
                if rng.random::<f64>() < 0.05 {
                    v *= 1.8;
                }
                (at, v.round())
            })
            .collect();
        add(dataset("emailsSentToday", "Number of emails sent today", "count", true, points));

        let start = daily.first().copied().unwrap_or(end);
        let points = daily
            .iter()
            .map(|&at| {
                let months = (at - start).num_days() / 30;
                let mut v = 8.0 + months as f64 + ((rng.random::<f64>() - 0.5) * 2.0).floor();
                if is_weekend(at) {
                    v = (v - 1.0).max(1.0);
                }
                (at, v.max(1.0))
            })
            .collect();
        add(dataset(
            "distributionLists",
            "Number of active distribution lists",
            "count",
            false,
            points,
        ));

        let points = hourly
            .iter()
            .map(|&at| (at, failed_deliveries_value(at, &mut rng)))
            .collect();
        add(dataset(
            "failedDeliveries",
            "Number of failed email deliveries",
            "count",
            false,
            points,
        ));

        let points = hourly
            .iter()
            .map(|&at| (at, seasonal_value(45.0, at, &mut rng)))
            .collect();
        add(dataset("userSessions", "Number of active user sessions", "count", true, points));

        let points = hourly
            .iter()
            .map(|&at| (at, api_latency_value(at, &mut rng)))
            .collect();
        add(dataset("apiResponseTime", "Average API response time", "ms", true, points));

        Self { datasets, rng }
    }

    pub fn get(&self, metric: &str) -> Option<&MetricDataset> {
        self.datasets.get(metric)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricDataset> {
        self.datasets.values()
    }

    /// Latest value of every metric.
    pub fn current_values(&self) -> BTreeMap<String, f64> {
        self.datasets
            .iter()
            .map(|(name, ds)| (name.clone(), ds.current()))
            .collect()
    }

    /// Append one observation per metric at `now`, keeping at most thirty
    /// days of hourly points, and refresh the baselines.
    pub fn advance(&mut self, now: DateTime<Utc>) {
        let rng = &mut self.rng;
        for ds in self.datasets.values_mut() {
            let mut value = seasonal_value(ds.baseline.mean, now, rng);
            value = (value + (rng.random::<f64>() - 0.5) * ds.baseline.std_dev * 0.5)
                .round()
                .max(0.0);

            match ds.name.as_str() {
                "distributionLists" => {
                    let start = ds
                        .series
                        .points
                        .first()
                        .and_then(|p| p.timestamp)
                        .unwrap_or(now);
                    value += ((now - start).num_days() / 30) as f64;
                }
                "failedDeliveries" => {
                    value = if rng.random::<f64>() < 0.8 {
                        0.0
                    } else {
                        f64::from(rng.random_range(0..5))
                    };
                }
                "emailsSentToday" if rng.random::<f64>() < 0.03 => {
                    value = (value * 1.6).round();
                }
                _ => {}
            }

            ds.series.points.push(SeriesPoint {
                value,
                timestamp: Some(now),
            });
            if ds.series.points.len() > MAX_POINTS {
                let excess = ds.series.points.len() - MAX_POINTS;
                ds.series.points.drain(..excess);
            }
            ds.refresh_baseline();
        }
    }
}

impl HistoryProvider for SyntheticDatasets {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn history(&self, metric: &str) -> Result<Option<MetricSeries>, HistoryError> {
        Ok(self.datasets.get(metric).map(|ds| ds.series.clone()))
    }
}
