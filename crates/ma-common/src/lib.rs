//! Marketing analytics common types, IDs, and errors.
//!
//! This crate provides foundational types shared across the workspace:
//! - The analytics data model (predictions, anomalies, trends, recommendations)
//! - Run identifiers
//! - Common error types
//! - Output formats

pub mod error;
pub mod id;
pub mod model;
pub mod output;
pub mod schema;

pub use error::{Error, Result};
pub use id::RunId;
pub use model::{
    change_percent, AnalyticsResult, AnomalyAlert, Impact, MetricSeries, PredictionOrigin,
    PredictionTrend, PredictiveMetric, Priority, RecommendationKind, SeriesPoint, Severity,
    SmartRecommendation, TrendAnalysis, TrendCategory,
};
pub use output::OutputFormat;
pub use schema::SCHEMA_VERSION;
