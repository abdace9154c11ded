//! Marketing analytics configuration loading and validation.
//!
//! This crate provides:
//! - Typed Rust structs for analytics.json
//! - Config resolution (CLI → env → XDG → defaults)
//! - Semantic validation of thresholds and bands

pub mod analytics;
pub mod resolve;
pub mod validate;

pub use analytics::{
    AnalyticsConfig, AnomalyConfig, BackendConfig, HistoryConfig, InsightConfig, NoiseConfig,
    PredictionContext, RecommendationConfig, SeasonalityConfig, SmoothingConfig, TrendConfig,
};
pub use resolve::{resolve_config, resolve_config_with, ConfigPaths, ConfigSource, ResolvedConfig};
pub use validate::{ValidationError, ValidationResult};

/// Schema version for configuration files.
pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
