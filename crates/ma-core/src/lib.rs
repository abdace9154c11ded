//! Marketing analytics engine.
//!
//! Predictions, anomaly detection, trend analysis and rule-based
//! recommendations over marketing metrics, with an optional remote
//! prediction service and pluggable history providers.

pub mod analytics;
pub mod backend;
pub mod engine;
pub mod exit_codes;
pub mod history;
pub mod logging;

pub use engine::AnalyticsEngine;
pub use exit_codes::ExitCode;
