//! Error types for marketing analytics.

use thiserror::Error;

/// Result type alias for analytics operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the analytics workspace.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors (10-19)
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid configuration value for {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // Input errors (20-29)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("metric {metric} has a non-finite value")]
    NonFiniteValue { metric: String },

    // Analysis errors (30-39)
    #[error("analysis failed: {0}")]
    Analysis(String),

    #[error("history unavailable for {metric}: {reason}")]
    HistoryUnavailable { metric: String, reason: String },

    // Collaborator errors (40-49)
    #[error("prediction service error: {0}")]
    Prediction(String),

    #[error("prediction service timed out after {seconds}s")]
    PredictionTimeout { seconds: u64 },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in JSON output.
    pub fn code(&self) -> u32 {
        match self {
            Error::Config(_) => 10,
            Error::InvalidConfig { .. } => 11,
            Error::InvalidInput(_) => 20,
            Error::NonFiniteValue { .. } => 21,
            Error::Analysis(_) => 30,
            Error::HistoryUnavailable { .. } => 31,
            Error::Prediction(_) => 40,
            Error::PredictionTimeout { .. } => 41,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }
}
