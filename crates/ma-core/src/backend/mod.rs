//! Prediction collaborator contract.
//!
//! The orchestrator asks a [`PredictionSource`] for one prediction per
//! metric. Any error, or a response without a usable `prediction`, makes the
//! orchestrator fall back to local smoothing for that metric.

mod http;

use async_trait::async_trait;
use ma_config::PredictionContext;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use http::HttpPredictionSource;

/// Request body for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub metric: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_segment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horizon: Option<u32>,
}

impl PredictionRequest {
    pub fn new(metric: impl Into<String>, context: &PredictionContext, horizon: u32) -> Self {
        Self {
            metric: metric.into(),
            company: context.company.clone(),
            campaign_type: context.campaign_type.clone(),
            channel: context.channel.clone(),
            target_audience: context.target_audience.clone(),
            location: context.location.clone(),
            language: context.language.clone(),
            customer_segment: context.customer_segment.clone(),
            horizon: Some(horizon),
        }
    }
}

/// Response body. Every field may be absent or null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub metric: Option<String>,
    #[serde(default)]
    pub horizon: Option<u32>,
    #[serde(default)]
    pub current: Option<f64>,
    #[serde(default)]
    pub prediction: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub xgb_prediction: Option<f64>,
    #[serde(default)]
    pub prophet_prediction: Option<f64>,
    #[serde(default)]
    pub models_used: Option<u32>,
}

/// A prediction the orchestrator can use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsablePrediction {
    /// `None` when the service did not report a usable current value.
    pub current: Option<f64>,
    pub prediction: f64,
    /// Clamped to [0, 1].
    pub confidence: f64,
}

impl PredictionResponse {
    /// Reject null or non-finite predictions and confidences.
    pub fn usable(&self) -> Result<UsablePrediction, PredictionError> {
        let prediction = self
            .prediction
            .filter(|p| p.is_finite())
            .ok_or(PredictionError::MissingPrediction)?;
        let confidence = self
            .confidence
            .filter(|c| c.is_finite())
            .ok_or_else(|| PredictionError::Malformed("confidence missing or not finite".into()))?;
        Ok(UsablePrediction {
            current: self.current.filter(|c| c.is_finite() && *c != 0.0),
            prediction,
            confidence: confidence.clamp(0.0, 1.0),
        })
    }
}

/// Errors from a prediction source.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("prediction service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed prediction response: {0}")]
    Malformed(String),

    #[error("prediction service returned no prediction")]
    MissingPrediction,

    #[error("prediction timed out after {seconds}s")]
    Timeout { seconds: u64 },
}

/// Source of per-metric predictions.
#[async_trait]
pub trait PredictionSource: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    async fn predict(&self, request: &PredictionRequest)
        -> Result<PredictionResponse, PredictionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_flat_and_skips_none() {
        let mut context = PredictionContext::default();
        context.location = None;
        let req = PredictionRequest::new("clicks", &context, 1);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["metric"], "clicks");
        assert_eq!(json["company"], "TechCorp");
        assert_eq!(json["horizon"], 1);
        assert!(json.get("location").is_none());
    }

    #[test]
    fn response_tolerates_nulls_and_unknown_fields() {
        let resp: PredictionResponse = serde_json::from_str(
            r#"{"current": null, "prediction": 120.5, "confidence": 0.8,
                "xgb_prediction": null, "models_used": 2, "extra": true}"#,
        )
        .unwrap();
        let usable = resp.usable().unwrap();
        assert_eq!(usable.prediction, 120.5);
        assert_eq!(usable.current, None);
        assert_eq!(resp.models_used, Some(2));
    }

    #[test]
    fn null_prediction_is_unusable() {
        let resp: PredictionResponse =
            serde_json::from_str(r#"{"prediction": null, "confidence": 0.5}"#).unwrap();
        assert!(matches!(
            resp.usable(),
            Err(PredictionError::MissingPrediction)
        ));
    }

    #[test]
    fn missing_confidence_is_unusable() {
        let resp = PredictionResponse {
            prediction: Some(1.0),
            ..Default::default()
        };
        assert!(matches!(resp.usable(), Err(PredictionError::Malformed(_))));
    }

    #[test]
    fn confidence_is_clamped() {
        let resp = PredictionResponse {
            current: Some(0.0),
            prediction: Some(1.0),
            confidence: Some(1.7),
            ..Default::default()
        };
        let usable = resp.usable().unwrap();
        assert_eq!(usable.confidence, 1.0);
        assert_eq!(usable.current, None);
    }
}
