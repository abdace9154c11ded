//! HTTP prediction source.

use std::time::Duration;

use async_trait::async_trait;
use ma_config::BackendConfig;
use serde::Deserialize;
use tracing::debug;

use super::{PredictionError, PredictionRequest, PredictionResponse, PredictionSource};

/// Error body returned by the prediction service on failure.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    error: Option<String>,
    details: Option<String>,
}

/// POSTs JSON requests to the prediction service.
#[derive(Debug, Clone)]
pub struct HttpPredictionSource {
    client: reqwest::Client,
    url: String,
}

impl HttpPredictionSource {
    pub fn new(config: &BackendConfig) -> Result<Self, PredictionError> {
        // The orchestrator applies its own deadline; this bounds connection setup.
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            url: config.predict_url(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl PredictionSource for HttpPredictionSource {
    fn name(&self) -> &str {
        "http"
    }

    async fn predict(
        &self,
        request: &PredictionRequest,
    ) -> Result<PredictionResponse, PredictionError> {
        let response = self.client.post(&self.url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(metric = %request.metric, status = status.as_u16(), "prediction response");

        if !status.is_success() {
            let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
            let message = match (parsed.error, parsed.details) {
                (Some(error), Some(details)) => format!("{error}: {details}"),
                (Some(error), None) => error,
                (None, Some(details)) => details,
                (None, None) => status.canonical_reason().unwrap_or("unknown").to_string(),
            };
            return Err(PredictionError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| PredictionError::Malformed(e.to_string()))
    }
}
