//! HTTP prediction client.

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::header::ACCEPT;
use reqwest::Url;

use super::error::{PredictionError, PredictionResult};
use super::Predictor;
use crate::config::ServiceConfig;
use crate::models::{PredictionRequest, PredictionResponse, DEFAULT_PROBABILITY};

/// Path of the prediction endpoint, relative to the base URL.
pub const PREDICT_PATH: &str = "/predict";

/// Client for a remote `/predict` endpoint.
///
/// One POST per call, with the configured timeout and no retries.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    client: reqwest::Client,
    predict_url: Url,
}

impl PredictionClient {
    /// Create a client from service configuration.
    pub fn new(config: &ServiceConfig) -> PredictionResult<Self> {
        if config.timeout_secs == 0 {
            return Err(PredictionError::Configuration(
                "Request timeout must be at least 1 second".to_string(),
            ));
        }
        let predict_url = predict_url(config.resolved_base_url())?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| PredictionError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        debug!(
            "Prediction client targeting {} (timeout {}s)",
            predict_url, config.timeout_secs
        );

        Ok(Self {
            client,
            predict_url,
        })
    }

    /// Shorthand for a client with default settings and an explicit base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> PredictionResult<Self> {
        Self::new(&ServiceConfig::with_base_url(base_url))
    }

    pub fn predict_url(&self) -> &Url {
        &self.predict_url
    }
}

/// Join a base URL and [`PREDICT_PATH`], tolerating trailing slashes.
fn predict_url(base_url: &str) -> PredictionResult<Url> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let url = Url::parse(&format!("{}{}", trimmed, PREDICT_PATH))
        .map_err(|e| PredictionError::Configuration(format!("Invalid base URL '{}': {}", base_url, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(PredictionError::Configuration(format!(
            "Unsupported URL scheme '{}' in base URL '{}'",
            other, base_url
        ))),
    }
}

#[async_trait]
impl Predictor for PredictionClient {
    async fn predict(&self, request: &PredictionRequest) -> PredictionResult<PredictionResponse> {
        request
            .ensure_finite()
            .map_err(|e| PredictionError::InvalidRequest(e.to_string()))?;

        debug!("POST {} payload={:?}", self.predict_url, request);

        let response = self
            .client
            .post(self.predict_url.clone())
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = PredictionError::from_status(status.as_u16(), &body);
            warn!("Prediction service returned {}: {}", status, body.trim());
            return Err(err);
        }

        let body = response.text().await?;
        let parsed: PredictionResponse = serde_json::from_str(&body).map_err(|e| {
            PredictionError::TransportError(format!("Malformed prediction response: {}", e))
        })?;

        match parsed.probability {
            None => warn!(
                "Prediction response carried no probability; using {}",
                DEFAULT_PROBABILITY
            ),
            Some(p) if !(0.0..=1.0).contains(&p) => {
                warn!("Prediction probability {} is outside [0, 1]", p)
            }
            Some(_) => {}
        }

        info!(
            "Prediction received: label={} probability={:?}",
            parsed.prediction.as_wire(),
            parsed.probability
        );

        Ok(parsed)
    }

    fn endpoint(&self) -> String {
        self.predict_url.to_string()
    }
}
