//! Error types for prediction calls.

/// Message shown when the service rejects a request without saying why.
pub const GENERIC_FAILURE_MESSAGE: &str = "Error fetching data from backend";

/// Result type for prediction calls.
pub type PredictionResult<T> = Result<T, PredictionError>;

/// Why a prediction could not be obtained.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PredictionError {
    /// The service answered with a non-success status.
    #[error("Prediction request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    /// The call did not complete: connection, DNS, timeout or an
    /// undecodable reply.
    #[error("Transport error: {0}")]
    TransportError(String),

    /// The payload was refused before any I/O.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The client could not be built.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl PredictionError {
    /// Build a `RequestFailed` from a status and the raw response body.
    ///
    /// Uses the body's `error` string when there is one, otherwise
    /// [`GENERIC_FAILURE_MESSAGE`].
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE_MESSAGE.to_string());
        PredictionError::RequestFailed { status, message }
    }

    /// Single string shown to the user in place of a result.
    pub fn user_message(&self) -> String {
        match self {
            PredictionError::RequestFailed { message, .. } => message.clone(),
            PredictionError::TransportError(detail) => {
                format!("Could not reach the prediction service: {}", detail)
            }
            PredictionError::InvalidRequest(detail) => detail.clone(),
            PredictionError::Configuration(detail) => {
                format!("Prediction service is misconfigured: {}", detail)
            }
        }
    }

    /// Whether the failure happened before reaching the service.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            PredictionError::InvalidRequest(_) | PredictionError::Configuration(_)
        )
    }
}

impl From<reqwest::Error> for PredictionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PredictionError::TransportError(format!("request timed out: {}", err))
        } else if err.is_builder() {
            PredictionError::Configuration(err.to_string())
        } else {
            PredictionError::TransportError(err.to_string())
        }
    }
}
