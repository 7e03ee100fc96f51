//! Prediction client.
//!
//! [`Predictor`] is the seam between the form and whatever answers
//! predictions. [`PredictionClient`] is the HTTP implementation that talks to
//! the remote `/predict` endpoint.

pub mod error;
pub mod http;

use async_trait::async_trait;

use crate::models::{PredictionRequest, PredictionResponse};

pub use error::{PredictionError, PredictionResult, GENERIC_FAILURE_MESSAGE};
pub use http::{PredictionClient, PREDICT_PATH};

/// Anything that can turn a payload into a prediction.
#[async_trait]
pub trait Predictor: Send + Sync {
    /// Perform exactly one prediction attempt.
    async fn predict(&self, request: &PredictionRequest) -> PredictionResult<PredictionResponse>;

    /// Human-readable description of the backend (for logs).
    fn endpoint(&self) -> String;
}
