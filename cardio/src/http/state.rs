//! Application state for the HTTP server.

use std::sync::Arc;

use crate::models::{PredictionLabel, PredictionRequest};

/// Output of a risk model for one payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: PredictionLabel,
    /// Probability of the high-risk class.
    pub probability: f64,
}

/// A trained classifier. Inference may block; handlers run it off the
/// async runtime.
pub trait RiskModel: Send + Sync {
    fn classify(&self, request: &PredictionRequest) -> anyhow::Result<Classification>;

    /// Name reported by `/health`.
    fn name(&self) -> &str {
        "risk-model"
    }
}

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<dyn RiskModel>,
}

impl AppState {
    pub fn new(model: Arc<dyn RiskModel>) -> Self {
        Self { model }
    }
}
