//! HTTP handlers for the prediction API.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use serde_json::Value;
use tracing::{error, info, warn};

use super::dto::HealthResponse;
use super::error::AppError;
use super::state::AppState;
use crate::models::{PredictionRequest, PredictionResponse};

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model: state.model.name().to_string(),
    }))
}

// =============================================================================
// Prediction
// =============================================================================

/// POST /predict
///
/// The body is parsed by hand rather than with the `Json` extractor so that
/// every rejection, including a wrong content type, carries an
/// `{"error": ...}` body.
pub async fn predict(
    State(state): State<AppState>,
    body: Bytes,
) -> HandlerResult<PredictionResponse> {
    let value: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("Rejecting unparseable prediction body: {}", e);
        AppError::BadRequest(format!("Invalid JSON body: {}", e))
    })?;

    let object = value
        .as_object()
        .ok_or_else(|| AppError::BadRequest("Request body must be a JSON object".to_string()))?;

    let request = PredictionRequest::from_json_object(object).map_err(|e| {
        warn!("Rejecting prediction request: {}", e);
        AppError::from(e)
    })?;

    info!(?request, "Prediction request accepted");

    let model = Arc::clone(&state.model);
    let classification = tokio::task::spawn_blocking(move || model.classify(&request))
        .await
        .map_err(|e| AppError::Internal(format!("Prediction task failed: {}", e)))?
        .map_err(|e| {
            error!("Error during prediction: {:#}", e);
            AppError::Model(e.to_string())
        })?;

    info!(
        label = classification.label.as_wire(),
        probability = classification.probability,
        "Prediction result"
    );

    Ok(Json(PredictionResponse::new(
        classification.label,
        classification.probability,
    )))
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound("Endpoint not found".to_string())
}
