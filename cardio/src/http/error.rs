//! HTTP error handling.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use super::dto::ErrorBody;
use crate::models::FieldError;

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Malformed body or missing/invalid field
    BadRequest(String),
    /// The model raised while classifying; reported as a client error
    Model(String),
    /// Unknown route
    NotFound(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Model(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::Model(msg)
            | AppError::NotFound(msg)
            | AppError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: self.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<FieldError> for AppError {
    fn from(err: FieldError) -> Self {
        AppError::BadRequest(err.to_string())
    }
}
