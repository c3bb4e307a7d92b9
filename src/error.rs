//! HTTP error handling

use crate::decision::DecisionError;
use crate::models::inference::InferenceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// Request failed validation (bad feature vector, bad fields)
    ValidationError(String),

    /// Requested model is not loaded
    ModelNotFound(String),

    /// Model inference failed
    InferenceError(String),

    /// Anything else
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::ModelNotFound(name) => (
                StatusCode::NOT_FOUND,
                format!("Model '{}' is not available", name),
            ),
            ApiError::InferenceError(msg) => {
                tracing::error!("Inference error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Model inference failed".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::UnknownModel(name) => ApiError::ModelNotFound(name),
            InferenceError::FeatureCount { .. } => ApiError::ValidationError(err.to_string()),
            InferenceError::Session(e) => ApiError::InferenceError(e.to_string()),
        }
    }
}

impl From<DecisionError> for ApiError {
    // The engine supplies parallel scores and labels, so a shape error
    // here means an internal invariant broke, not a bad request
    fn from(err: DecisionError) -> Self {
        ApiError::InternalError(err.to_string())
    }
}
