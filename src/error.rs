use crate::lead::LeadError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

/// Errors surfaced by request handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Lead(#[from] LeadError),
    #[error("lead submission is not configured")]
    LeadsDisabled,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Lead(LeadError::Validation { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Lead(LeadError::Transport(_) | LeadError::Upstream { .. }) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::LeadsDisabled => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Lead(LeadError::Encode(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
