use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chatrelay_relay::RelayError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Relay(#[from] RelayError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Relay(RelayError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            ApiError::Relay(RelayError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Relay(RelayError::BackendUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Relay(RelayError::GenerationFailure(_))
            | ApiError::Relay(RelayError::PersistenceFailure(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::BadRequest(_) => false,
            ApiError::Relay(e) => e.is_retryable(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retryable = self.is_retryable();

        let message = match self {
            ApiError::BadRequest(_)
            | ApiError::Relay(RelayError::InvalidRequest(_))
            | ApiError::Relay(RelayError::NotFound(_)) => self.to_string(),
            ApiError::Relay(RelayError::BackendUnavailable(ref e)) => {
                tracing::warn!("Generation backend unavailable: {}", e);
                "The chat service is temporarily unavailable, please try again later".to_string()
            }
            ApiError::Relay(RelayError::GenerationFailure(ref e)) => {
                tracing::error!("Generation error: {}", e);
                "Failed to generate a reply, please try again".to_string()
            }
            ApiError::Relay(RelayError::PersistenceFailure(ref e)) => {
                tracing::error!("Persistence error: {}", e);
                "Storage error, please try again".to_string()
            }
        };

        let body = Json(json!({
            "success": false,
            "error": message,
            "retryable": retryable,
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
