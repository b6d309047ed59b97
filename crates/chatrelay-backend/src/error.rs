use reqwest::StatusCode;
use thiserror::Error;

/// Outcome classification for a call to a remote backend
///
/// `Unavailable` means the backend could not be reached or said it is not
/// ready; callers must not retry it immediately. `Failed` means the backend
/// answered but the answer was unusable; resending the request is allowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    #[error("Backend unavailable: {0}")]
    Unavailable(String),

    #[error("Backend request failed: {0}")]
    Failed(String),
}

impl BackendError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, BackendError::Failed(_))
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, BackendError::Unavailable(_))
    }

    /// Classify a transport-level error from reqwest
    pub fn from_transport(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() {
            BackendError::Unavailable(error.to_string())
        } else if error.is_decode() {
            BackendError::Failed(format!("Malformed response body: {}", error))
        } else {
            BackendError::Failed(error.to_string())
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if status_means_unavailable(status) {
            BackendError::Unavailable(format!("{} - {}", status, body))
        } else {
            BackendError::Failed(format!("{} - {}", status, body))
        }
    }
}

/// Statuses that mean "nobody is serving this endpoint right now"
pub fn status_means_unavailable(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::NOT_FOUND
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

pub type Result<T> = std::result::Result<T, BackendError>;
