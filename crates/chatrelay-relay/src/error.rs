use chatrelay_backend::BackendError;
use chatrelay_persist::PersistError;
use thiserror::Error;

/// Caller-visible failure taxonomy for every relay and listing operation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Generation backend unavailable: {0}")]
    BackendUnavailable(String),

    #[error("Generation failed: {0}")]
    GenerationFailure(String),

    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl RelayError {
    /// Whether the caller may resend the same request right away
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            RelayError::GenerationFailure(_) | RelayError::PersistenceFailure(_)
        )
    }
}

impl From<PersistError> for RelayError {
    fn from(error: PersistError) -> Self {
        match error {
            PersistError::SessionNotFound(id) => RelayError::NotFound(id),
            other => RelayError::PersistenceFailure(other.to_string()),
        }
    }
}

impl From<BackendError> for RelayError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Unavailable(msg) => RelayError::BackendUnavailable(msg),
            BackendError::Failed(msg) => RelayError::GenerationFailure(msg),
        }
    }
}

/// Reject missing or blank fields
pub(crate) fn require<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RelayError::InvalidRequest(format!("{} is required", field)));
    }
    Ok(trimmed)
}

pub type Result<T> = std::result::Result<T, RelayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persist_error_mapping() {
        let not_found: RelayError = PersistError::SessionNotFound("s1".into()).into();
        assert_eq!(not_found, RelayError::NotFound("s1".into()));

        let conflict: RelayError = PersistError::Conflict("s1".into()).into();
        assert!(matches!(conflict, RelayError::PersistenceFailure(_)));
    }

    #[test]
    fn test_backend_error_mapping() {
        let down: RelayError = BackendError::Unavailable("refused".into()).into();
        assert!(matches!(down, RelayError::BackendUnavailable(_)));
        assert!(!down.is_retryable());

        let failed: RelayError = BackendError::Failed("500".into()).into();
        assert!(matches!(failed, RelayError::GenerationFailure(_)));
        assert!(failed.is_retryable());
    }

    #[test]
    fn test_require() {
        assert_eq!(require("  abc ", "userId").unwrap(), "abc");
        assert_eq!(
            require("   ", "userId").unwrap_err(),
            RelayError::InvalidRequest("userId is required".into())
        );
    }
}
