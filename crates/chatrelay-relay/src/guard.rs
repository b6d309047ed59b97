use std::sync::Arc;

use chatrelay_backend::{BackendError, GenerationBackend, GenerationReply, GenerationRequest};

use crate::error::{RelayError, Result};
use crate::types::BackendStatus;

/// Fronts the generation backend and turns its failures into the
/// unavailable / failed split callers act on.
#[derive(Clone)]
pub struct AvailabilityGuard {
    backend: Arc<dyn GenerationBackend>,
}

impl AvailabilityGuard {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    /// Cheap reachability check run before a session is created.
    ///
    /// Only an unreachable backend blocks; a check that errors in some other
    /// way is logged and treated as reachable.
    pub async fn preflight(&self) -> Result<()> {
        match self.backend.check_health().await {
            Ok(()) => Ok(()),
            Err(BackendError::Unavailable(msg)) => {
                tracing::warn!(reason = %msg, "Generation backend failed pre-flight");
                Err(RelayError::BackendUnavailable(msg))
            }
            Err(BackendError::Failed(msg)) => {
                tracing::debug!(reason = %msg, "Pre-flight check inconclusive, proceeding");
                Ok(())
            }
        }
    }

    pub async fn status(&self) -> BackendStatus {
        match self.preflight().await {
            Ok(()) => BackendStatus::Available,
            Err(_) => BackendStatus::Unavailable,
        }
    }

    /// Forward one generation request, classifying any failure
    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply> {
        self.backend.generate(request).await.map_err(|err| {
            match &err {
                BackendError::Unavailable(msg) => tracing::warn!(
                    user_id = %request.user_id,
                    session_id = %request.session_id,
                    reason = %msg,
                    "Generation backend unavailable"
                ),
                BackendError::Failed(msg) => tracing::error!(
                    user_id = %request.user_id,
                    session_id = %request.session_id,
                    reason = %msg,
                    "Generation failed"
                ),
            }
            RelayError::from(err)
        })
    }
}
