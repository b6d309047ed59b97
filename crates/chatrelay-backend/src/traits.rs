use async_trait::async_trait;

use crate::error::Result;
use crate::types::{GenerationReply, GenerationRequest, LookupEntry, LookupRequest};

/// Text-generation backend: turns a prompt into a reply plus optional metadata
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate a reply. Errors are already classified as unavailable or failed.
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationReply>;

    /// Pre-flight check; `Err(Unavailable)` means requests should not be accepted
    async fn check_health(&self) -> Result<()>;
}

/// Best-effort resolver from reference names to URLs
#[async_trait]
pub trait ResourceLookup: Send + Sync {
    /// Resolve names; unresolved names come back with a null URL
    async fn lookup(&self, request: &LookupRequest) -> Result<Vec<LookupEntry>>;
}
