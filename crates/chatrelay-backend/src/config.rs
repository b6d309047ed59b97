use std::time::Duration;

use serde::{Deserialize, Serialize};

const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(2);
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for the generation backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationClientConfig {
    pub generation_url: String,
    /// Health-check target; falls back to `generation_url` when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_url: Option<String>,
    pub timeout: Duration,
    pub health_timeout: Duration,
}

impl GenerationClientConfig {
    pub fn new(generation_url: impl Into<String>) -> Self {
        Self {
            generation_url: generation_url.into(),
            health_url: None,
            timeout: DEFAULT_GENERATION_TIMEOUT,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
        }
    }

    pub fn with_health_url(mut self, url: impl Into<String>) -> Self {
        self.health_url = Some(url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn health_url(&self) -> &str {
        self.health_url.as_deref().unwrap_or(&self.generation_url)
    }
}

/// Connection settings for the resource-lookup service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupClientConfig {
    pub url: String,
    pub timeout: Duration,
}

impl LookupClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
