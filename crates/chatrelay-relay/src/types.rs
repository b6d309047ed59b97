use std::time::Duration;

use chatrelay_backend::ResourceLink;
use chatrelay_persist::SessionSummary;
use serde::{Deserialize, Serialize};

/// Result of creating a session: only the identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedSession {
    pub session_id: String,
}

/// Everything a caller gets back from one message turn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageOutcome {
    pub response: String,
    pub title: String,
    pub urls: Vec<ResourceLink>,
    pub context: Option<String>,
    /// Set when the reply was generated but could not be saved
    pub warning: Option<String>,
}

/// One page of a user's session list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPage {
    pub chats: Vec<SessionSummary>,
    pub next_offset: u64,
}

/// Pre-flight view of the generation backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendStatus {
    Available,
    Unavailable,
}

/// Bounded re-attempts for saving a bot turn after a successful generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff: Duration) -> Self {
        Self { max_retries, backoff }
    }

    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Linear backoff before re-attempt `attempt` (1-based)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.backoff.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_millis(100))
    }
}
