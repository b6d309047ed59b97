use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Title every session starts with until a backend suggestion or a rename replaces it
pub const DEFAULT_TITLE: &str = "New Chat";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// One message in a session's ordered history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Caller-chosen id; appending the same id twice stores the turn once
    #[serde(default)]
    pub turn_id: String,
    pub sender: Sender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Database-agnostic session model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub title: String,
    /// Set once the user renames the session; backend titles are ignored afterwards
    pub user_titled: bool,
    pub conversation: Vec<Turn>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            user_id: user_id.into(),
            title: title.into(),
            user_titled: false,
            conversation: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Listing entry: just enough to render a session picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub title: String,
}

/// Turn totals reported by an append
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TurnCounts {
    pub total: u64,
    pub bot: u64,
}

impl TurnCounts {
    pub fn of(conversation: &[Turn]) -> Self {
        Self {
            total: conversation.len() as u64,
            bot: conversation.iter().filter(|t| t.sender == Sender::Bot).count() as u64,
        }
    }

    /// No reply has been stored yet, so the next one opens the conversation
    pub fn awaiting_first_reply(&self) -> bool {
        self.bot == 0
    }
}
