use async_trait::async_trait;

use crate::models::{Session, SessionSummary, Sender, TurnCounts};
use crate::error::Result;

/// Per-user partitioned CRUD over chat sessions
///
/// Every operation is scoped by `user_id`; no implementation may read or
/// mutate a session that belongs to a different user.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create an empty session. Fails with `Conflict` if `session_id` exists for any user.
    async fn create_session(&self, user_id: &str, session_id: &str, title: &str) -> Result<Session>;

    /// Atomically append one turn and return the session's turn counts after the append.
    ///
    /// Idempotent per `turn_id`: if a turn with that id is already stored the
    /// conversation is left untouched and the current counts are returned.
    async fn append_turn(
        &self,
        user_id: &str,
        session_id: &str,
        turn_id: &str,
        sender: Sender,
        message: &str,
    ) -> Result<TurnCounts>;

    /// Get a session with its full conversation
    async fn get_session(&self, user_id: &str, session_id: &str) -> Result<Session>;

    /// List sessions newest-updated first; ties keep creation order
    async fn list_sessions(
        &self,
        user_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<SessionSummary>>;

    /// Set a user-chosen title and lock it against backend suggestions
    async fn rename_session(&self, user_id: &str, session_id: &str, title: &str) -> Result<()>;

    /// Hard delete
    async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<()>;

    /// Apply a suggested title unless the user already renamed the session.
    /// A locked or missing session is not an error.
    async fn set_title_if_unlocked(&self, user_id: &str, session_id: &str, title: &str) -> Result<()>;

    /// Cheap reachability check for health reporting
    async fn ping(&self) -> Result<()>;
}
