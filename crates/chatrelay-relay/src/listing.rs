use std::sync::Arc;

use chatrelay_persist::SessionStore;

use crate::error::{require, RelayError, Result};
use crate::types::ChatPage;

/// Fixed listing page size
pub const PAGE_SIZE: u64 = 10;

/// Paginated listing, rename and delete over a user's sessions
pub struct ChatListing {
    store: Arc<dyn SessionStore>,
}

impl ChatListing {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// One page of sessions, newest-updated first.
    ///
    /// `offset` arrives signed from callers; negatives are rejected.
    pub async fn list_chats(&self, user_id: &str, offset: i64) -> Result<ChatPage> {
        let user_id = require(user_id, "userId")?;
        let offset = u64::try_from(offset).map_err(|_| {
            RelayError::InvalidRequest("offset must be a non-negative integer".to_string())
        })?;

        let chats = self.store.list_sessions(user_id, offset, PAGE_SIZE).await?;
        let next_offset = offset + chats.len() as u64;
        Ok(ChatPage { chats, next_offset })
    }

    /// Set a user-chosen title; later suggested titles never replace it
    pub async fn rename_chat(&self, user_id: &str, session_id: &str, title: &str) -> Result<String> {
        let user_id = require(user_id, "userId")?;
        let session_id = require(session_id, "sessionId")?;
        let title = require(title, "title")?;

        self.store.rename_session(user_id, session_id, title).await?;
        tracing::debug!(user_id, session_id, "Session renamed");
        Ok(title.to_string())
    }

    pub async fn delete_chat(&self, user_id: &str, session_id: &str) -> Result<String> {
        let user_id = require(user_id, "userId")?;
        let session_id = require(session_id, "sessionId")?;

        self.store.delete_session(user_id, session_id).await?;
        tracing::info!(user_id, session_id, "Session deleted");
        Ok(session_id.to_string())
    }

    pub async fn store_reachable(&self) -> bool {
        self.store.ping().await.is_ok()
    }
}
