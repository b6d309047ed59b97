use std::sync::Arc;

use chatrelay_backend::{GenerationReply, GenerationRequest, LookupRequest, ResourceLink, ResourceLookup};
use chatrelay_persist::{PersistError, Sender, SessionStore, Turn, DEFAULT_TITLE};
use uuid::Uuid;

use crate::error::{require, RelayError, Result};
use crate::guard::AvailabilityGuard;
use crate::types::{CreatedSession, MessageOutcome, RetryPolicy};

/// Warning attached to a reply whose bot turn could not be saved
pub const UNSAVED_REPLY_WARNING: &str =
    "The reply was generated but could not be saved; chat history may be incomplete";

/// Drives one conversation turn: persist, generate, reconcile, enrich.
pub struct ConversationRelay {
    store: Arc<dyn SessionStore>,
    guard: AvailabilityGuard,
    lookup: Option<Arc<dyn ResourceLookup>>,
    retry: RetryPolicy,
}

impl ConversationRelay {
    pub fn new(
        store: Arc<dyn SessionStore>,
        guard: AvailabilityGuard,
        lookup: Option<Arc<dyn ResourceLookup>>,
        retry: RetryPolicy,
    ) -> Self {
        Self { store, guard, lookup, retry }
    }

    pub fn builder() -> crate::builder::RelayBuilder {
        crate::builder::RelayBuilder::new()
    }

    pub fn guard(&self) -> &AvailabilityGuard {
        &self.guard
    }

    /// Open a new session for `user_id`.
    ///
    /// `message` is accepted for the caller's convenience but is not sent
    /// anywhere; the first turn arrives through [`Self::add_message`].
    pub async fn create_session(&self, user_id: &str, _message: &str) -> Result<CreatedSession> {
        let user_id = require(user_id, "userId")?;

        // Nothing is persisted for a request the backend cannot serve
        self.guard.preflight().await?;

        let session_id = Uuid::new_v4().to_string();
        self.store
            .create_session(user_id, &session_id, DEFAULT_TITLE)
            .await
            .map_err(|err| {
                tracing::error!(user_id, session_id = %session_id, error = %err, "Failed to create session");
                RelayError::from(err)
            })?;

        tracing::info!(user_id, session_id = %session_id, "Session created");
        Ok(CreatedSession { session_id })
    }

    pub async fn add_message(&self, user_id: &str, session_id: &str, message: &str) -> Result<MessageOutcome> {
        let user_id = require(user_id, "userId")?;
        let session_id = require(session_id, "sessionId")?;
        if message.trim().is_empty() {
            return Err(RelayError::InvalidRequest("message is required".to_string()));
        }

        let user_turn_id = Uuid::new_v4().to_string();
        let counts = self
            .store
            .append_turn(user_id, session_id, &user_turn_id, Sender::User, message)
            .await
            .map_err(|err| {
                if !err.is_not_found() {
                    tracing::error!(user_id, session_id, error = %err, "Failed to persist user turn");
                }
                RelayError::from(err)
            })?;
        // A resend after a failed first attempt still opens the conversation
        let first_turn = counts.awaiting_first_reply();

        let request = GenerationRequest::new(message, user_id, session_id).first_turn(first_turn);
        let reply = self.guard.generate(&request).await?;

        let warning = self.persist_bot_turn(user_id, session_id, &reply.response).await;

        if first_turn {
            if let Some(suggested) = reply.suggested_title() {
                if let Err(err) = self.store.set_title_if_unlocked(user_id, session_id, suggested).await {
                    tracing::warn!(user_id, session_id, error = %err, "Failed to apply suggested title");
                }
            }
        }

        let title = self.current_title(user_id, session_id, first_turn, &reply).await;
        let urls = self.enrich(user_id, session_id, &reply).await;

        Ok(MessageOutcome {
            response: reply.response,
            title,
            urls,
            context: reply.context,
            warning,
        })
    }

    pub async fn get_history(&self, user_id: &str, session_id: &str) -> Result<Vec<Turn>> {
        let user_id = require(user_id, "userId")?;
        let session_id = require(session_id, "sessionId")?;

        let session = self.store.get_session(user_id, session_id).await?;
        Ok(session.conversation)
    }

    /// Save the bot turn, re-attempting per the retry policy.
    ///
    /// Every attempt carries the same turn id, so an attempt whose write
    /// landed but whose acknowledgement was lost is not stored twice.
    /// Returns a warning for the caller when every attempt failed.
    async fn persist_bot_turn(&self, user_id: &str, session_id: &str, text: &str) -> Option<String> {
        let turn_id = Uuid::new_v4().to_string();
        let mut attempt = 0;
        loop {
            let err = match self.store.append_turn(user_id, session_id, &turn_id, Sender::Bot, text).await {
                Ok(_) => return None,
                Err(err) => err,
            };

            // A session deleted mid-turn will not come back
            let give_up = matches!(err, PersistError::SessionNotFound(_)) || attempt >= self.retry.max_retries;
            if give_up {
                tracing::error!(
                    user_id,
                    session_id,
                    attempts = attempt + 1,
                    error = %err,
                    "Bot turn could not be persisted"
                );
                return Some(UNSAVED_REPLY_WARNING.to_string());
            }

            attempt += 1;
            tracing::warn!(user_id, session_id, attempt, error = %err, "Retrying bot turn persistence");
            tokio::time::sleep(self.retry.delay_for(attempt)).await;
        }
    }

    async fn current_title(
        &self,
        user_id: &str,
        session_id: &str,
        first_turn: bool,
        reply: &GenerationReply,
    ) -> String {
        match self.store.get_session(user_id, session_id).await {
            Ok(session) => session.title,
            Err(err) => {
                tracing::warn!(user_id, session_id, error = %err, "Could not read back session title");
                match reply.suggested_title() {
                    Some(title) if first_turn => title.to_string(),
                    _ => DEFAULT_TITLE.to_string(),
                }
            }
        }
    }

    /// Best-effort reference lookup; never fails the turn
    async fn enrich(&self, user_id: &str, session_id: &str, reply: &GenerationReply) -> Vec<ResourceLink> {
        let names = reply.reference_names();
        let lookup = match &self.lookup {
            Some(lookup) if !names.is_empty() => lookup,
            _ => return Vec::new(),
        };

        let request = LookupRequest {
            names: names.to_vec(),
            context: reply.context.clone(),
        };

        match lookup.lookup(&request).await {
            Ok(entries) => entries.into_iter().filter_map(|entry| entry.resolved()).collect(),
            Err(err) => {
                tracing::warn!(user_id, session_id, error = %err, "Resource lookup failed, returning no links");
                Vec::new()
            }
        }
    }
}
