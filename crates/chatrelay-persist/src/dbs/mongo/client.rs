use std::time::Duration;

use mongodb::{Client, options::ClientOptions};
use async_trait::async_trait;

use crate::store::SessionStore;
use crate::models::{Session, SessionSummary, Sender, TurnCounts};
use crate::dbs::mongo::models::MongoSession;
use crate::dbs::mongo::repositories::MongoSessionRepository;
use crate::error::{Result, PersistError};

pub struct MongoSessionStore {
    session_repo: MongoSessionRepository,
}

impl MongoSessionStore {
    /// Connect to MongoDB, create the session indexes and return the store
    pub async fn connect(
        mongodb_uri: &str,
        database: &str,
        collection: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let mut options = ClientOptions::parse(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);

        let client = Client::with_options(options)
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let session_repo = MongoSessionRepository::new(client.database(database), collection);
        session_repo.ensure_indexes().await?;

        tracing::info!(database, collection, "MongoDB session store ready");

        Ok(Self { session_repo })
    }
}

#[async_trait]
impl SessionStore for MongoSessionStore {
    async fn create_session(&self, user_id: &str, session_id: &str, title: &str) -> Result<Session> {
        let session = Session::new(user_id, session_id, title);
        let document = MongoSession::from(session.clone());
        self.session_repo.insert_session(&document).await?;
        Ok(session)
    }

    async fn append_turn(
        &self,
        user_id: &str,
        session_id: &str,
        turn_id: &str,
        sender: Sender,
        message: &str,
    ) -> Result<TurnCounts> {
        self.session_repo.push_turn(user_id, session_id, turn_id, sender, message).await
    }

    async fn get_session(&self, user_id: &str, session_id: &str) -> Result<Session> {
        self.session_repo
            .find_session(user_id, session_id)
            .await?
            .map(Into::into)
            .ok_or_else(|| PersistError::SessionNotFound(session_id.to_string()))
    }

    async fn list_sessions(
        &self,
        user_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<SessionSummary>> {
        let summaries = self.session_repo.list_sessions(user_id, offset, limit).await?;
        Ok(summaries
            .into_iter()
            .map(|s| SessionSummary {
                session_id: s.session_id,
                title: s.title,
            })
            .collect())
    }

    async fn rename_session(&self, user_id: &str, session_id: &str, title: &str) -> Result<()> {
        self.session_repo.rename_session(user_id, session_id, title).await
    }

    async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<()> {
        self.session_repo.delete_session(user_id, session_id).await
    }

    async fn set_title_if_unlocked(&self, user_id: &str, session_id: &str, title: &str) -> Result<()> {
        self.session_repo.set_title_if_unlocked(user_id, session_id, title).await
    }

    async fn ping(&self) -> Result<()> {
        self.session_repo.ping().await
    }
}
