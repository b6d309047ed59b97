use mongodb::{Collection, Database, IndexModel, bson, bson::doc, bson::Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{IndexOptions, ReturnDocument};
use futures::TryStreamExt;
use chrono::Utc;

use crate::dbs::mongo::models::{MongoSession, MongoSessionSummary, MongoTurn, MongoTurnCounts};
use crate::models::{Sender, TurnCounts};
use crate::error::{PersistError, Result};

const DUPLICATE_KEY: i32 = 11000;

#[derive(Clone)]
pub struct MongoSessionRepository {
    database: Database,
    collection: Collection<MongoSession>,
}

impl MongoSessionRepository {
    pub fn new(database: Database, collection_name: &str) -> Self {
        let collection = database.collection(collection_name);
        Self { database, collection }
    }

    fn partition_filter(user_id: &str, session_id: &str) -> Document {
        doc! { "user_id": user_id, "session_id": session_id }
    }

    fn counts_projection() -> Document {
        doc! { "_id": 0, "turn_count": 1, "bot_turn_count": 1 }
    }

    /// Create the global-uniqueness, partition and listing indexes
    pub async fn ensure_indexes(&self) -> Result<()> {
        let unique = || IndexOptions::builder().unique(true).build();
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "session_id": 1 })
                .options(unique())
                .build(),
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "session_id": 1 })
                .options(unique())
                .build(),
            IndexModel::builder()
                .keys(doc! { "user_id": 1, "updated_at": -1, "_id": 1 })
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        Ok(())
    }

    /// Insert a new session document
    pub async fn insert_session(&self, session: &MongoSession) -> Result<()> {
        match self.collection.insert_one(session).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(PersistError::Conflict(session.session_id.clone())),
            Err(e) => Err(e.into()),
        }
    }

    /// Push one turn, bump the counters and touch `updated_at` in a single update.
    ///
    /// The push only matches while no stored turn carries `turn_id`, so a
    /// re-sent write whose first attempt already landed is a no-op.
    pub async fn push_turn(
        &self,
        user_id: &str,
        session_id: &str,
        turn_id: &str,
        sender: Sender,
        message: &str,
    ) -> Result<TurnCounts> {
        let now = Utc::now();
        let turn = MongoTurn {
            turn_id: turn_id.to_string(),
            sender,
            message: message.to_string(),
            timestamp: now,
        };
        let bot_increment: i64 = if sender == Sender::Bot { 1 } else { 0 };

        let mut filter = Self::partition_filter(user_id, session_id);
        filter.insert("conversation.turn_id", doc! { "$ne": turn_id });

        let update = doc! {
            "$push": { "conversation": bson::to_bson(&turn)? },
            "$inc": { "turn_count": 1_i64, "bot_turn_count": bot_increment },
            "$set": { "updated_at": bson::DateTime::from_chrono(now) },
        };

        let counts = self.collection.clone_with_type::<MongoTurnCounts>();
        let pushed = counts
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .projection(Self::counts_projection())
            .await?;

        if let Some(pushed) = pushed {
            return Ok(pushed.into());
        }

        // No match: either the session is gone or the turn is already stored
        counts
            .find_one(Self::partition_filter(user_id, session_id))
            .projection(Self::counts_projection())
            .await?
            .map(Into::into)
            .ok_or_else(|| PersistError::SessionNotFound(session_id.to_string()))
    }

    /// Get session by partition key
    pub async fn find_session(&self, user_id: &str, session_id: &str) -> Result<Option<MongoSession>> {
        Ok(self
            .collection
            .find_one(Self::partition_filter(user_id, session_id))
            .await?)
    }

    /// List a user's sessions, newest-updated first; ties fall back to insertion order of `_id`
    pub async fn list_sessions(
        &self,
        user_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<MongoSessionSummary>> {
        let summaries = self
            .collection
            .clone_with_type::<MongoSessionSummary>()
            .find(doc! { "user_id": user_id })
            .sort(doc! { "updated_at": -1, "_id": 1 })
            .projection(doc! { "_id": 0, "session_id": 1, "title": 1 })
            .skip(offset)
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?
            .try_collect()
            .await?;
        Ok(summaries)
    }

    /// Set a user-chosen title and lock it
    pub async fn rename_session(&self, user_id: &str, session_id: &str, title: &str) -> Result<()> {
        let update = doc! {
            "$set": {
                "title": title,
                "user_titled": true,
                "updated_at": bson::DateTime::now(),
            }
        };

        let result = self
            .collection
            .update_one(Self::partition_filter(user_id, session_id), update)
            .await?;

        if result.matched_count == 0 {
            return Err(PersistError::SessionNotFound(session_id.to_string()));
        }
        Ok(())
    }

    /// Apply a title only while `user_titled` is unset
    pub async fn set_title_if_unlocked(&self, user_id: &str, session_id: &str, title: &str) -> Result<()> {
        let mut filter = Self::partition_filter(user_id, session_id);
        filter.insert("user_titled", doc! { "$ne": true });

        let update = doc! {
            "$set": {
                "title": title,
                "updated_at": bson::DateTime::now(),
            }
        };

        self.collection.update_one(filter, update).await?;
        Ok(())
    }

    /// Delete session
    pub async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<()> {
        let result = self
            .collection
            .delete_one(Self::partition_filter(user_id, session_id))
            .await?;

        if result.deleted_count == 0 {
            return Err(PersistError::SessionNotFound(session_id.to_string()));
        }
        Ok(())
    }

    pub async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}

fn is_duplicate_key(error: &mongodb::error::Error) -> bool {
    match error.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}
