use mongodb::bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

use crate::models::{Session, Sender, Turn, TurnCounts};

/// MongoDB-specific turn (timestamps stored as BSON dates so they sort natively)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoTurn {
    #[serde(default)]
    pub turn_id: String,
    pub sender: Sender,
    pub message: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

/// MongoDB-specific session document
///
/// All users share one collection; `user_id` is the partition key and is part
/// of every filter. `_id` is generated at insert and breaks `updated_at` ties
/// in listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSession {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub session_id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub user_titled: bool,
    #[serde(default)]
    pub conversation: Vec<MongoTurn>,
    #[serde(default)]
    pub turn_count: i64,
    #[serde(default)]
    pub bot_turn_count: i64,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

/// Projection returned by the atomic append
#[derive(Debug, Clone, Deserialize)]
pub struct MongoTurnCounts {
    pub turn_count: i64,
    #[serde(default)]
    pub bot_turn_count: i64,
}

impl From<MongoTurnCounts> for TurnCounts {
    fn from(counts: MongoTurnCounts) -> Self {
        Self {
            total: counts.turn_count.max(0) as u64,
            bot: counts.bot_turn_count.max(0) as u64,
        }
    }
}

/// Projection used by listings
#[derive(Debug, Clone, Deserialize)]
pub struct MongoSessionSummary {
    pub session_id: String,
    pub title: String,
}

// Conversions between database-agnostic and MongoDB-specific models

impl From<Session> for MongoSession {
    fn from(session: Session) -> Self {
        let counts = TurnCounts::of(&session.conversation);
        Self {
            id: ObjectId::new(),
            turn_count: counts.total as i64,
            bot_turn_count: counts.bot as i64,
            session_id: session.session_id,
            user_id: session.user_id,
            title: session.title,
            user_titled: session.user_titled,
            conversation: session.conversation.into_iter().map(Into::into).collect(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

impl From<MongoSession> for Session {
    fn from(session: MongoSession) -> Self {
        Self {
            session_id: session.session_id,
            user_id: session.user_id,
            title: session.title,
            user_titled: session.user_titled,
            conversation: session.conversation.into_iter().map(Into::into).collect(),
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

impl From<Turn> for MongoTurn {
    fn from(turn: Turn) -> Self {
        Self {
            turn_id: turn.turn_id,
            sender: turn.sender,
            message: turn.message,
            timestamp: turn.timestamp,
        }
    }
}

impl From<MongoTurn> for Turn {
    fn from(turn: MongoTurn) -> Self {
        Self {
            turn_id: turn.turn_id,
            sender: turn.sender,
            message: turn.message,
            timestamp: turn.timestamp,
        }
    }
}
