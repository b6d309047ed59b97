use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{Session, SessionSummary, Sender, Turn, TurnCounts};
use crate::store::SessionStore;
use crate::error::{PersistError, Result};

type PartitionKey = (String, String);

struct StoredSession {
    session: Session,
    seq: u64,
}

#[derive(Default)]
struct MemoryState {
    sessions: HashMap<PartitionKey, StoredSession>,
    session_ids: HashSet<String>,
    next_seq: u64,
}

/// Process-local session store
///
/// Every mutation runs under the write lock, so appends to one session are
/// serialized in the order the lock is granted.
#[derive(Default)]
pub struct InMemorySessionStore {
    state: RwLock<MemoryState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(user_id: &str, session_id: &str) -> PartitionKey {
        (user_id.to_string(), session_id.to_string())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create_session(&self, user_id: &str, session_id: &str, title: &str) -> Result<Session> {
        let mut state = self.state.write().await;
        if !state.session_ids.insert(session_id.to_string()) {
            return Err(PersistError::Conflict(session_id.to_string()));
        }

        let session = Session::new(user_id, session_id, title);
        let seq = state.next_seq;
        state.next_seq += 1;
        state.sessions.insert(
            Self::key(user_id, session_id),
            StoredSession { session: session.clone(), seq },
        );
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
        let mut state = self.state.write().await;
        let stored = state
            .sessions
            .get_mut(&Self::key(user_id, session_id))
            .ok_or_else(|| PersistError::SessionNotFound(session_id.to_string()))?;

        let session = &mut stored.session;
        if !session.conversation.iter().any(|t| t.turn_id == turn_id) {
            let now = Utc::now();
            session.conversation.push(Turn {
                turn_id: turn_id.to_string(),
                sender,
                message: message.to_string(),
                timestamp: now,
            });
            session.updated_at = now;
        }
        Ok(TurnCounts::of(&session.conversation))
    }

    async fn get_session(&self, user_id: &str, session_id: &str) -> Result<Session> {
        let state = self.state.read().await;
        state
            .sessions
            .get(&Self::key(user_id, session_id))
            .map(|stored| stored.session.clone())
            .ok_or_else(|| PersistError::SessionNotFound(session_id.to_string()))
    }

    async fn list_sessions(
        &self,
        user_id: &str,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<SessionSummary>> {
        let state = self.state.read().await;
        let mut owned: Vec<&StoredSession> = state
            .sessions
            .values()
            .filter(|stored| stored.session.user_id == user_id)
            .collect();

        owned.sort_by(|a, b| {
            b.session
                .updated_at
                .cmp(&a.session.updated_at)
                .then(a.seq.cmp(&b.seq))
        });

        Ok(owned
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .map(|stored| SessionSummary {
                session_id: stored.session.session_id.clone(),
                title: stored.session.title.clone(),
            })
            .collect())
    }

    async fn rename_session(&self, user_id: &str, session_id: &str, title: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let stored = state
            .sessions
            .get_mut(&Self::key(user_id, session_id))
            .ok_or_else(|| PersistError::SessionNotFound(session_id.to_string()))?;

        stored.session.title = title.to_string();
        stored.session.user_titled = true;
        stored.session.updated_at = Utc::now();
        Ok(())
    }

    async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .sessions
            .remove(&Self::key(user_id, session_id))
            .ok_or_else(|| PersistError::SessionNotFound(session_id.to_string()))?;
        state.session_ids.remove(session_id);
        Ok(())
    }

    async fn set_title_if_unlocked(&self, user_id: &str, session_id: &str, title: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(stored) = state.sessions.get_mut(&Self::key(user_id, session_id)) {
            if !stored.session.user_titled {
                stored.session.title = title.to_string();
                stored.session.updated_at = Utc::now();
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DEFAULT_TITLE;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_create_and_get_session() {
        let store = InMemorySessionStore::new();
        let created = store.create_session("alice", "s1", DEFAULT_TITLE).await.unwrap();

        assert_eq!(created.title, DEFAULT_TITLE);
        assert!(!created.user_titled);
        assert!(created.conversation.is_empty());

        let fetched = store.get_session("alice", "s1").await.unwrap();
        assert_eq!(fetched.session_id, "s1");
        assert_eq!(fetched.user_id, "alice");
    }

    #[tokio::test]
    async fn test_session_id_is_globally_unique() {
        let store = InMemorySessionStore::new();
        store.create_session("alice", "s1", DEFAULT_TITLE).await.unwrap();

        let err = store.create_session("bob", "s1", DEFAULT_TITLE).await.unwrap_err();
        assert!(matches!(err, PersistError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_partition_isolation() {
        let store = InMemorySessionStore::new();
        store.create_session("alice", "s1", DEFAULT_TITLE).await.unwrap();

        assert!(store.get_session("bob", "s1").await.unwrap_err().is_not_found());
        assert!(store.append_turn("bob", "s1", "t1", Sender::User, "hi").await.unwrap_err().is_not_found());
        assert!(store.rename_session("bob", "s1", "mine").await.unwrap_err().is_not_found());
        assert!(store.delete_session("bob", "s1").await.unwrap_err().is_not_found());
        assert!(store.list_sessions("bob", 0, 10).await.unwrap().is_empty());

        let untouched = store.get_session("alice", "s1").await.unwrap();
        assert_eq!(untouched.title, DEFAULT_TITLE);
    }

    #[tokio::test]
    async fn test_append_preserves_order_and_counts() {
        let store = InMemorySessionStore::new();
        store.create_session("alice", "s1", DEFAULT_TITLE).await.unwrap();

        let counts = store.append_turn("alice", "s1", "t1", Sender::User, "one").await.unwrap();
        assert_eq!(counts, TurnCounts { total: 1, bot: 0 });
        assert!(counts.awaiting_first_reply());

        let counts = store.append_turn("alice", "s1", "t2", Sender::Bot, "two").await.unwrap();
        assert_eq!(counts, TurnCounts { total: 2, bot: 1 });
        assert!(!counts.awaiting_first_reply());

        let session = store.get_session("alice", "s1").await.unwrap();
        let messages: Vec<&str> = session.conversation.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, vec!["one", "two"]);
        assert_eq!(session.conversation[1].sender, Sender::Bot);
        assert!(session.updated_at >= session.created_at);
    }

    #[tokio::test]
    async fn test_concurrent_appends_are_not_lost() {
        let store = Arc::new(InMemorySessionStore::new());
        store.create_session("alice", "s1", DEFAULT_TITLE).await.unwrap();

        let handles: Vec<_> = (0..50)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .append_turn("alice", "s1", &format!("t{}", i), Sender::User, &format!("m{}", i))
                        .await
                        .unwrap()
                        .total
                })
            })
            .collect();

        let mut counts = Vec::new();
        for handle in handles {
            counts.push(handle.await.unwrap());
        }
        counts.sort_unstable();
        assert_eq!(counts, (1..=50).collect::<Vec<u64>>());

        let session = store.get_session("alice", "s1").await.unwrap();
        assert_eq!(session.conversation.len(), 50);
    }

    #[tokio::test]
    async fn test_rename_locks_title() {
        let store = InMemorySessionStore::new();
        store.create_session("alice", "s1", DEFAULT_TITLE).await.unwrap();

        store.set_title_if_unlocked("alice", "s1", "Brake pads").await.unwrap();
        assert_eq!(store.get_session("alice", "s1").await.unwrap().title, "Brake pads");

        store.rename_session("alice", "s1", "My car").await.unwrap();
        store.set_title_if_unlocked("alice", "s1", "Something else").await.unwrap();

        let session = store.get_session("alice", "s1").await.unwrap();
        assert_eq!(session.title, "My car");
        assert!(session.user_titled);
    }

    #[tokio::test]
    async fn test_set_title_on_missing_session_is_ok() {
        let store = InMemorySessionStore::new();
        assert!(store.set_title_if_unlocked("alice", "ghost", "x").await.is_ok());
    }

    #[tokio::test]
    async fn test_list_newest_updated_first_with_paging() {
        let store = InMemorySessionStore::new();
        for i in 0..3 {
            store
                .create_session("alice", &format!("s{}", i), &format!("t{}", i))
                .await
                .unwrap();
        }
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        store.append_turn("alice", "s0", "t1", Sender::User, "bump").await.unwrap();

        let page = store.list_sessions("alice", 0, 10).await.unwrap();
        assert_eq!(page[0].session_id, "s0");
        assert_eq!(page.len(), 3);

        let second = store.list_sessions("alice", 1, 1).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_ne!(second[0].session_id, "s0");

        assert!(store.list_sessions("alice", 3, 10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_is_not_idempotent_success() {
        let store = InMemorySessionStore::new();
        store.create_session("alice", "s1", DEFAULT_TITLE).await.unwrap();

        store.delete_session("alice", "s1").await.unwrap();
        assert!(store.delete_session("alice", "s1").await.unwrap_err().is_not_found());
        assert!(store.get_session("alice", "s1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_repeated_turn_id_is_stored_once() {
        let store = InMemorySessionStore::new();
        store.create_session("alice", "s1", DEFAULT_TITLE).await.unwrap();
        store.append_turn("alice", "s1", "u1", Sender::User, "hi").await.unwrap();

        let first = store.append_turn("alice", "s1", "b1", Sender::Bot, "hello").await.unwrap();
        let again = store.append_turn("alice", "s1", "b1", Sender::Bot, "hello").await.unwrap();
        assert_eq!(first, again);
        assert_eq!(again, TurnCounts { total: 2, bot: 1 });

        let session = store.get_session("alice", "s1").await.unwrap();
        assert_eq!(session.conversation.len(), 2);
    }

    #[tokio::test]
    async fn test_list_ties_keep_creation_order() {
        let store = InMemorySessionStore::new();
        for id in ["c", "a", "b"] {
            store.create_session("alice", id, id).await.unwrap();
        }

        let same_instant = Utc::now();
        {
            let mut state = store.state.write().await;
            for stored in state.sessions.values_mut() {
                stored.session.updated_at = same_instant;
            }
        }

        let ids: Vec<String> = store
            .list_sessions("alice", 0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.session_id)
            .collect();
        assert_eq!(ids, vec!["c", "a", "b"]);

        let tail = store.list_sessions("alice", 1, 10).await.unwrap();
        assert_eq!(tail[0].session_id, "a");
    }
}
