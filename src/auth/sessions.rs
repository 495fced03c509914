use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use time::{Duration, OffsetDateTime};
use tracing::debug;

const TOKEN_LEN: usize = 48;

/// Authenticated identity bound to a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: i64,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl Session {
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

/// Token -> identity mapping behind the authentication gate.
///
/// `lookup` returning `Ok(None)` is the normal unauthenticated state; `Err`
/// means the backend itself failed.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create(&self, user_id: i64) -> anyhow::Result<String>;
    async fn lookup(&self, token: &str) -> anyhow::Result<Option<Session>>;
    async fn destroy(&self, token: &str) -> anyhow::Result<()>;
}

/// Process-local store. Expiry is checked on lookup, not swept.
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl MemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.lock().is_empty()
    }
}

fn mint_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, user_id: i64) -> anyhow::Result<String> {
        let created_at = OffsetDateTime::now_utc();
        let session = Session {
            user_id,
            created_at,
            expires_at: created_at + self.ttl,
        };

        let mut sessions = self.sessions.lock();
        let token = loop {
            let candidate = mint_token();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        sessions.insert(token.clone(), session);
        debug!(user_id, expires_at = %session.expires_at, "session created");
        Ok(token)
    }

    async fn lookup(&self, token: &str) -> anyhow::Result<Option<Session>> {
        let mut sessions = self.sessions.lock();
        let Some(session) = sessions.get(token).copied() else {
            return Ok(None);
        };
        if session.is_expired_at(OffsetDateTime::now_utc()) {
            sessions.remove(token);
            debug!(user_id = session.user_id, "expired session dropped");
            return Ok(None);
        }
        Ok(Some(session))
    }

    async fn destroy(&self, token: &str) -> anyhow::Result<()> {
        if let Some(session) = self.sessions.lock().remove(token) {
            debug!(user_id = session.user_id, "session destroyed");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn store() -> MemorySessionStore {
        MemorySessionStore::new(Duration::hours(6))
    }

    #[tokio::test]
    async fn create_then_lookup_returns_identity() {
        let store = store();
        let token = store.create(7).await.unwrap();
        assert_eq!(token.len(), TOKEN_LEN);

        let session = store.lookup(&token).await.unwrap().expect("session present");
        assert_eq!(session.user_id, 7);
        assert_eq!(session.expires_at - session.created_at, Duration::hours(6));
    }

    #[tokio::test]
    async fn unknown_token_is_absent_not_error() {
        let store = store();
        assert!(store.lookup("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn destroy_is_idempotent() {
        let store = store();
        let token = store.create(1).await.unwrap();
        store.destroy(&token).await.unwrap();
        store.destroy(&token).await.unwrap();
        store.destroy("never-existed").await.unwrap();
        assert!(store.lookup(&token).await.unwrap().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn expired_session_is_absent_and_collected() {
        let store = MemorySessionStore::new(Duration::ZERO);
        let token = store.create(3).await.unwrap();
        assert_eq!(store.len(), 1);
        assert!(store.lookup(&token).await.unwrap().is_none());
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn sessions_for_different_users_are_independent() {
        let store = Arc::new(store());
        let (a, b) = tokio::join!(
            {
                let store = store.clone();
                async move { store.create(1).await.unwrap() }
            },
            {
                let store = store.clone();
                async move { store.create(2).await.unwrap() }
            }
        );
        assert_ne!(a, b);

        store.destroy(&a).await.unwrap();
        assert!(store.lookup(&a).await.unwrap().is_none());
        assert_eq!(store.lookup(&b).await.unwrap().map(|s| s.user_id), Some(2));
    }
}
