use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Sessions last a week from login, regardless of activity
pub const SESSION_LIFETIME_DAYS: i64 = 7;

/// Principal established by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub id: Uuid,
    pub identity: Identity,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session store unavailable: {0}")]
    Unavailable(String),
}

/// When a session issued at a given instant stops being valid
pub trait ExpiryPolicy: Send + Sync {
    fn expires_at(&self, issued_at: DateTime<Utc>) -> DateTime<Utc>;
}

/// Fixed lifetime measured from issuance; activity does not extend it
#[derive(Debug, Clone, Copy)]
pub struct FixedLifetime {
    pub lifetime: Duration,
}

impl Default for FixedLifetime {
    fn default() -> Self {
        Self {
            lifetime: Duration::days(SESSION_LIFETIME_DAYS),
        }
    }
}

impl ExpiryPolicy for FixedLifetime {
    fn expires_at(&self, issued_at: DateTime<Utc>) -> DateTime<Utc> {
        issued_at + self.lifetime
    }
}

/// Server-side session lookup, independent of where sessions live
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: Session) -> Result<(), SessionError>;

    async fn get(&self, id: Uuid) -> Result<Option<Session>, SessionError>;

    /// Returns whether a session was removed
    async fn remove(&self, id: Uuid) -> Result<bool, SessionError>;

    /// Drop sessions expired at `now`; returns how many
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionError>;
}

/// Issue a session for `identity` under `policy`
pub fn issue(identity: Identity, policy: &dyn ExpiryPolicy, now: DateTime<Utc>) -> Session {
    Session {
        id: Uuid::new_v4(),
        identity,
        issued_at: now,
        expires_at: policy.expires_at(now),
    }
}

#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: Session) -> Result<(), SessionError> {
        self.sessions.write().await.insert(session.id, session);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Session>, SessionError> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn remove(&self, id: Uuid) -> Result<bool, SessionError> {
        Ok(self.sessions.write().await.remove(&id).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        Ok(before - sessions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: "108".to_string(),
            name: "Priya Jha".to_string(),
            email: "priya@example.com".to_string(),
            picture: None,
        }
    }

    #[test]
    fn fixed_lifetime_is_seven_days_from_issue() {
        let now = Utc::now();
        let session = issue(identity(), &FixedLifetime::default(), now);
        assert_eq!(session.expires_at - session.issued_at, Duration::days(7));
        assert!(!session.is_expired(now + Duration::days(6)));
        assert!(session.is_expired(now + Duration::days(7)));
    }

    #[tokio::test]
    async fn memory_store_round_trip_and_remove() {
        let store = MemorySessionStore::new();
        let session = issue(identity(), &FixedLifetime::default(), Utc::now());
        store.insert(session.clone()).await.unwrap();

        assert_eq!(store.get(session.id).await.unwrap(), Some(session.clone()));
        assert!(store.remove(session.id).await.unwrap());
        assert!(!store.remove(session.id).await.unwrap());
        assert_eq!(store.get(session.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn purge_drops_only_expired_sessions() {
        let store = MemorySessionStore::new();
        let now = Utc::now();
        let short = FixedLifetime {
            lifetime: Duration::minutes(5),
        };
        let stale = issue(identity(), &short, now - Duration::hours(1));
        let fresh = issue(identity(), &FixedLifetime::default(), now);
        store.insert(stale.clone()).await.unwrap();
        store.insert(fresh.clone()).await.unwrap();

        assert_eq!(store.purge_expired(now).await.unwrap(), 1);
        assert!(store.get(stale.id).await.unwrap().is_none());
        assert!(store.get(fresh.id).await.unwrap().is_some());
    }
}
