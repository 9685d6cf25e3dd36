//! Cookie sessions and password digests.

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::orgs::model::UserId;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "console_session";

/// A live session.
#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Identity attached to authenticated requests.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub display_name: String,
}

/// Thread-safe session store.
#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a session for a user.
    pub fn create(&self, user_id: UserId, ttl_secs: u64, now: DateTime<Utc>) -> Session {
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id,
            created_at: now,
            expires_at: now + Duration::seconds(ttl_secs as i64),
        };
        self.sessions.insert(session.token.clone(), session.clone());
        session
    }

    /// Look up a session, dropping it if expired.
    pub fn get_valid(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let session = self.sessions.get(token).map(|r| r.value().clone())?;
        if session.expires_at <= now {
            self.sessions.remove(token);
            return None;
        }
        Some(session)
    }

    /// Remove a session (logout).
    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    /// Drop every expired session. Called opportunistically from login.
    pub fn purge_expired(&self, now: DateTime<Utc>) {
        self.sessions.retain(|_, s| s.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// Hex-encoded SHA-256 of a password.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    let mut out = String::with_capacity(64);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

/// Compare a password against a stored hex digest.
pub fn verify_password(password: &str, stored_digest: &str) -> bool {
    hash_password(password) == stored_digest.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_digest_round_trip() {
        let digest = hash_password("correct horse");
        assert_eq!(digest.len(), 64);
        assert!(verify_password("correct horse", &digest));
        assert!(verify_password("correct horse", &digest.to_uppercase()));
        assert!(!verify_password("wrong", &digest));
    }

    #[test]
    fn test_known_digest() {
        // sha256("admin")
        assert_eq!(
            hash_password("admin"),
            "8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918"
        );
    }

    #[test]
    fn test_session_lifecycle() {
        let store = SessionStore::new();
        let now = Utc::now();
        let session = store.create(7, 60, now);

        let found = store.get_valid(&session.token, now).unwrap();
        assert_eq!(found.user_id, 7);

        // Expired sessions vanish on lookup.
        let later = now + Duration::seconds(61);
        assert!(store.get_valid(&session.token, later).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_revoke() {
        let store = SessionStore::new();
        let now = Utc::now();
        let session = store.create(7, 60, now);
        assert!(store.revoke(&session.token));
        assert!(!store.revoke(&session.token));
        assert!(store.get_valid(&session.token, now).is_none());
    }

    #[test]
    fn test_purge_expired() {
        let store = SessionStore::new();
        let now = Utc::now();
        store.create(1, 10, now);
        store.create(2, 120, now);

        store.purge_expired(now + Duration::seconds(60));
        assert_eq!(store.len(), 1);
    }
}
