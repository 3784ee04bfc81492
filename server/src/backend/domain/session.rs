//! Authenticated parent sessions.
//!
//! A [`SessionContext`] is resolved from a bearer token at the edge and passed
//! explicitly into every parent-scoped operation. Sessions live in process memory
//! and end on logout, on expiry, or on restart.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

use super::errors::{DomainError, DomainResult};
use super::models::parent::Parent;

pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 12 * 60;

#[derive(Debug, Clone, PartialEq)]
pub struct SessionContext {
    pub token: String,
    pub parent_id: String,
    pub email: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionContext {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Process-wide session table keyed by token
#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionContext>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for a freshly authenticated parent
    pub fn open(&self, parent: &Parent, now: DateTime<Utc>) -> SessionContext {
        let context = SessionContext {
            token: Uuid::new_v4().simple().to_string(),
            parent_id: parent.id.clone(),
            email: parent.email.clone(),
            issued_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.insert(context.token.clone(), context.clone());
        info!("Opened session for parent {}", parent.id);
        context
    }

    /// Look up a live session. Expired sessions are dropped on the way.
    pub fn resolve(&self, token: &str, now: DateTime<Utc>) -> DomainResult<SessionContext> {
        {
            let sessions = self.sessions.read().unwrap_or_else(|e| e.into_inner());
            match sessions.get(token) {
                None => return Err(DomainError::Unauthenticated),
                Some(context) if !context.is_expired_at(now) => return Ok(context.clone()),
                Some(_) => {}
            }
        }

        self.close(token);
        debug!("Session expired");
        Err(DomainError::Unauthenticated)
    }

    /// End a session. Closing an unknown token is a no-op.
    pub fn close(&self, token: &str) -> bool {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        sessions.remove(token).is_some()
    }

    /// Drop every expired session, returning how many were removed
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(|e| e.into_inner());
        let before = sessions.len();
        sessions.retain(|_, context| !context.is_expired_at(now));
        before - sessions.len()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
    }
}
