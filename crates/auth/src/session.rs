//! Read-only view of sessions owned by the external session collaborator.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lumina_core::{SessionId, UserId};

use crate::Role;

/// A login session as the authorization core sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub email: Option<String>,
    /// Raw role claim; resolved against [`Role`] at check time.
    pub role: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: UserId, role: Option<Role>, expires_at: DateTime<Utc>) -> Self {
        Self {
            session_id: SessionId::new(),
            user_id,
            email: None,
            role: role.map(|r| r.as_str().to_string()),
            expires_at,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn role(&self) -> Option<Role> {
        self.role.as_deref().and_then(Role::parse)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStoreError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}

/// Lookup into the session collaborator's storage.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// `Ok(None)` when there is no such session; errors are reserved for the
    /// store itself failing. Stores may return expired sessions: the guard
    /// checks `expires_at` itself.
    async fn get(&self, session_id: SessionId) -> Result<Option<Session>, SessionStoreError>;
}

#[async_trait]
impl<S> SessionStore for Arc<S>
where
    S: SessionStore + ?Sized,
{
    async fn get(&self, session_id: SessionId) -> Result<Option<Session>, SessionStoreError> {
        (**self).get(session_id).await
    }
}

/// Resolves the session of the current request or render.
///
/// Never fails for "no session": that is `None`.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn get_session(&self) -> Option<Session>;
}

#[async_trait]
impl SessionProvider for Option<Session> {
    async fn get_session(&self) -> Option<Session> {
        self.clone()
    }
}

#[async_trait]
impl SessionProvider for Session {
    async fn get_session(&self) -> Option<Session> {
        Some(self.clone())
    }
}

/// In-memory session store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<SessionId, Session>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: Session) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(session.session_id, session);
        }
    }

    pub fn remove(&self, session_id: SessionId) -> Option<Session> {
        self.inner.write().ok()?.remove(&session_id)
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: SessionId) -> Result<Option<Session>, SessionStoreError> {
        let map = self
            .inner
            .read()
            .map_err(|_| SessionStoreError::Unavailable("lock poisoned".to_string()))?;

        Ok(map
            .get(&session_id)
            .filter(|s| !s.is_expired(Utc::now()))
            .cloned())
    }
}
