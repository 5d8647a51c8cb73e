use std::sync::Arc;

use async_trait::async_trait;

use lumina_auth::{Session, SessionClaims, SessionProvider, SessionStore};

/// Session resolver for one request.
///
/// Holds the decoded token claims (already verified by the edge filter) and
/// fetches the authoritative session from the store on demand. A revoked or
/// expired session, or a store failure, resolves to "no session".
#[derive(Clone)]
pub struct RequestSession {
    claims: Option<SessionClaims>,
    sessions: Arc<dyn SessionStore>,
}

impl RequestSession {
    pub fn new(claims: Option<SessionClaims>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { claims, sessions }
    }

    pub fn claims(&self) -> Option<&SessionClaims> {
        self.claims.as_ref()
    }
}

#[async_trait]
impl SessionProvider for RequestSession {
    async fn get_session(&self) -> Option<Session> {
        let claims = self.claims.as_ref()?;

        match self.sessions.get(claims.sid).await {
            Ok(Some(session)) if session.user_id == claims.sub => Some(session),
            Ok(Some(_)) => {
                tracing::warn!(session_id = %claims.sid, "token subject does not own session");
                None
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, session_id = %claims.sid, "session lookup failed");
                None
            }
        }
    }
}
