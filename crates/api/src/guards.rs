//! Handler wrappers: run the API-side role check before the handler body and
//! map every failure to a well-formed JSON response.

use std::future::Future;

use axum::response::{IntoResponse, Response};
use thiserror::Error;

use lumina_auth::{AllowedRoles, AuthorizationError, Session};

use crate::app::errors;
use crate::context::RequestSession;
use crate::middleware::AuthState;

/// Failure returned from a wrapped handler body.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        match self {
            HandlerError::Authorization(err) => errors::authorization_error(&err),
            HandlerError::Internal(err) => {
                tracing::error!(error = ?err, "handler failed");
                errors::internal_error()
            }
        }
    }
}

/// Resolve the session, require one of `allowed`, then run `handler`.
///
/// The handler is never invoked for a denied caller.
pub async fn with_role<F, Fut, R>(
    state: &AuthState,
    session: &RequestSession,
    path: &str,
    allowed: impl Into<AllowedRoles>,
    handler: F,
) -> Response
where
    F: FnOnce(Session) -> Fut,
    Fut: Future<Output = Result<R, HandlerError>>,
    R: IntoResponse,
{
    let session = match state.guard.require_role(session, path, allowed).await {
        Ok(session) => session,
        Err(err) => return errors::authorization_error(&err),
    };

    match handler(session).await {
        Ok(body) => body.into_response(),
        Err(err) => err.into_response(),
    }
}

/// Page variant: denial becomes a redirect instead of a JSON error.
pub async fn with_page_role<F, Fut, R>(
    state: &AuthState,
    session: &RequestSession,
    requested_path: &str,
    allowed: impl Into<AllowedRoles>,
    render: F,
) -> Response
where
    F: FnOnce(Session) -> Fut,
    Fut: Future<Output = R>,
    R: IntoResponse,
{
    match state
        .guard
        .require_server_role(session, requested_path, allowed)
        .await
    {
        Ok(session) => render(session).await.into_response(),
        Err(redirect) => errors::redirect(&redirect),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use lumina_auth::{
        AuditDispatcher, Guard, Hs256JwtValidator, InMemorySessionStore, NoopAuditSink, Policy,
        Role, SessionClaims,
    };
    use lumina_core::UserId;

    use super::*;

    fn state(store: Arc<InMemorySessionStore>) -> AuthState {
        AuthState {
            jwt: Arc::new(Hs256JwtValidator::new("test-secret")),
            sessions: store,
            guard: Guard::new(
                Arc::new(Policy::standard()),
                AuditDispatcher::new(Arc::new(NoopAuditSink)),
            ),
        }
    }

    fn request_session(store: &Arc<InMemorySessionStore>, role: Role) -> RequestSession {
        let session = Session::new(UserId::new(), Some(role), Utc::now() + Duration::hours(1));
        store.insert(session.clone());
        let now = Utc::now();
        let claims = SessionClaims {
            sub: session.user_id,
            sid: session.session_id,
            role: session.role.clone(),
            issued_at: now,
            expires_at: now + Duration::minutes(5),
        };
        RequestSession::new(Some(claims), store.clone())
    }

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn denied_caller_never_reaches_handler() {
        let store = Arc::new(InMemorySessionStore::new());
        let state = state(store.clone());
        let rs = request_session(&store, Role::Customer);
        let flag = AtomicBool::new(false);
        let invoked = &flag;

        let resp = with_role(&state, &rs, "/api/admin/thing", Role::Admin, |_| async move {
            invoked.store(true, Ordering::SeqCst);
            Ok::<_, HandlerError>("secret")
        })
        .await;

        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(!flag.load(Ordering::SeqCst));
        let body = body_json(resp).await;
        assert_eq!(body["error"], "forbidden");
    }

    #[tokio::test]
    async fn anonymous_caller_gets_401() {
        let store = Arc::new(InMemorySessionStore::new());
        let state = state(store.clone());
        let rs = RequestSession::new(None, store);

        let resp = with_role(&state, &rs, "/api/me", AllowedRoles::any(), |_| async {
            Ok::<_, HandlerError>("hello")
        })
        .await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn handler_failure_is_generic_500() {
        let store = Arc::new(InMemorySessionStore::new());
        let state = state(store.clone());
        let rs = request_session(&store, Role::Admin);

        let resp = with_role(&state, &rs, "/api/admin/thing", Role::Admin, |_| async {
            Err::<&str, _>(HandlerError::from(anyhow::anyhow!("db exploded at 10.0.0.3")))
        })
        .await;

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(resp).await;
        assert_eq!(body["error"], "internal_error");
        assert!(!body["message"].as_str().unwrap().contains("10.0.0.3"));
    }

    #[tokio::test]
    async fn page_variant_redirects_wrong_role() {
        let store = Arc::new(InMemorySessionStore::new());
        let state = state(store.clone());
        let rs = request_session(&store, Role::Learner);

        let resp = with_page_role(&state, &rs, "/dashboard/writer", [Role::Admin, Role::Writer], |_| async {
            "page"
        })
        .await;
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(resp.headers()["location"], "/");
    }
}
