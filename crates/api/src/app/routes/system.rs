use axum::{
    extract::{Extension, OriginalUri},
    http::StatusCode,
    Json,
};
use serde_json::json;

use lumina_auth::AllowedRoles;

use crate::context::RequestSession;
use crate::guards::{with_role, HandlerError};
use crate::middleware::AuthState;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /api/me - the caller's session as the server sees it
pub async fn me(
    Extension(state): Extension<AuthState>,
    Extension(session): Extension<RequestSession>,
    OriginalUri(uri): OriginalUri,
) -> axum::response::Response {
    with_role(&state, &session, uri.path(), AllowedRoles::any(), |session| async move {
        Ok::<_, HandlerError>(Json(json!({
            "user_id": session.user_id,
            "session_id": session.session_id,
            "email": session.email,
            "role": session.role(),
            "expires_at": session.expires_at,
        })))
    })
    .await
}

/// GET /api/me/features - features enabled for the caller's role
pub async fn my_features(
    Extension(state): Extension<AuthState>,
    Extension(session): Extension<RequestSession>,
    OriginalUri(uri): OriginalUri,
) -> axum::response::Response {
    let policy = state.guard.policy();
    with_role(&state, &session, uri.path(), AllowedRoles::any(), |session| async move {
        let role = session.role();
        let features: Vec<&str> = role
            .map(|r| policy.get_enabled_features(r))
            .unwrap_or_default()
            .into_iter()
            .map(|f| f.as_str())
            .collect();
        Ok::<_, HandlerError>(Json(json!({
            "role": role,
            "features": features,
        })))
    })
    .await
}
