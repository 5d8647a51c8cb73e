use axum::{
    extract::{Extension, OriginalUri, Path},
    response::IntoResponse,
    Json,
};
use serde_json::json;

use lumina_auth::{AllowedRoles, FeatureFlag};

use crate::app::errors;
use crate::context::RequestSession;
use crate::guards::{with_role, HandlerError};
use crate::middleware::AuthState;

/// GET /api/features/:feature - 200 when the caller's role has the feature,
/// 403 naming feature and role otherwise.
pub async fn check_feature(
    Extension(state): Extension<AuthState>,
    Extension(session): Extension<RequestSession>,
    OriginalUri(uri): OriginalUri,
    Path(feature): Path<String>,
) -> axum::response::Response {
    let path = uri.path();
    let guard = &state.guard;
    with_role(&state, &session, path, AllowedRoles::any(), |session| async move {
        let Some(flag) = FeatureFlag::parse(&feature) else {
            return Ok::<_, HandlerError>(errors::not_found(format!("unknown feature '{feature}'")));
        };

        guard.require_feature(&session, flag, path)?;
        Ok(Json(json!({ "feature": flag, "enabled": true })).into_response())
    })
    .await
}
