//! RBAC views for admins: the tables as data, plus "why was this allowed or
//! denied?" explanations. Every handler is wrapped in an ADMIN role check.

use axum::{
    extract::{Extension, OriginalUri, Path, Query},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use lumina_auth::{explain_feature, explain_permission, FeatureFlag, Permission, RbacRegistry, Role};

use crate::app::errors;
use crate::context::RequestSession;
use crate::guards::{with_role, HandlerError};
use crate::middleware::AuthState;

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub role: String,
    pub permission: Option<String>,
    pub feature: Option<String>,
    #[serde(rename = "override")]
    pub override_value: Option<bool>,
}

pub fn router() -> Router {
    Router::new()
        .route("/roles", get(list_roles))
        .route("/roles/:name", get(get_role))
        .route("/permissions", get(list_permissions))
        .route("/features", get(feature_matrix))
        .route("/explain", get(explain))
}

/// GET /api/admin/rbac/roles - every role with its permissions and features
pub async fn list_roles(
    Extension(state): Extension<AuthState>,
    Extension(session): Extension<RequestSession>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let registry = RbacRegistry::from_policy(state.guard.policy());
    with_role(&state, &session, uri.path(), Role::Admin, |_| async move {
        let roles: Vec<_> = registry.roles.into_values().collect();
        Ok::<_, HandlerError>(Json(json!({ "roles": roles })))
    })
    .await
}

/// GET /api/admin/rbac/roles/:name
pub async fn get_role(
    Extension(state): Extension<AuthState>,
    Extension(session): Extension<RequestSession>,
    OriginalUri(uri): OriginalUri,
    Path(name): Path<String>,
) -> Response {
    let registry = RbacRegistry::from_policy(state.guard.policy());
    with_role(&state, &session, uri.path(), Role::Admin, |_| async move {
        let found = Role::parse(&name).and_then(|role| registry.roles.get(&role).cloned());
        Ok::<_, HandlerError>(match found {
            Some(role) => Json(json!({ "role": role })).into_response(),
            None => errors::not_found("role not found"),
        })
    })
    .await
}

/// GET /api/admin/rbac/permissions
pub async fn list_permissions(
    Extension(state): Extension<AuthState>,
    Extension(session): Extension<RequestSession>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let registry = RbacRegistry::from_policy(state.guard.policy());
    with_role(&state, &session, uri.path(), Role::Admin, |_| async move {
        let permissions: Vec<_> = registry.permissions.into_values().collect();
        Ok::<_, HandlerError>(Json(json!({ "permissions": permissions })))
    })
    .await
}

/// GET /api/admin/rbac/features - role × feature matrix
pub async fn feature_matrix(
    Extension(state): Extension<AuthState>,
    Extension(session): Extension<RequestSession>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    let policy = state.guard.policy();
    with_role(&state, &session, uri.path(), Role::Admin, |_| async move {
        Ok::<_, HandlerError>(Json(json!({
            "features": policy.get_all_features(),
            "matrix": policy.get_feature_matrix(),
        })))
    })
    .await
}

/// GET /api/admin/rbac/explain?role=R&permission=P
/// GET /api/admin/rbac/explain?role=R&feature=F[&override=true|false]
pub async fn explain(
    Extension(state): Extension<AuthState>,
    Extension(session): Extension<RequestSession>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<ExplainQuery>,
) -> Response {
    let policy = state.guard.policy();
    with_role(&state, &session, uri.path(), Role::Admin, |_| async move {
        let Some(role) = Role::parse(&query.role) else {
            return Ok::<_, HandlerError>(errors::bad_request(format!(
                "unknown role '{}'",
                query.role
            )));
        };

        let explanation = match (&query.permission, &query.feature) {
            (Some(p), None) => match Permission::parse(p) {
                Some(permission) => explain_permission(policy, role, permission),
                None => return Ok(errors::bad_request(format!("unknown permission '{p}'"))),
            },
            (None, Some(f)) => match FeatureFlag::parse(f) {
                Some(feature) => explain_feature(policy, role, feature, query.override_value),
                None => return Ok(errors::bad_request(format!("unknown feature '{f}'"))),
            },
            _ => {
                return Ok(errors::bad_request(
                    "exactly one of 'permission' or 'feature' is required",
                ));
            }
        };

        Ok(Json(json!({ "explanation": explanation })).into_response())
    })
    .await
}
