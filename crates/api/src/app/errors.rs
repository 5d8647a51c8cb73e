use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use lumina_auth::{AuthorizationError, DenialKind, Redirect};

pub fn json_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

fn denial_code(kind: DenialKind) -> &'static str {
    match kind {
        DenialKind::SessionMissing => "unauthorized",
        DenialKind::RoleMissing => "role_missing",
        DenialKind::RoleInsufficient => "forbidden",
        DenialKind::FeatureDisabled => "feature_disabled",
    }
}

pub fn authorization_error(err: &AuthorizationError) -> Response {
    let status = StatusCode::from_u16(err.status_code).unwrap_or(StatusCode::FORBIDDEN);
    let mut resp = json_error(status, denial_code(err.kind), err.message.clone());
    if err.is_unauthenticated() {
        resp.headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
    }
    resp
}

/// Generic 500; details stay in the logs.
pub fn internal_error() -> Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "internal_error",
        "internal server error",
    )
}

pub fn not_found(message: impl Into<String>) -> Response {
    json_error(StatusCode::NOT_FOUND, "not_found", message)
}

pub fn bad_request(message: impl Into<String>) -> Response {
    json_error(StatusCode::BAD_REQUEST, "bad_request", message)
}

/// 307 so the method is preserved when the browser comes back.
pub fn redirect(redirect: &Redirect) -> Response {
    (
        StatusCode::TEMPORARY_REDIRECT,
        [(header::LOCATION, redirect.location.clone())],
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_error_keeps_status() {
        let resp = authorization_error(&AuthorizationError::session_missing());
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let resp = authorization_error(&AuthorizationError::role_missing(&lumina_auth::Role::Admin.into()));
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert!(resp.headers().get(header::WWW_AUTHENTICATE).is_none());
    }

    #[test]
    fn redirect_sets_location() {
        let resp = redirect(&Redirect {
            location: "/login?callbackUrl=%2Fdashboard".to_string(),
            kind: DenialKind::SessionMissing,
        });
        assert_eq!(resp.status(), StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(
            resp.headers()[header::LOCATION],
            "/login?callbackUrl=%2Fdashboard"
        );
    }
}
