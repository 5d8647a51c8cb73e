//! Edge filter: the earliest enforcement point.
//!
//! Decodes the session token only (no session store round-trip) and applies
//! [`ROLE_REQUIREMENTS`](lumina_auth::ROLE_REQUIREMENTS) through the shared
//! [`decide`]. This is a fast path; handlers still go through the guards,
//! which consult the session store and remain the source of truth.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, Request},
    middleware::Next,
    response::Response,
};
use chrono::Utc;

use lumina_auth::{
    decide, required_roles, Guard, JwtValidator, RouteKind, SessionClaims, SessionStore, Subject,
};

use crate::app::errors;
use crate::context::RequestSession;

/// Cookie carrying the session token for browser requests.
pub const SESSION_COOKIE: &str = "lumina_session";

#[derive(Clone)]
pub struct AuthState {
    pub jwt: Arc<dyn JwtValidator>,
    pub sessions: Arc<dyn SessionStore>,
    pub guard: Guard,
}

pub async fn edge_filter(
    State(state): State<AuthState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let claims = decode_claims(&state, req.headers());
    let path = req.uri().path().to_string();

    if let Some(allowed) = required_roles(&path) {
        let subject = claims
            .as_ref()
            .map_or(Subject::Anonymous, SessionClaims::subject);
        let decision = decide(subject, &allowed);

        if !decision.is_allowed() {
            let raw_role = claims.as_ref().and_then(|c| c.role.as_deref());
            state.guard.audit_denial(&decision, raw_role, &path);

            let requested = req
                .uri()
                .path_and_query()
                .map_or(path.as_str(), |pq| pq.as_str());
            return match RouteKind::of(&path) {
                RouteKind::Api => match decision.to_error() {
                    Some(err) => errors::authorization_error(&err),
                    None => errors::internal_error(),
                },
                RouteKind::Page => match state.guard.redirect_for(&decision, requested) {
                    Some(redirect) => errors::redirect(&redirect),
                    None => errors::internal_error(),
                },
            };
        }
    }

    req.extensions_mut()
        .insert(RequestSession::new(claims, Arc::clone(&state.sessions)));

    next.run(req).await
}

fn decode_claims(state: &AuthState, headers: &HeaderMap) -> Option<SessionClaims> {
    let token = extract_bearer(headers).or_else(|| extract_cookie(headers, SESSION_COOKIE))?;

    match state.jwt.validate(token, Utc::now()) {
        Ok(claims) => Some(claims),
        Err(e) => {
            tracing::debug!(error = %e, "ignoring invalid session token");
            None
        }
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let header = header.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

fn extract_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(axum::http::header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, v)| *k == name && !v.is_empty())
        .map(|(_, v)| v)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn bearer_is_extracted() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(extract_bearer(&headers), Some("abc.def"));

        headers.insert("authorization", HeaderValue::from_static("Basic xyz"));
        assert_eq!(extract_bearer(&headers), None);

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "cookie",
            HeaderValue::from_static("theme=dark; lumina_session=tok123; cart=3"),
        );
        assert_eq!(extract_cookie(&headers, SESSION_COOKIE), Some("tok123"));
        assert_eq!(extract_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_value_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", HeaderValue::from_static("lumina_session="));
        assert_eq!(extract_cookie(&headers, SESSION_COOKIE), None);
    }
}
