//! Router wiring. `routes/` holds one file per area; `errors.rs` maps
//! failures to consistent JSON bodies.

use std::sync::Arc;

use axum::{Extension, Router};

use lumina_auth::{AuditDispatcher, Guard, Hs256JwtValidator, Policy, SessionStore};

use crate::config::ApiConfig;
use crate::middleware::{self, AuthState};

pub mod errors;
pub mod routes;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(config: &ApiConfig, sessions: Arc<dyn SessionStore>, audit: AuditDispatcher) -> Router {
    let guard = Guard::new(Arc::new(Policy::standard()), audit).with_redirects(config.redirects.clone());
    let auth_state = AuthState {
        jwt: Arc::new(Hs256JwtValidator::new(config.jwt_secret.as_bytes())),
        sessions,
        guard,
    };

    routes::router()
        .layer(axum::middleware::from_fn_with_state(
            auth_state.clone(),
            middleware::edge_filter,
        ))
        .layer(Extension(auth_state))
}
