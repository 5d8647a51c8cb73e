use axum::{routing::get, Router};

pub mod features;
pub mod pages;
pub mod rbac;
pub mod system;

pub fn router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/api/me", get(system::me))
        .route("/api/me/features", get(system::my_features))
        .route("/api/features/:feature", get(features::check_feature))
        .nest("/api/admin/rbac", rbac::router())
        .nest("/dashboard", pages::router())
}
