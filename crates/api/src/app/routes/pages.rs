//! Server-rendered dashboards. Denials redirect instead of returning errors.

use axum::{
    extract::{Extension, OriginalUri},
    http::Uri,
    response::{Html, Response},
    routing::get,
    Router,
};

use lumina_auth::AllowedRoles;

use crate::context::RequestSession;
use crate::guards::with_page_role;
use crate::middleware::AuthState;

use lumina_auth::Role::{Admin, Customer, Learner, Writer};

pub fn router() -> Router {
    Router::new()
        .route("/admin", get(admin_dashboard))
        .route("/writer", get(writer_dashboard))
        .route("/learner", get(learner_dashboard))
        .route("/customer", get(customer_dashboard))
}

pub async fn admin_dashboard(
    Extension(state): Extension<AuthState>,
    Extension(session): Extension<RequestSession>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    render_dashboard(&state, &session, &uri, "Admin", [Admin]).await
}

pub async fn writer_dashboard(
    Extension(state): Extension<AuthState>,
    Extension(session): Extension<RequestSession>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    render_dashboard(&state, &session, &uri, "Writer", [Admin, Writer]).await
}

pub async fn learner_dashboard(
    Extension(state): Extension<AuthState>,
    Extension(session): Extension<RequestSession>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    render_dashboard(&state, &session, &uri, "Learner", [Admin, Learner]).await
}

pub async fn customer_dashboard(
    Extension(state): Extension<AuthState>,
    Extension(session): Extension<RequestSession>,
    OriginalUri(uri): OriginalUri,
) -> Response {
    render_dashboard(&state, &session, &uri, "Customer", [Admin, Customer]).await
}

async fn render_dashboard(
    state: &AuthState,
    session: &RequestSession,
    uri: &Uri,
    title: &str,
    allowed: impl Into<AllowedRoles>,
) -> Response {
    let requested = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());

    with_page_role(state, session, requested, allowed, |session| async move {
        let role = session.role().map_or("(none)", |r| r.as_str());
        let admin_link = if session.role() == Some(Admin) {
            r#"<p><a href="/dashboard/admin">Admin dashboard</a></p>"#
        } else {
            ""
        };
        Html(format!(
            "<!doctype html><html><head><title>{title} dashboard</title></head>\
             <body><h1>{title} dashboard</h1><p>Signed in as {role}</p>{admin_link}</body></html>"
        ))
    })
    .await
}
