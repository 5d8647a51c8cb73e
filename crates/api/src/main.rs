use std::sync::Arc;

use lumina_api::config::ApiConfig;
use lumina_auth::{AuditDispatcher, InMemorySessionStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    lumina_observability::init();

    let config = ApiConfig::from_env()?;

    // Sessions are owned by the external auth collaborator; the in-memory store
    // stands in until one is wired up.
    let sessions = Arc::new(InMemorySessionStore::new());
    let app = lumina_api::app::build_app(&config, sessions, AuditDispatcher::tracing());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
