use std::sync::Arc;

use estate_manager_api::auth::TokenService;
use estate_manager_api::config;
use estate_manager_api::store::PgStore;
use estate_manager_api::{routes, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and the keys.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("starting Estate Manager API in {:?} mode", config.environment);

    let database_url = config
        .server
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
    let store = PgStore::connect(database_url)
        .await
        .map_err(|e| anyhow::anyhow!("failed to connect to the database: {e}"))?;

    // Key material is read once here; the services never touch the
    // environment again.
    let tokens = TokenService::new(&config.security)
        .map_err(|e| anyhow::anyhow!("authentication is misconfigured: {e}"))?;

    let state = AppState::new(Arc::new(store), tokens);
    let app = routes(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
