use std::sync::Arc;

use celeb_exchange::api::routes::{AppState, app_router};
use celeb_exchange::catalog::InstrumentCatalog;
use celeb_exchange::config::Config;
use celeb_exchange::session::SessionStore;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let catalog = Arc::new(InstrumentCatalog::seeded());
    tracing::info!(
        instruments = catalog.len(),
        sell_policy = ?config.sell_policy,
        "catalog loaded"
    );

    let app_state = AppState {
        catalog,
        sessions: SessionStore::new(config.sell_policy),
        jwt_secret: config.jwt_secret.clone(),
        session_ttl_hours: config.session_ttl_hours,
    };

    let app = app_router(app_state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}
