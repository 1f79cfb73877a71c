mod config;
mod db;
mod errors;
mod extract;
mod insights;
mod llm_client;
mod models;
mod profile;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::llm_client::{LlmClients, Provider};
use crate::profile::store::{InMemoryProfileStore, PgProfileStore, ProfileStore};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Bloom API v{}", env!("CARGO_PKG_VERSION"));

    // Profile store
    let profiles: Arc<dyn ProfileStore> = match &config.database_url {
        Some(url) => {
            let pool = create_pool(url).await?;
            ensure_schema(&pool).await?;
            Arc::new(PgProfileStore::new(pool))
        }
        None => {
            warn!("DATABASE_URL not set; profiles are kept in memory and lost on restart");
            Arc::new(InMemoryProfileStore::default())
        }
    };

    // Generation providers
    let llm = LlmClients::from_config(&config)?;
    for provider in [Provider::Claude, Provider::Groq] {
        if llm.is_configured(provider) {
            info!("{provider} provider configured");
        } else {
            warn!("{provider} API key not set; requests to it will fail with 503");
        }
    }

    let state = AppState { profiles, llm };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed domain

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
