mod config;
mod db;
mod engine;
mod errors;
mod ingestion;
mod llm_client;
mod models;
mod resume;
mod routes;
mod state;
mod store;

#[cfg(test)]
mod test_utils;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::engine::RetrievalChatEngineFactory;
use crate::ingestion::{IngestConfig, LocalFileService};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{MemoryNodeStore, NodeStore, PgNodeStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Node store: Postgres when configured, otherwise process memory
    let store: Arc<dyn NodeStore> = match &config.database_url {
        Some(url) => Arc::new(PgNodeStore::new(create_pool(url).await?)),
        None => {
            info!("DATABASE_URL not set, indexing uploads in memory");
            Arc::new(MemoryNodeStore::new())
        }
    };

    let llm = LlmClient::new(config.anthropic_api_key.clone(), config.llm_model.clone())?;
    info!("LLM client initialized (model: {})", llm.model());

    let file_service = Arc::new(LocalFileService::new(
        Arc::clone(&store),
        IngestConfig {
            upload_dir: config.upload_dir(),
            file_server_url_prefix: config.file_server_url_prefix.clone(),
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            max_upload_bytes: config.max_upload_bytes,
        },
    ));
    info!("Uploads stored in {}", config.upload_dir().display());

    let chat_engines = Arc::new(RetrievalChatEngineFactory::new(store, llm, config.top_k));

    let state = AppState {
        config: config.clone(),
        file_service,
        chat_engines,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
