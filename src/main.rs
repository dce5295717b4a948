//! Gupshup AI - RTU study assistant backend
//!
//! HTTP API that turns a chat turn (message + persona + history) into a
//! persona-conditioned Gemini call, dispatches `save_note` / `find_note`
//! tool proposals against the local notes store, and returns the
//! synthesized reply.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod conversation;
mod core;
mod providers;
mod routes;
mod tools;

use config::Config;
use crate::core::{ChatEngine, NoteStore};
use providers::GeminiProvider;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ChatEngine>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gupshup_ai=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let data_dir = std::env::var("GUPSHUP_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./data"));

    let notes = Arc::new(
        NoteStore::new(&data_dir.join("gupshup.db"))
            .await
            .map_err(|e| anyhow::anyhow!("failed to initialize notes store: {e}"))?,
    );

    let provider = Arc::new(
        GeminiProvider::from_config(&config)
            .map_err(|e| anyhow::anyhow!("failed to configure Gemini provider: {e}"))?,
    );

    let engine = Arc::new(ChatEngine::new(config, provider, notes));

    let state = AppState { engine };

    let app = Router::new()
        .merge(routes::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    tracing::info!("Gupshup AI API running at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
