mod config;
mod dialogue;
mod errors;
mod extraction;
mod llm_client;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::dialogue::{SessionStore, StageController};
use crate::extraction::{DocumentExtractor, OcrEngine, TesseractOcr};
use crate::llm_client::{LlmClient, ModelClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first; a missing model credential aborts startup
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting career coach API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(&config).context("failed to build model HTTP client")?;
    info!(
        "LLM client initialized (model: {}, endpoint: {})",
        llm.model_name(),
        config.model_base_url
    );

    if config.model_startup_probe {
        llm.probe()
            .await
            .context("model endpoint rejected the startup probe; check DEEPSEEK_API_KEY and MODEL_BASE_URL")?;
        info!("Model endpoint reachable");
    } else {
        warn!("MODEL_STARTUP_PROBE disabled; credentials are checked on first use");
    }

    // Session store lives for the process and is dropped on shutdown
    let store = Arc::new(SessionStore::new());
    let controller = Arc::new(StageController::new(
        store.clone(),
        Arc::new(llm),
        Duration::from_secs(config.model_timeout_secs),
    ));

    // Document-to-text with optional OCR fallback
    let ocr: Option<Arc<dyn OcrEngine>> = if config.ocr_enabled {
        info!("OCR fallback enabled (languages: {})", config.ocr_languages);
        Some(Arc::new(TesseractOcr::new(config.ocr_languages.clone())))
    } else {
        None
    };

    let state = AppState {
        controller,
        documents: DocumentExtractor::new(ocr),
    };

    // Build router
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let live = store.len().await;
    store.clear().await;
    info!("Shutdown complete, discarded {live} session(s)");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {e}");
        // Without a signal handler, keep serving until the process is killed
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
