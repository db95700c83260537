//! Web surface: upload page, conversion endpoints and downloads.
//!
//! | Route | Purpose |
//! |-------|---------|
//! | `GET /` | upload page |
//! | `POST /convert` | convert uploads, render previews and download links |
//! | `POST /api/convert` | convert uploads, return a JSON [`crate::BatchReport`] |
//! | `POST /api/convert/{format}` | convert one upload, return it as an `md`/`txt` attachment |
//! | `GET /health` | liveness |
//!
//! Every request is self-contained: uploads are staged, converted and
//! removed within the request, and results are returned inline.

mod handlers;
mod page;

pub use handlers::*;

use crate::config::ReaderConfig;
use crate::convert::Orchestrator;
use crate::error::DocReaderError;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

/// State shared across handlers. Read-only after startup.
#[derive(Clone, Debug)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub config: Arc<ReaderConfig>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, config: ReaderConfig) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            config: Arc::new(config),
        }
    }

    /// Build the configured engine and wrap it with `config`.
    pub fn from_config(config: ReaderConfig) -> Result<Self, DocReaderError> {
        let orchestrator = Orchestrator::from_config(&config)?;
        Ok(Self::new(orchestrator, config))
    }
}

/// Build the router with every route and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/convert", post(convert_page))
        .route("/api/convert", post(convert_json))
        .route("/api/convert/{format}", post(convert_download))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve on an already bound listener until the future is dropped.
pub async fn serve(listener: TcpListener, state: AppState) -> Result<(), DocReaderError> {
    let addr = listener
        .local_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "<unknown>".to_string());
    axum::serve(listener, build_router(state))
        .await
        .map_err(|source| DocReaderError::Server { addr, source })
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn start_server(addr: &str, state: AppState) -> Result<(), DocReaderError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| DocReaderError::Server {
            addr: addr.to_string(),
            source,
        })?;
    info!(
        "Serving on http://{} (engine: {})",
        addr,
        state.orchestrator.engine().name()
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|source| DocReaderError::Server {
            addr: addr.to_string(),
            source,
        })
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        // No signal handler: run until killed.
        Err(_) => std::future::pending::<()>().await,
    }
}
