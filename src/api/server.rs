use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{Router, extract::DefaultBodyLimit, routing::get, routing::post};
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::decompression::RequestDecompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    services::{
        health, static_files, tool_version, upload_image, upload_with_sidecar, verify_image,
    },
    state::AppState,
};
use crate::config::Config;
use crate::storage::{REMOTE_MOUNT, SIGNED_MOUNT, VERIFY_MOUNT};
use crate::tool::C2paTool;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Build the application router over `state`.
///
/// Separate from [`run`] so tests can drive it with `oneshot`.
pub fn router(state: AppState) -> Router {
    let multipart_limit = state.config.server.max_multipart_bytes.as_usize();
    let signed = ServeDir::new(state.layout.signed_dir());
    let verify_uploads = ServeDir::new(state.layout.verify_dir());
    let remote = ServeDir::new(state.layout.remote_dir());

    Router::new()
        .route("/upload", post(upload_image))
        .route("/verify", post(verify_image))
        .route(
            "/upload-with-sidecar",
            post(upload_with_sidecar).layer(DefaultBodyLimit::max(multipart_limit)),
        )
        .route("/version", get(tool_version))
        .route("/health", get(health))
        .nest_service(SIGNED_MOUNT, signed)
        .nest_service(VERIFY_MOUNT, verify_uploads)
        .nest_service(REMOTE_MOUNT, remote)
        .fallback(static_files)
        .with_state(state)
        // Handles Content-Encoding on raw image uploads transparently
        .layer(RequestDecompressionLayer::new())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

pub async fn run(address: Option<SocketAddr>, config_path: Option<PathBuf>) -> Result<(), AnyError> {
    info!("Loading configuration");
    let config =
        Config::load(config_path).map_err(|e| format!("Failed to load config: {}", e))?;
    let address = address.unwrap_or(config.server.bind_addr);

    let tool = C2paTool::from_config(&config.tool);
    info!(
        program = %config.tool.program.display(),
        manifest = %config.tool.manifest_definition.display(),
        "Using provenance tool"
    );

    let state = AppState::new(config, Arc::new(tool));
    state
        .layout
        .ensure_dirs()
        .await
        .map_err(|e| format!("Failed to create storage directories: {}", e))?;

    let app = router(state);

    let listener = TcpListener::bind(address).await?;
    info!(%address, "C2PA demo server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
