//! HTTP server: routes, static files, and startup.
//!
//! Starts an axum server with:
//! - `GET /api/medicine?name=` - multi-strategy openFDA label lookup
//! - `GET /api/suggestions?q=` - autocomplete over a fixed medicine list
//! - `GET /health` - liveness with a UTC timestamp
//! - `GET /` and any other path - files from the public directory, else a JSON 404

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use axum::handler::HandlerWithoutStateExt;
use axum::routing::{get, get_service};
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::ServerConfig;
use crate::entities::medicine::MedicineLookup;
use crate::sources::openfda::OpenFdaClient;

mod error;
mod handlers;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    pub lookup: Arc<MedicineLookup>,
}

/// Builds the application router.
pub fn router(state: AppState, public_dir: &Path) -> Router {
    let static_files = ServeDir::new(public_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(error::endpoint_not_found.into_service());
    let landing_page = get_service(ServeFile::new(public_dir.join("index.html")));

    // Wrong-method requests on known paths are answered like unknown routes.
    Router::new()
        .route(
            "/api/medicine",
            get(handlers::medicine).fallback(error::endpoint_not_found),
        )
        .route(
            "/api/suggestions",
            get(handlers::suggestions).fallback(error::endpoint_not_found),
        )
        .route(
            "/health",
            get(handlers::health).fallback(error::endpoint_not_found),
        )
        .route("/", landing_page.fallback(error::endpoint_not_found))
        .fallback_service(static_files)
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the openFDA client off the async runtime and marks the lookup ready.
///
/// Requests that arrive before this finishes are answered with 503.
fn spawn_upstream_init(lookup: Arc<MedicineLookup>, request_timeout: Duration) {
    tokio::spawn(async move {
        match tokio::task::spawn_blocking(move || OpenFdaClient::new(request_timeout)).await {
            Ok(Ok(client)) => {
                lookup.install(Arc::new(client));
                info!("Upstream openFDA client ready");
            }
            Ok(Err(err)) => error!(error = %err, "Failed to initialize upstream client"),
            Err(err) => error!(error = %err, "Upstream client initialization task failed"),
        }
    });
}

/// Runs the HTTP server until Ctrl-C.
///
/// # Errors
///
/// Returns an error when the listener cannot bind or the server fails while running.
pub async fn run(config: ServerConfig) -> anyhow::Result<()> {
    let lookup = Arc::new(MedicineLookup::new());
    spawn_upstream_init(lookup.clone(), config.upstream_timeout);

    let app = router(AppState { lookup }, &config.public_dir);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind HTTP server on {addr}"))?;
    let local = listener.local_addr()?;

    info!("OpenClinic server running on http://{local}");
    info!("Health check available at http://{local}/health");

    let shutdown = CancellationToken::new();
    let cancel = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;
    info!("Shutting down…");
    Ok(())
}
