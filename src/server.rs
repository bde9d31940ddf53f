//! HTTP Exposition Endpoint
//!
//! Serves the Prometheus registry while the daemon loop keeps it up to date.
//!
//! # Endpoints
//!
//! - `GET /` - HTML landing page with links to metrics and health
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /health` - Health check (200 if the last cycle published any report, 503 otherwise)
//!
//! The server runs in its own task and only reads shared state; the prometheus
//! registry synchronizes concurrent reads with the collector's writes.

use crate::config::ServerConfig;
use crate::metrics::MetricsCollector;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub metrics: MetricsCollector,
    /// Whether the most recent collection cycle published at least one report
    pub healthy: Arc<AtomicBool>,
}

/// A running exposition endpoint
pub struct Exposition {
    local_addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl Exposition {
    /// Address the listener is bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop serving
    pub fn shutdown(self) {
        self.handle.abort();
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Bind the listener and start serving in a background task
pub async fn open(config: &ServerConfig, state: AppState) -> anyhow::Result<Exposition> {
    let addr = format!("{}:{}", config.addr, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    info!("Metrics server listening on {}", local_addr);
    info!("Metrics available at http://{}/metrics", local_addr);

    let app = router(state);
    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    Ok(Exposition { local_addr, handle })
}

async fn root_handler() -> impl IntoResponse {
    r#"<html>
<head><title>ZFS Exporter</title></head>
<body>
<h1>ZFS Prometheus Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
<p><a href="/health">Health</a></p>
</body>
</html>"#
}

async fn metrics_handler(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(metrics) => metrics.into_response(),
        Err(e) => {
            error!("Failed to render metrics: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                format!("Error rendering metrics: {}", e),
            )
                .into_response()
        }
    }
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    if state.healthy.load(Ordering::Relaxed) {
        (axum::http::StatusCode::OK, "OK")
    } else {
        (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "No ZFS report collected successfully",
        )
    }
}
