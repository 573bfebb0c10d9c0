//! HTTP status route served alongside the relay.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::sync::watch;

use crate::error::{DeliveryError, Result};
use crate::storage::count_lines;

pub const STATUS_PATH: &str = "/telegram-status";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    /// Lines currently in the outbound file
    pub pending_notifications: usize,
    pub timestamp: DateTime<Utc>,
}

struct StatusState {
    outbound_path: PathBuf,
}

/// Build the router: `GET /telegram-status`, everything else is a 404,
/// other methods on the status path included.
pub fn status_router(outbound_path: PathBuf) -> Router {
    let state = Arc::new(StatusState { outbound_path });

    Router::new()
        .route(STATUS_PATH, get(status).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
}

async fn status(State(state): State<Arc<StatusState>>) -> Response {
    match count_lines(&state.outbound_path) {
        Ok(pending) => Json(StatusResponse {
            status: "running".to_string(),
            pending_notifications: pending,
            timestamp: Utc::now(),
        })
        .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read outbound file");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Bind the status listener. Fails right away if the port is taken.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(addr)
        .await
        .map_err(|e| DeliveryError::Relay(format!("Failed to bind {}: {}", addr, e)))
}

/// Serve the status route on `addr` until `shutdown` flips to true.
pub async fn serve(addr: SocketAddr, outbound_path: PathBuf, shutdown: watch::Receiver<bool>) -> Result<()> {
    serve_on(bind(addr).await?, outbound_path, shutdown).await
}

/// Serve the status route on an already bound listener.
pub async fn serve_on(listener: TcpListener, outbound_path: PathBuf, mut shutdown: watch::Receiver<bool>) -> Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Relay status listening on http://{}{}", addr, STATUS_PATH);
    }

    axum::serve(listener, status_router(outbound_path))
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
        })
        .await?;
    Ok(())
}
