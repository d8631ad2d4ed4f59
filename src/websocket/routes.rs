//! Router construction and the minimal HTTP side endpoints.

use crate::server::GameServer;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::Json;
use serde_json::{json, Value};
use std::sync::Arc;

use super::handler::websocket_handler;

/// Create the Axum router with WebSocket support
pub fn create_router(cors_origins: &str) -> axum::Router<Arc<GameServer>> {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    // Parse CORS origins
    let cors = if cors_origins == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("No valid CORS origins configured, using permissive CORS");
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    axum::Router::new()
        .route("/ws", get(websocket_handler))
        .route("/health", get(health_check))
        .route("/lan-ip", get(lan_ip_handler))
        .route("/packs", get(packs_handler))
        .route("/packs/reload", post(packs_reload_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// LAN address discovery, so the host screen can show a joinable URL.
async fn lan_ip_handler(State(server): State<Arc<GameServer>>) -> Json<Value> {
    let ip = local_lan_ip().unwrap_or_else(|| "127.0.0.1".to_string());
    Json(json!({
        "ip": ip,
        "port": server.config().port,
    }))
}

/// Routable local address via the UDP-connect trick; no packet is sent.
fn local_lan_ip() -> Option<String> {
    let socket = std::net::UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip().to_string())
}

/// List loaded question packs.
async fn packs_handler(State(server): State<Arc<GameServer>>) -> Json<Value> {
    Json(json!({ "packs": server.catalog().pack_summaries() }))
}

/// Dev-only: re-read the pack directory in place.
async fn packs_reload_handler(
    State(server): State<Arc<GameServer>>,
) -> Result<Json<Value>, StatusCode> {
    if !server.config().dev_mode {
        return Err(StatusCode::NOT_FOUND);
    }
    match server.catalog().reload() {
        Ok(count) => Ok(Json(json!({ "reloaded": count }))),
        Err(err) => {
            tracing::error!(error = %err, "Pack reload failed");
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
