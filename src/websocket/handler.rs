use crate::server::GameServer;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use std::net::SocketAddr;
use std::sync::Arc;

use super::connection::handle_socket;

/// WebSocket handler for the game protocol
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(server): State<Arc<GameServer>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, server, addr))
}
