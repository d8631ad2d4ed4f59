//! Per-connection socket loop.
//!
//! Each connection gets an mpsc queue drained by a send pump; all server
//! messages are shared as `Arc` so broadcasts serialize once per receiver at
//! most. The inbound loop counts every frame against the rate limiter —
//! exceeding it is the only condition that closes a connection.

use crate::protocol::{ClientEnvelope, ErrorCode, ServerMessage};
use crate::server::GameServer;
use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Outbound queue depth per connection; beyond this, messages drop.
const OUTBOUND_QUEUE_CAPACITY: usize = 64;

/// Inbound frames beyond this size are rejected without parsing.
const MAX_FRAME_BYTES: usize = 64 * 1024;

pub(super) async fn handle_socket(socket: WebSocket, server: Arc<GameServer>, addr: SocketAddr) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Arc<ServerMessage>>(OUTBOUND_QUEUE_CAPACITY);

    let connection_id = server.register_connection(tx);
    tracing::info!(%connection_id, client_addr = %addr, "WebSocket connection established");

    // Send pump: drain the queue into the socket until either side closes.
    let send_task = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            let text = match serde_json::to_string(&*message) {
                Ok(text) => text,
                Err(err) => {
                    tracing::error!(error = %err, "Failed to serialize server message");
                    continue;
                }
            };
            if sender.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    });

    // Inbound loop.
    while let Some(message) = receiver.next().await {
        let message = match message {
            Ok(message) => message,
            Err(err) => {
                tracing::debug!(%connection_id, error = %err, "WebSocket error");
                break;
            }
        };

        match message {
            Message::Text(text) => {
                if let Err(exceeded) = server.rate_limiter.check_event(&connection_id).await {
                    tracing::warn!(%connection_id, client_addr = %addr, "Rate limit exceeded, closing connection");
                    server.try_send(
                        connection_id,
                        Arc::new(ServerMessage::Error {
                            message: exceeded.to_string(),
                            error_code: Some(ErrorCode::RateLimitExceeded),
                        }),
                    );
                    break;
                }

                if text.len() > MAX_FRAME_BYTES {
                    server.try_send(
                        connection_id,
                        Arc::new(ServerMessage::Error {
                            message: format!(
                                "Frame too large ({} bytes, max {MAX_FRAME_BYTES})",
                                text.len()
                            ),
                            error_code: Some(ErrorCode::InvalidInput),
                        }),
                    );
                    continue;
                }

                match serde_json::from_str::<ClientEnvelope>(&text) {
                    Ok(envelope) => {
                        let ack = server.dispatch(connection_id, envelope).await;
                        server.try_send(connection_id, ack);
                    }
                    Err(err) => {
                        tracing::debug!(%connection_id, error = %err, "Rejected malformed frame");
                        server.try_send(
                            connection_id,
                            Arc::new(ServerMessage::Error {
                                message: format!("Malformed event: {err}"),
                                error_code: Some(ErrorCode::InvalidInput),
                            }),
                        );
                    }
                }
            }
            Message::Close(_) => break,
            Message::Binary(_) | Message::Ping(_) | Message::Pong(_) => {}
        }
    }

    server.handle_disconnect(connection_id).await;
    tracing::info!(%connection_id, client_addr = %addr, "WebSocket connection closed");

    send_task.abort();
}
