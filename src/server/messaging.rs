//! Snapshot and envelope fan-out.
//!
//! All sends are non-blocking: a slow consumer drops messages rather than
//! stalling the room. Clients treat any snapshot as authoritative, so a
//! dropped one is repaired by the next.

use super::GameServer;
use crate::game::room::Room;
use crate::protocol::{ConnectionId, HostRoomState, PublicRoomState, ServerMessage};
use std::sync::Arc;

impl GameServer {
    /// Queue one message for one connection. Drops silently if the
    /// connection is gone or its queue is full.
    pub(crate) fn try_send(&self, connection: ConnectionId, message: Arc<ServerMessage>) {
        if let Some(sender) = self.senders.get(&connection) {
            if let Err(err) = sender.try_send(message) {
                tracing::debug!(%connection, error = %err, "Dropped outbound message");
            }
        }
    }

    /// Broadcast to every connection in the room group (players, host,
    /// watchers).
    pub(crate) fn broadcast_room(&self, room: &Room, message: &Arc<ServerMessage>) {
        for connection in room.broadcast_connections() {
            self.try_send(connection, Arc::clone(message));
        }
    }

    /// Public snapshot to the room group, then the host-scoped snapshot to
    /// the host connection. Private envelopes are always sent after this.
    pub(crate) fn send_snapshots(&self, room: &Room, now_ms: i64) {
        let public = Arc::new(ServerMessage::RoomState(Box::new(
            PublicRoomState::snapshot(room, now_ms),
        )));
        self.broadcast_room(room, &public);

        if let Some(host) = room.host_connection {
            let host_state = Arc::new(ServerMessage::HostState(Box::new(HostRoomState::snapshot(
                room, now_ms,
            ))));
            self.try_send(host, host_state);
        }
    }

    /// Private envelope to one player's connection, if connected.
    pub(crate) fn send_to_player(&self, room: &Room, player_id: &str, message: ServerMessage) {
        if let Some(connection) = room.player(player_id).and_then(|p| p.connection_id) {
            self.try_send(connection, Arc::new(message));
        }
    }
}
