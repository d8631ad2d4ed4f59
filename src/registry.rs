//! Process-wide room registry: code→room map, connection reverse lookup, and
//! the periodic reaper.

use crate::config::ServerTimingConfig;
use crate::game::room::{GameConfig, Phase, Room};
use crate::game::GameError;
use crate::protocol::room_codes::{generate_host_token, generate_room_code};
use crate::protocol::{ConnectionId, RoomCode};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Attempts to find an unused code before giving up. Collisions are already
/// vanishingly rare at 31^5 codes.
const CODE_GENERATION_ATTEMPTS: usize = 10;

/// Rooms are reference-shared; all internal mutation happens under each
/// room's own mutex, which serializes event handlers and timer callbacks.
#[derive(Debug, Default)]
pub struct RoomRegistry {
    rooms: DashMap<RoomCode, Arc<Mutex<Room>>>,
    /// Reverse map for O(1) disconnect cleanup
    connections: DashMap<ConnectionId, RoomCode>,
}

impl RoomRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a room with a fresh unique code and host token.
    pub fn create(
        &self,
        host_name: &str,
        pack_id: &str,
        config: GameConfig,
        now_ms: i64,
    ) -> Result<(RoomCode, String, Arc<Mutex<Room>>), GameError> {
        for _ in 0..CODE_GENERATION_ATTEMPTS {
            let code = generate_room_code();
            if self.rooms.contains_key(&code) {
                continue;
            }
            let host_token = generate_host_token();
            let room = Room::new(
                code.clone(),
                host_name.to_string(),
                host_token.clone(),
                pack_id.to_string(),
                config,
                now_ms,
            );
            let handle = Arc::new(Mutex::new(room));
            self.rooms.insert(code.clone(), Arc::clone(&handle));
            tracing::info!(room_code = %code, host_name, pack_id, "Room created");
            return Ok((code, host_token, handle));
        }
        Err(GameError::InvalidInput(
            "Could not allocate a room code".to_string(),
        ))
    }

    #[must_use]
    pub fn get(&self, code: &str) -> Option<Arc<Mutex<Room>>> {
        let normalized = code.to_uppercase();
        self.rooms
            .get(&normalized)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn associate(&self, connection: ConnectionId, code: &str) {
        self.connections.insert(connection, code.to_uppercase());
    }

    #[must_use]
    pub fn room_code_for(&self, connection: ConnectionId) -> Option<RoomCode> {
        self.connections
            .get(&connection)
            .map(|entry| entry.value().clone())
    }

    /// Detach a connection from the reverse map, returning the room it was in.
    pub fn drop_connection(&self, connection: ConnectionId) -> Option<RoomCode> {
        self.connections
            .remove(&connection)
            .map(|(_, code)| code)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    /// Destroy a room: cancel its timers and clear every mapping. Timers that
    /// already fired find the room gone and no-op.
    pub async fn destroy(&self, code: &str, reason: &str) {
        let Some((code, handle)) = self.rooms.remove(code) else {
            return;
        };
        {
            let mut room = handle.lock().await;
            room.timers.cancel_all();
        }
        self.connections.retain(|_, mapped| *mapped != code);
        tracing::info!(room_code = %code, reason, "Room destroyed");
    }

    /// One reaper sweep. Destroys rooms that are ended-and-idle, idle too
    /// long, or connectionless too long. Returns how many were destroyed.
    pub async fn reap(&self, now_ms: i64, timing: &ServerTimingConfig) -> usize {
        #[allow(clippy::cast_possible_wrap)]
        let ended_ttl_ms = (timing.ended_room_ttl_secs * 1_000) as i64;
        #[allow(clippy::cast_possible_wrap)]
        let idle_ttl_ms = (timing.idle_room_timeout_secs * 1_000) as i64;
        #[allow(clippy::cast_possible_wrap)]
        let no_connection_ttl_ms = (timing.no_connection_ttl_secs * 1_000) as i64;

        // Snapshot handles first; locking rooms while iterating the shard
        // map would hold shard locks across await points.
        let handles: Vec<(RoomCode, Arc<Mutex<Room>>)> = self
            .rooms
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect();

        let mut destroyed = 0;
        for (code, handle) in handles {
            let reason = {
                let room = handle.lock().await;
                let idle_ms = now_ms - room.last_activity_at;
                if room.phase == Phase::Ended && idle_ms > ended_ttl_ms {
                    Some("ended")
                } else if idle_ms > idle_ttl_ms {
                    Some("idle")
                } else if !room.has_connections() && idle_ms > no_connection_ttl_ms {
                    Some("abandoned")
                } else {
                    None
                }
            };
            if let Some(reason) = reason {
                self.destroy(&code, reason).await;
                destroyed += 1;
            }
        }
        destroyed
    }
}
