//! Main server orchestration.
//!
//! [`GameServer`] owns the room registry, the question catalogue, the
//! per-connection outbound senders, and the rate limiter. Each room is a
//! serialized actor: every event handler and timer callback locks the room's
//! mutex first, so all state changes inside one room are linearizable.

mod messaging;
mod router;
mod timers;

use crate::catalog::Catalog;
use crate::config::{Config, GameDefaultsConfig, ServerTimingConfig};
use crate::game::room::GameConfig;
use crate::protocol::{ConnectionId, ServerMessage};
use crate::rate_limit::{ConnectionRateLimiter, RateLimitConfig};
use crate::registry::RoomRegistry;
use dashmap::DashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Current wall-clock in milliseconds. All room deadlines are anchored on
/// this scale.
#[must_use]
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub dev_mode: bool,
    pub game_defaults: GameConfig,
    pub timing: ServerTimingConfig,
    pub rate_limit: RateLimitConfig,
}

impl ServerConfig {
    #[must_use]
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            port: cfg.port,
            dev_mode: cfg.dev_mode,
            game_defaults: game_config_from(&cfg.game),
            timing: cfg.server.clone(),
            rate_limit: RateLimitConfig {
                window: Duration::from_millis(cfg.rate_limit.window_ms),
                max_events: cfg.rate_limit.max_events,
            },
        }
    }
}

fn game_config_from(defaults: &GameDefaultsConfig) -> GameConfig {
    GameConfig {
        max_lives: defaults.max_lives,
        countdown_ms: defaults.countdown_ms,
        starting_coins: defaults.starting_coins,
        buyback_cost_coins: defaults.buyback_cost_coins,
        boss_hp: defaults.boss_hp,
    }
}

pub struct GameServer {
    pub(crate) config: ServerConfig,
    pub(crate) registry: RoomRegistry,
    pub(crate) catalog: Catalog,
    /// Outbound channel per live connection
    pub(crate) senders: DashMap<ConnectionId, mpsc::Sender<Arc<ServerMessage>>>,
    pub(crate) rate_limiter: Arc<ConnectionRateLimiter>,
    /// Self-handle for timer tasks; timers that outlive the server no-op
    pub(crate) weak: Weak<GameServer>,
}

impl GameServer {
    #[must_use]
    pub fn new(config: ServerConfig, catalog: Catalog) -> Arc<Self> {
        let rate_limiter = Arc::new(ConnectionRateLimiter::new(config.rate_limit.clone()));
        Arc::clone(&rate_limiter).start_cleanup_task();
        Arc::new_cyclic(|weak| Self {
            config,
            registry: RoomRegistry::new(),
            catalog,
            senders: DashMap::new(),
            rate_limiter,
            weak: weak.clone(),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub fn room_count(&self) -> usize {
        self.registry.len()
    }

    /// Register a fresh connection and hand back its id.
    pub fn register_connection(
        &self,
        sender: mpsc::Sender<Arc<ServerMessage>>,
    ) -> ConnectionId {
        let connection_id = Uuid::new_v4();
        self.senders.insert(connection_id, sender);
        connection_id
    }

    /// Socket closed (or kicked): detach the connection everywhere. The
    /// player stays on the roster, flipped to disconnected; the room may
    /// still advance past them via personal deadlines.
    pub async fn handle_disconnect(&self, connection: ConnectionId) {
        self.senders.remove(&connection);
        self.rate_limiter.forget(&connection).await;

        let Some(code) = self.registry.drop_connection(connection) else {
            return;
        };
        let Some(handle) = self.registry.get(&code) else {
            return;
        };
        let now = now_ms();
        let mut room = handle.lock().await;
        let player_id = room.mark_disconnected(connection);
        room.touch(now);
        tracing::info!(
            room_code = %room.code,
            player_id = player_id.as_deref().unwrap_or("host/watcher"),
            "Connection detached from room"
        );
        self.send_snapshots(&room, now);
    }

    /// Periodic reaper. Runs until the process exits.
    pub async fn cleanup_task(self: Arc<Self>) {
        let interval_secs = self.config.timing.cleanup_interval_secs.max(1);
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
        loop {
            interval.tick().await;
            let destroyed = self.registry.reap(now_ms(), &self.config.timing).await;
            if destroyed > 0 {
                tracing::info!(destroyed, remaining = self.registry.len(), "Reaper sweep");
            }
        }
    }
}
