//! The room: unit of game state.

use super::acts::ActId;
use super::player::Player;
use super::question::CurrentQuestion;
use super::wager::WagerState;
use crate::catalog::QuestionRecord;
use crate::protocol::{ConnectionId, PlayerId, RoomCode};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tokio::task::AbortHandle;

/// Room phases. `Countdown`/`Question`/`Boss`/`Reveal` cycle within an act;
/// `Wager` replaces the countdown for wager-round questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Lobby,
    Wager,
    Countdown,
    Question,
    Reveal,
    Shop,
    Boss,
    Intermission,
    Ended,
}

/// Per-room settings, host-adjustable in the lobby.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GameConfig {
    pub max_lives: u64,
    pub countdown_ms: i64,
    pub starting_coins: u64,
    pub buyback_cost_coins: u64,
    pub boss_hp: u64,
}

/// Partial configuration from `game:configure`. Unknown keys are ignored by
/// serde; present keys overwrite.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct GameConfigPatch {
    #[serde(default)]
    pub max_lives: Option<u64>,
    #[serde(default)]
    pub countdown_ms: Option<i64>,
    #[serde(default)]
    pub starting_coins: Option<u64>,
    #[serde(default)]
    pub buyback_cost_coins: Option<u64>,
    #[serde(default)]
    pub boss_hp: Option<u64>,
}

impl GameConfig {
    pub fn apply(&mut self, patch: &GameConfigPatch) {
        if let Some(v) = patch.max_lives {
            self.max_lives = v;
        }
        if let Some(v) = patch.countdown_ms {
            self.countdown_ms = v;
        }
        if let Some(v) = patch.starting_coins {
            self.starting_coins = v;
        }
        if let Some(v) = patch.buyback_cost_coins {
            self.buyback_cost_coins = v;
        }
        if let Some(v) = patch.boss_hp {
            self.boss_hp = v;
        }
    }
}

/// Progress through one act's shuffled question list.
#[derive(Debug, Clone)]
pub struct ActState {
    pub act_id: ActId,
    pub questions: Vec<QuestionRecord>,
    pub question_index: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct BossState {
    pub hp: u64,
    pub max_hp: u64,
}

/// The single outstanding host-approval revive ticket.
#[derive(Debug, Clone, Serialize)]
pub struct PendingRevive {
    pub player_id: PlayerId,
    pub player_name: String,
    pub requested_at: i64,
}

/// Abort handles for this room's scheduled one-shots. Cancelled on phase
/// transitions that invalidate them and on room destroy; callbacks that fire
/// anyway re-validate before acting.
#[derive(Debug, Default)]
pub struct RoomTimers {
    pub countdown: Option<AbortHandle>,
    pub wager_stages: Vec<AbortHandle>,
}

impl RoomTimers {
    pub fn cancel_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }

    pub fn cancel_wager_stages(&mut self) {
        for handle in self.wager_stages.drain(..) {
            handle.abort();
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel_countdown();
        self.cancel_wager_stages();
    }
}

#[derive(Debug)]
pub struct Room {
    pub code: RoomCode,
    pub created_at: i64,
    /// Touched on every inbound event and broadcast
    pub last_activity_at: i64,
    pub host_name: String,
    /// Opaque secret required to authorize host operations
    pub host_token: String,
    pub host_connection: Option<ConnectionId>,
    pub phase: Phase,
    pub config: GameConfig,
    pub pack_id: String,
    pub players: HashMap<PlayerId, Player>,
    pub connection_to_player: HashMap<ConnectionId, PlayerId>,
    /// Spectator connections joined via room:watch
    pub watchers: HashSet<ConnectionId>,
    /// None iff phase is Lobby
    pub act_state: Option<ActState>,
    pub wager_state: Option<WagerState>,
    pub current_question: Option<CurrentQuestion>,
    pub shop_open: bool,
    pub boss_state: Option<BossState>,
    pub pending_revive: Option<PendingRevive>,
    pub timers: RoomTimers,
}

impl Room {
    #[must_use]
    pub fn new(
        code: RoomCode,
        host_name: String,
        host_token: String,
        pack_id: String,
        config: GameConfig,
        now_ms: i64,
    ) -> Self {
        Self {
            code,
            created_at: now_ms,
            last_activity_at: now_ms,
            host_name,
            host_token,
            host_connection: None,
            phase: Phase::Lobby,
            config,
            pack_id,
            players: HashMap::new(),
            connection_to_player: HashMap::new(),
            watchers: HashSet::new(),
            act_state: None,
            wager_state: None,
            current_question: None,
            shop_open: false,
            boss_state: None,
            pending_revive: None,
            timers: RoomTimers::default(),
        }
    }

    pub fn touch(&mut self, now_ms: i64) {
        self.last_activity_at = now_ms;
    }

    #[must_use]
    pub fn current_act(&self) -> Option<ActId> {
        self.act_state.as_ref().map(|a| a.act_id)
    }

    #[must_use]
    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.get(player_id)
    }

    #[must_use]
    pub fn player_mut(&mut self, player_id: &str) -> Option<&mut Player> {
        self.players.get_mut(player_id)
    }

    #[must_use]
    pub fn player_by_connection(&self, connection: ConnectionId) -> Option<&Player> {
        self.connection_to_player
            .get(&connection)
            .and_then(|id| self.players.get(id))
    }

    pub fn active_players(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.is_active())
    }

    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.active_players().count()
    }

    /// Every connection that should receive room broadcasts: players, the
    /// host, and watchers.
    #[must_use]
    pub fn broadcast_connections(&self) -> Vec<ConnectionId> {
        let mut connections: Vec<ConnectionId> = self
            .players
            .values()
            .filter(|p| p.connected)
            .filter_map(|p| p.connection_id)
            .collect();
        if let Some(host) = self.host_connection {
            connections.push(host);
        }
        connections.extend(self.watchers.iter().copied());
        connections.sort_unstable();
        connections.dedup();
        connections
    }

    #[must_use]
    pub fn has_connections(&self) -> bool {
        self.host_connection.is_some()
            || !self.watchers.is_empty()
            || self.players.values().any(|p| p.connected)
    }

    /// When reveal becomes legal for the current question: the shared end
    /// plus the largest active freeze bonus, or `forced_reveal_at` once every
    /// active player is done.
    #[must_use]
    pub fn reveal_at(&self) -> Option<i64> {
        let q = self.current_question.as_ref()?;
        if let Some(forced) = q.forced_reveal_at {
            return Some(forced);
        }
        let max_bonus = self
            .active_players()
            .map(|p| q.freeze_bonus.get(&p.id).copied().unwrap_or(0))
            .max()
            .unwrap_or(0);
        Some(q.ends_at.max(q.ends_at + max_bonus))
    }

    /// An active player is done when locked in or past their personal
    /// deadline. Disconnected players count via their deadlines only.
    #[must_use]
    pub fn all_active_done(&self, now_ms: i64) -> bool {
        let Some(q) = self.current_question.as_ref() else {
            return false;
        };
        let mut any_active = false;
        for player in self.active_players() {
            any_active = true;
            if player.locked_in {
                continue;
            }
            if now_ms <= q.player_ends_at(&player.id) {
                return false;
            }
        }
        any_active
    }

    /// Acts the host may start next (strictly forward in play order).
    #[must_use]
    pub fn available_acts(&self) -> Vec<ActId> {
        match self.current_act() {
            Some(current) => current.remaining(),
            None => super::acts::ACT_ORDER.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> GameConfig {
        GameConfig {
            max_lives: 3,
            countdown_ms: 3_000,
            starting_coins: 150,
            buyback_cost_coins: 200,
            boss_hp: 6,
        }
    }

    fn test_room() -> Room {
        Room::new(
            "ABCDE".to_string(),
            "Host".to_string(),
            "token".to_string(),
            "classic".to_string(),
            test_config(),
            1_000,
        )
    }

    #[test]
    fn new_room_starts_in_lobby() {
        let room = test_room();
        assert_eq!(room.phase, Phase::Lobby);
        assert!(room.act_state.is_none());
        assert!(room.current_question.is_none());
        assert!(room.pending_revive.is_none());
        assert!(!room.shop_open);
    }

    #[test]
    fn config_patch_overwrites_only_present_keys() {
        let mut config = test_config();
        config.apply(&GameConfigPatch {
            max_lives: Some(5),
            boss_hp: Some(10),
            ..GameConfigPatch::default()
        });
        assert_eq!(config.max_lives, 5);
        assert_eq!(config.boss_hp, 10);
        assert_eq!(config.starting_coins, 150);
        assert_eq!(config.countdown_ms, 3_000);
    }

    #[test]
    fn unknown_patch_keys_are_ignored() {
        let patch: GameConfigPatch =
            serde_json::from_str(r#"{"max_lives": 4, "theme": "neon"}"#).unwrap();
        assert_eq!(patch.max_lives, Some(4));
    }

    #[test]
    fn available_acts_before_game_is_full_order() {
        let room = test_room();
        assert_eq!(room.available_acts(), super::super::acts::ACT_ORDER.to_vec());
    }
}
