//! Default per-room game settings.
//!
//! These are the values a freshly created room starts with; the host can
//! adjust them per room with `game:configure` while the room is in the lobby.

use super::defaults::{
    default_boss_hp, default_buyback_cost_coins, default_countdown_ms, default_max_lives,
    default_starting_coins,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GameDefaultsConfig {
    #[serde(default = "default_max_lives")]
    pub max_lives: u64,
    /// Pre-question countdown shown to players
    #[serde(default = "default_countdown_ms")]
    pub countdown_ms: i64,
    #[serde(default = "default_starting_coins")]
    pub starting_coins: u64,
    /// Coin cost of a manual buyback after elimination
    #[serde(default = "default_buyback_cost_coins")]
    pub buyback_cost_coins: u64,
    /// Boss hit points; each correct answer in the boss act removes one
    #[serde(default = "default_boss_hp")]
    pub boss_hp: u64,
}

impl Default for GameDefaultsConfig {
    fn default() -> Self {
        Self {
            max_lives: default_max_lives(),
            countdown_ms: default_countdown_ms(),
            starting_coins: default_starting_coins(),
            buyback_cost_coins: default_buyback_cost_coins(),
            boss_hp: default_boss_hp(),
        }
    }
}
