//! Player state within a room.

use super::items::ItemId;
use crate::protocol::{ConnectionId, PlayerId};
use serde::Serialize;
use std::collections::HashMap;

/// One-shot effects armed by passive purchases and consumed at reveal.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PassiveBuffs {
    pub double_points: bool,
    pub shield: bool,
}

/// A player is never removed from a room once joined; disconnects only flip
/// `connected`. Lives, score, coins, and inventory counts never go negative.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub connection_id: Option<ConnectionId>,
    pub connected: bool,
    pub joined_at: i64,
    pub lives: u64,
    pub score: u64,
    pub coins: u64,
    pub eliminated: bool,
    pub locked_in: bool,
    pub inventory: HashMap<ItemId, u64>,
    /// Wager for the current wager question, clamped to `[0, score]`
    pub wager: u64,
    pub wager_submitted: bool,
    pub wager_swap_used: bool,
    pub buffs: PassiveBuffs,
}

impl Player {
    #[must_use]
    pub fn new(
        id: PlayerId,
        name: String,
        connection_id: ConnectionId,
        lives: u64,
        coins: u64,
        now_ms: i64,
    ) -> Self {
        Self {
            id,
            name,
            connection_id: Some(connection_id),
            connected: true,
            joined_at: now_ms,
            lives,
            score: 0,
            coins,
            eliminated: false,
            locked_in: false,
            inventory: HashMap::new(),
            wager: 0,
            wager_submitted: false,
            wager_swap_used: false,
            buffs: PassiveBuffs::default(),
        }
    }

    /// Active players participate in questions and the all-done short-circuit.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.eliminated
    }

    #[must_use]
    pub fn item_count(&self, item: ItemId) -> u64 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    pub fn grant_item(&mut self, item: ItemId) {
        *self.inventory.entry(item).or_insert(0) += 1;
    }

    /// Consume one charge of `item`. Returns false (and changes nothing) if
    /// the player owns none.
    pub fn consume_item(&mut self, item: ItemId) -> bool {
        match self.inventory.get_mut(&item) {
            Some(count) if *count > 0 => {
                *count -= 1;
                if *count == 0 {
                    self.inventory.remove(&item);
                }
                true
            }
            _ => false,
        }
    }

    /// Clear per-wager-question fields ahead of a new wager phase.
    pub fn reset_wager(&mut self) {
        self.wager = 0;
        self.wager_submitted = false;
        self.wager_swap_used = false;
    }
}
