//! Shop opening/closing, purchases, and active-item effects.

use super::items::{ItemId, ItemKind, FREEZE_BONUS_MS};
use super::room::{Phase, Room};
use super::wager::pick_wrong_indexes;
use super::{acts::ActId, GameError};

/// Result of an active-item use, delivered privately to the player.
#[derive(Debug, Clone)]
pub enum ItemUse {
    FiftyFifty { removed_indexes: Vec<usize> },
    FreezeTime { added_ms: i64, ends_at: i64 },
}

impl Room {
    /// `shop:open` (host). Opening moves the room into the shop phase;
    /// closing only clears the flag, leaving the host free to advance.
    pub fn set_shop_open(&mut self, open: bool) -> Result<(), GameError> {
        if open {
            if !matches!(self.phase, Phase::Reveal | Phase::Shop | Phase::Intermission) {
                return Err(GameError::WrongPhase);
            }
            self.shop_open = true;
            self.phase = Phase::Shop;
        } else {
            self.shop_open = false;
        }
        Ok(())
    }

    /// `shop:buy`: debit coins, add to inventory, and for passive kinds arm
    /// the buff immediately.
    pub fn buy_item(&mut self, player_id: &str, item: ItemId) -> Result<(), GameError> {
        if !self.shop_open {
            return Err(GameError::ShopClosed);
        }
        let act = self.current_act().ok_or(GameError::WrongPhase)?;
        if !act.config().allowed_items.contains(&item) {
            return Err(GameError::ItemNotAllowed);
        }
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        let cost = item.cost();
        if player.coins < cost {
            return Err(GameError::NotEnoughCoins);
        }

        player.coins -= cost;
        player.grant_item(item);
        match item {
            ItemId::DoublePoints => player.buffs.double_points = true,
            ItemId::Shield => player.buffs.shield = true,
            ItemId::BuybackToken | ItemId::FiftyFifty | ItemId::FreezeTime => {}
        }
        Ok(())
    }

    /// `item:use`: trigger an active item against the current question.
    pub fn use_item(
        &mut self,
        player_id: &str,
        item: ItemId,
        now_ms: i64,
    ) -> Result<ItemUse, GameError> {
        if item.kind() != ItemKind::Active {
            return Err(GameError::ItemNotUsable);
        }
        if self.current_act() == Some(ActId::WagerRound) {
            return Err(GameError::ItemNotAllowed);
        }
        if !matches!(self.phase, Phase::Question | Phase::Boss) {
            return Err(GameError::ItemNotUsable);
        }
        let reveal_at = self.reveal_at().ok_or(GameError::NoActiveQuestion)?;

        let q = self
            .current_question
            .as_mut()
            .ok_or(GameError::NoActiveQuestion)?;
        if q.locked {
            return Err(GameError::ItemNotUsable);
        }
        let player_ends_at = q.player_ends_at(player_id);

        let player = self
            .players
            .get_mut(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        if player.eliminated {
            return Err(GameError::Eliminated);
        }
        if player.locked_in {
            return Err(GameError::ItemNotUsable);
        }
        if now_ms > player_ends_at.min(reveal_at) {
            return Err(GameError::TimeUp);
        }
        if !player.consume_item(item) {
            return Err(GameError::ItemNotOwned);
        }

        match item {
            ItemId::FiftyFifty => Ok(ItemUse::FiftyFifty {
                removed_indexes: pick_wrong_indexes(&q.question, 2),
            }),
            ItemId::FreezeTime => {
                let ends_at = q.add_freeze_bonus(player_id, FREEZE_BONUS_MS);
                Ok(ItemUse::FreezeTime {
                    added_ms: FREEZE_BONUS_MS,
                    ends_at,
                })
            }
            // Unreachable: kind() == Active is checked above
            ItemId::DoublePoints | ItemId::Shield | ItemId::BuybackToken => {
                Err(GameError::ItemNotUsable)
            }
        }
    }
}
