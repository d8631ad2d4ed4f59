//! State snapshots fanned out after every successful mutation.
//!
//! The public snapshot goes to the whole room group; the host snapshot layers
//! the secrets on top (correct answer, pending revive, available acts).
//! Everything is computed fresh from the room so clients can treat any
//! snapshot as authoritative, and stale ones are safe to drop.

use crate::game::room::{GameConfig, PendingRevive, Phase, Room};
use crate::game::wager::{WagerStage, WagerState};
use crate::game::{ActId, ItemId, PassiveBuffs};
use crate::protocol::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicPlayer {
    pub id: PlayerId,
    pub name: String,
    pub connected: bool,
    pub lives: u64,
    pub score: u64,
    pub coins: u64,
    pub eliminated: bool,
    pub locked_in: bool,
    pub wager_submitted: bool,
    pub inventory: HashMap<ItemId, u64>,
    pub buffs: PassiveBuffsView,
}

/// Serializable mirror of [`PassiveBuffs`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PassiveBuffsView {
    pub double_points: bool,
    pub shield: bool,
}

impl From<PassiveBuffs> for PassiveBuffsView {
    fn from(buffs: PassiveBuffs) -> Self {
        Self {
            double_points: buffs.double_points,
            shield: buffs.shield,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: String,
    pub prompt: String,
    /// Empty while a blackout window is active
    pub choices: Vec<String>,
    pub choice_count: usize,
    pub category: String,
    pub countdown_ends_at: i64,
    pub started_at: i64,
    pub ends_at: i64,
    /// When the host's reveal becomes legal
    pub reveal_at: i64,
    pub locked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blackout_until: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicActState {
    pub act_id: ActId,
    /// Index of the next question to be drawn
    pub question_index: usize,
    pub question_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicWagerState {
    pub stage: WagerStage,
    pub started_at: i64,
    pub ends_at: i64,
    pub locked: bool,
    /// Revealed from the category stage on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Revealed from the hint stage on
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Who has a wager recorded (amounts stay hidden until the spotlight)
    pub submitted: Vec<PlayerId>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PublicBossState {
    pub hp: u64,
    pub max_hp: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicRoomState {
    pub code: String,
    pub phase: Phase,
    pub pack_id: String,
    pub config: GameConfig,
    pub shop_open: bool,
    pub players: Vec<PublicPlayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub act: Option<PublicActState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<PublicQuestion>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wager: Option<PublicWagerState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub boss: Option<PublicBossState>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostRoomState {
    #[serde(flatten)]
    pub public: PublicRoomState,
    /// Only present while a question is live or revealed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correct_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_revive: Option<PendingReviveView>,
    pub available_acts: Vec<ActId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingReviveView {
    pub player_id: PlayerId,
    pub player_name: String,
    pub requested_at: i64,
}

impl From<&PendingRevive> for PendingReviveView {
    fn from(ticket: &PendingRevive) -> Self {
        Self {
            player_id: ticket.player_id.clone(),
            player_name: ticket.player_name.clone(),
            requested_at: ticket.requested_at,
        }
    }
}

impl PublicRoomState {
    #[must_use]
    pub fn snapshot(room: &Room, now_ms: i64) -> Self {
        let mut players: Vec<PublicPlayer> = room
            .players
            .values()
            .map(|p| PublicPlayer {
                id: p.id.clone(),
                name: p.name.clone(),
                connected: p.connected,
                lives: p.lives,
                score: p.score,
                coins: p.coins,
                eliminated: p.eliminated,
                locked_in: p.locked_in,
                wager_submitted: p.wager_submitted,
                inventory: p.inventory.clone(),
                buffs: p.buffs.into(),
            })
            .collect();
        // Stable roster order: join time, then id for same-millisecond joins
        players.sort_by(|a, b| {
            let ja = room.players.get(&a.id).map_or(0, |p| p.joined_at);
            let jb = room.players.get(&b.id).map_or(0, |p| p.joined_at);
            ja.cmp(&jb).then_with(|| a.id.cmp(&b.id))
        });

        let question = room.current_question.as_ref().map(|q| {
            let blacked_out = q.blackout_until.is_some_and(|until| now_ms < until);
            PublicQuestion {
                id: q.question.id.clone(),
                prompt: q.question.prompt.clone(),
                choices: if blacked_out {
                    Vec::new()
                } else {
                    q.question.choices.clone()
                },
                choice_count: q.question.choices.len(),
                category: q.question.category.clone(),
                countdown_ends_at: q.countdown_ends_at,
                started_at: q.started_at,
                ends_at: q.ends_at,
                reveal_at: room.reveal_at().unwrap_or(q.ends_at),
                locked: q.locked,
                blackout_until: q.blackout_until,
            }
        });

        Self {
            code: room.code.clone(),
            phase: room.phase,
            pack_id: room.pack_id.clone(),
            config: room.config,
            shop_open: room.shop_open,
            players,
            act: room.act_state.as_ref().map(|a| PublicActState {
                act_id: a.act_id,
                question_index: a.question_index,
                question_count: a.questions.len(),
            }),
            question,
            wager: room.wager_state.as_ref().map(wager_view),
            boss: room.boss_state.map(|b| PublicBossState {
                hp: b.hp,
                max_hp: b.max_hp,
            }),
        }
    }
}

fn wager_view(state: &WagerState) -> PublicWagerState {
    let mut submitted: Vec<PlayerId> = state.wagers.keys().cloned().collect();
    submitted.sort_unstable();
    PublicWagerState {
        stage: state.stage,
        started_at: state.started_at,
        ends_at: state.ends_at,
        locked: state.locked,
        category: (state.stage >= WagerStage::Category)
            .then(|| state.question.category.clone()),
        hint: (state.stage >= WagerStage::Hint)
            .then(|| state.question.hint.clone())
            .flatten(),
        submitted,
    }
}

impl HostRoomState {
    #[must_use]
    pub fn snapshot(room: &Room, now_ms: i64) -> Self {
        Self {
            public: PublicRoomState::snapshot(room, now_ms),
            correct_index: room
                .current_question
                .as_ref()
                .map(|q| q.question.correct_index),
            pending_revive: room.pending_revive.as_ref().map(PendingReviveView::from),
            available_acts: room.available_acts(),
        }
    }
}
