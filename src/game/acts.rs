//! Acts and their fixed configuration table.
//!
//! An act is a named stage of the game with its own question pool, timer
//! length, heart-loss policy, score multiplier, and allowed shop items. Acts
//! only ever move forward through [`ACT_ORDER`].

use super::items::ItemId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActId {
    Homeroom,
    PopQuiz,
    FieldTrip,
    WagerRound,
    BossFight,
}

/// Fixed forward play order. The derived `Ord` on [`ActId`] follows
/// declaration order, so `next > current` is the forward-only check.
pub const ACT_ORDER: [ActId; 5] = [
    ActId::Homeroom,
    ActId::PopQuiz,
    ActId::FieldTrip,
    ActId::WagerRound,
    ActId::BossFight,
];

/// Per-act tuning knobs applied by the scoring and shop rules.
#[derive(Debug, Clone, Copy)]
pub struct ActConfig {
    pub question_duration_ms: i64,
    /// Wrong answers always cost a heart
    pub hearts_at_risk: bool,
    /// Wrong answers cost a heart only on questions marked hard
    pub hearts_only_on_hard: bool,
    pub score_multiplier: f64,
    pub coin_reward_base: u64,
    pub speed_bonus_max: u64,
    pub allowed_items: &'static [ItemId],
}

const HOMEROOM: ActConfig = ActConfig {
    question_duration_ms: 22_000,
    hearts_at_risk: false,
    hearts_only_on_hard: false,
    score_multiplier: 1.0,
    coin_reward_base: 50,
    speed_bonus_max: 20,
    allowed_items: &[ItemId::DoublePoints, ItemId::FiftyFifty, ItemId::FreezeTime],
};

const POP_QUIZ: ActConfig = ActConfig {
    question_duration_ms: 18_000,
    hearts_at_risk: false,
    hearts_only_on_hard: true,
    score_multiplier: 1.5,
    coin_reward_base: 60,
    speed_bonus_max: 30,
    allowed_items: &[
        ItemId::DoublePoints,
        ItemId::Shield,
        ItemId::BuybackToken,
        ItemId::FiftyFifty,
        ItemId::FreezeTime,
    ],
};

const FIELD_TRIP: ActConfig = ActConfig {
    question_duration_ms: 20_000,
    hearts_at_risk: true,
    hearts_only_on_hard: false,
    score_multiplier: 2.0,
    coin_reward_base: 75,
    speed_bonus_max: 40,
    allowed_items: &[
        ItemId::DoublePoints,
        ItemId::Shield,
        ItemId::BuybackToken,
        ItemId::FiftyFifty,
        ItemId::FreezeTime,
    ],
};

const WAGER_ROUND: ActConfig = ActConfig {
    question_duration_ms: 25_000,
    hearts_at_risk: false,
    hearts_only_on_hard: false,
    score_multiplier: 1.0,
    coin_reward_base: 0,
    speed_bonus_max: 0,
    allowed_items: &[],
};

const BOSS_FIGHT: ActConfig = ActConfig {
    question_duration_ms: 15_000,
    hearts_at_risk: true,
    hearts_only_on_hard: false,
    score_multiplier: 2.5,
    coin_reward_base: 100,
    speed_bonus_max: 50,
    allowed_items: &[ItemId::Shield, ItemId::BuybackToken],
};

impl ActId {
    #[must_use]
    pub const fn config(self) -> &'static ActConfig {
        match self {
            Self::Homeroom => &HOMEROOM,
            Self::PopQuiz => &POP_QUIZ,
            Self::FieldTrip => &FIELD_TRIP,
            Self::WagerRound => &WAGER_ROUND,
            Self::BossFight => &BOSS_FIGHT,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Homeroom => "homeroom",
            Self::PopQuiz => "pop_quiz",
            Self::FieldTrip => "field_trip",
            Self::WagerRound => "wager_round",
            Self::BossFight => "boss_fight",
        }
    }

    /// Acts strictly after `self` in play order.
    #[must_use]
    pub fn remaining(self) -> Vec<ActId> {
        ACT_ORDER.iter().copied().filter(|a| *a > self).collect()
    }
}

impl fmt::Display for ActId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
