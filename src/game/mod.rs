//! Per-room game state machine.
//!
//! Everything in this module is synchronous and free of I/O: operations take
//! `&mut Room` plus the current wall-clock in milliseconds, so every phase
//! transition and scoring rule is unit-testable without timers. The server
//! layer owns the tokio side (room locks, scheduled one-shots, fan-out) and
//! re-validates preconditions inside the room lock when a timer fires.

pub mod acts;
pub mod engine;
pub mod items;
pub mod player;
pub mod question;
pub mod room;
pub mod scoring;
pub mod shop;
pub mod wager;

pub use acts::{ActConfig, ActId, ACT_ORDER};
pub use engine::{Advance, RevealOutcome, RevealReport};
pub use items::{ItemId, ItemKind, ItemSpec, FREEZE_BONUS_MS, ITEM_CATALOGUE};
pub use player::{PassiveBuffs, Player};
pub use question::CurrentQuestion;
pub use room::{
    ActState, BossState, GameConfig, GameConfigPatch, PendingRevive, Phase, Room, RoomTimers,
};
pub use shop::ItemUse;
pub use wager::{
    classify_wager, SpotlightEntry, StageEffects, WagerPerk, WagerSpotlight, WagerStage,
    WagerState, WagerTier, WAGER_DURATION_MS, WAGER_STAGE_OFFSETS_MS,
};

use crate::protocol::ErrorCode;
use thiserror::Error;

/// Domain errors surfaced to clients as `{ok:false, error}` acknowledgements.
///
/// All of these are recoverable at the client; a failed operation mutates
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("Not authorized")]
    NotAuthorized,
    #[error("Room not found")]
    RoomNotFound,
    #[error("Player not found")]
    PlayerNotFound,
    #[error("Room is full")]
    RoomFull,
    #[error("Game already in progress")]
    GameInProgress,
    #[error("Name already taken")]
    NameTaken,
    #[error("{0}")]
    InvalidInput(String),
    #[error("Wrong phase for this action")]
    WrongPhase,
    #[error("Not in wager phase")]
    NotInWagerPhase,
    #[error("Wagers are locked")]
    WagersLocked,
    #[error("Answer locked in")]
    AnswerLocked,
    #[error("Question already revealed")]
    AlreadyRevealed,
    #[error("Time is up")]
    TimeUp,
    #[error("Too early to reveal")]
    RevealTooEarly,
    #[error("You are eliminated")]
    Eliminated,
    #[error("You are not eliminated")]
    NotEliminated,
    #[error("Not enough coins")]
    NotEnoughCoins,
    #[error("Shop is closed")]
    ShopClosed,
    #[error("Item not available in this act")]
    ItemNotAllowed,
    #[error("Item can't be used right now")]
    ItemNotUsable,
    #[error("You don't own that item")]
    ItemNotOwned,
    #[error("Acts must move forward")]
    ActOrderViolation,
    #[error("A revive request is already pending")]
    RevivePending,
    #[error("No revive request pending")]
    NoRevivePending,
    #[error("Revives are closed right now")]
    ReviveNotAllowed,
    #[error("Answer before locking in")]
    LockinWithoutAnswer,
    #[error("No active question")]
    NoActiveQuestion,
    #[error("No questions for act")]
    NoQuestionsForAct,
    #[error("Question pack not found")]
    PackNotFound,
    #[error("No question packs loaded")]
    NoPacksLoaded,
    #[error("Answer index out of range")]
    AnswerOutOfRange,
}

impl GameError {
    /// Machine-readable code paired with the human message in the ack.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotAuthorized => ErrorCode::NotAuthorized,
            Self::RoomNotFound => ErrorCode::RoomNotFound,
            Self::PlayerNotFound => ErrorCode::PlayerNotFound,
            Self::RoomFull => ErrorCode::RoomFull,
            Self::GameInProgress => ErrorCode::GameInProgress,
            Self::NameTaken => ErrorCode::NameTaken,
            Self::InvalidInput(_) => ErrorCode::InvalidInput,
            Self::WrongPhase => ErrorCode::WrongPhase,
            Self::NotInWagerPhase => ErrorCode::NotInWagerPhase,
            Self::WagersLocked => ErrorCode::WagersLocked,
            Self::AnswerLocked => ErrorCode::QuestionLocked,
            Self::AlreadyRevealed => ErrorCode::QuestionLocked,
            Self::TimeUp => ErrorCode::TimeUp,
            Self::RevealTooEarly => ErrorCode::RevealTooEarly,
            Self::Eliminated => ErrorCode::Eliminated,
            Self::NotEliminated => ErrorCode::NotEliminated,
            Self::NotEnoughCoins => ErrorCode::NotEnoughCoins,
            Self::ShopClosed => ErrorCode::ShopClosed,
            Self::ItemNotAllowed => ErrorCode::ItemNotAllowed,
            Self::ItemNotUsable => ErrorCode::ItemNotUsable,
            Self::ItemNotOwned => ErrorCode::ItemNotOwned,
            Self::ActOrderViolation => ErrorCode::ActOrderViolation,
            Self::RevivePending => ErrorCode::RevivePending,
            Self::NoRevivePending => ErrorCode::NoRevivePending,
            Self::ReviveNotAllowed => ErrorCode::ReviveNotAllowed,
            Self::LockinWithoutAnswer => ErrorCode::LockinWithoutAnswer,
            Self::NoActiveQuestion => ErrorCode::NoActiveQuestion,
            Self::NoQuestionsForAct => ErrorCode::NoQuestionsForAct,
            Self::PackNotFound => ErrorCode::PackNotFound,
            Self::NoPacksLoaded => ErrorCode::NoPacksLoaded,
            Self::AnswerOutOfRange => ErrorCode::AnswerOutOfRange,
        }
    }
}
