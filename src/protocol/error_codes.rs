use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes for structured error handling.
///
/// Every failed acknowledgement carries one of these alongside the
/// human-readable message, so clients can branch without string matching.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Authorization
    NotAuthorized,

    // Validation
    InvalidInput,
    InvalidRoomCode,
    InvalidPlayerName,
    NameTaken,
    RoomFull,
    AnswerOutOfRange,

    // State
    WrongPhase,
    GameInProgress,
    NotInWagerPhase,
    WagersLocked,
    QuestionLocked,
    TimeUp,
    RevealTooEarly,
    Eliminated,
    NotEliminated,
    NotEnoughCoins,
    ShopClosed,
    ItemNotAllowed,
    ItemNotUsable,
    ItemNotOwned,
    ActOrderViolation,
    RevivePending,
    NoRevivePending,
    ReviveNotAllowed,
    LockinWithoutAnswer,

    // Resource
    RoomNotFound,
    PlayerNotFound,
    NoActiveQuestion,
    NoQuestionsForAct,
    PackNotFound,
    NoPacksLoaded,

    // Rate limiting
    RateLimitExceeded,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Matches the wire representation
        let s = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(s.trim_matches('"'))
    }
}
