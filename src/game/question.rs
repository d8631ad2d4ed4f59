//! The live question a room is currently playing.

use crate::catalog::QuestionRecord;
use crate::protocol::PlayerId;
use std::collections::HashMap;

/// Mutated only by the owning room's serialized event handling; replaced on
/// the next question, cleared on phase advance.
#[derive(Debug, Clone)]
pub struct CurrentQuestion {
    pub question: QuestionRecord,
    /// Countdown runs from scheduling until `countdown_ends_at`
    pub countdown_ends_at: i64,
    /// Equal to `countdown_ends_at`: answering opens when the countdown ends
    pub started_at: i64,
    pub ends_at: i64,
    /// Choices withheld from public snapshots until this instant
    pub blackout_until: Option<i64>,
    /// Last submission wins
    pub answers: HashMap<PlayerId, usize>,
    pub lockin_time: HashMap<PlayerId, i64>,
    /// Per-player extension from freeze_time, in ms
    pub freeze_bonus: HashMap<PlayerId, i64>,
    pub locked: bool,
    /// Set when every active player is done, making reveal immediately legal
    pub forced_reveal_at: Option<i64>,
}

impl CurrentQuestion {
    #[must_use]
    pub fn new(
        question: QuestionRecord,
        now_ms: i64,
        countdown_ms: i64,
        duration_ms: i64,
        blackout_until: Option<i64>,
    ) -> Self {
        let countdown_ends_at = now_ms + countdown_ms;
        Self {
            question,
            countdown_ends_at,
            started_at: countdown_ends_at,
            ends_at: countdown_ends_at + duration_ms,
            blackout_until,
            answers: HashMap::new(),
            lockin_time: HashMap::new(),
            freeze_bonus: HashMap::new(),
            locked: false,
            forced_reveal_at: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.question.id
    }

    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        self.ends_at - self.started_at
    }

    /// Personal deadline: the shared end time plus any freeze bonus.
    #[must_use]
    pub fn player_ends_at(&self, player_id: &str) -> i64 {
        self.ends_at + self.freeze_bonus.get(player_id).copied().unwrap_or(0)
    }

    pub fn add_freeze_bonus(&mut self, player_id: &str, bonus_ms: i64) -> i64 {
        let entry = self.freeze_bonus.entry(player_id.to_string()).or_insert(0);
        *entry += bonus_ms;
        self.ends_at + *entry
    }
}
