//! The High-Stakes wager mini-round.
//!
//! A 60-second staged timeline runs before the wager question: blind,
//! category, hint, redline, closing, locked. From redline on, wagers may only
//! rise. Locking classifies every player into a tier, pre-generates private
//! perks, and broadcasts the spotlight tableau; the host then starts the
//! question with `wager:spotlight_end`.

use super::room::{Phase, Room};
use super::GameError;
use crate::catalog::QuestionRecord;
use crate::protocol::PlayerId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const WAGER_DURATION_MS: i64 = 60_000;

/// Offsets from `started_at` at which the staged timers fire.
pub const WAGER_STAGE_OFFSETS_MS: [(WagerStage, i64); 5] = [
    (WagerStage::Category, 15_000),
    (WagerStage::Hint, 30_000),
    (WagerStage::Redline, 45_000),
    (WagerStage::Closing, 55_000),
    (WagerStage::Locked, 60_000),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WagerStage {
    Blind,
    Category,
    Hint,
    Redline,
    Closing,
    Locked,
}

/// Qualitative classification of a wager relative to the player's score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WagerTier {
    Safe,
    Bold,
    HighRoller,
    Insane,
    AllIn,
}

/// Tier thresholds on the wager/score ratio. A zero wager or zero score is
/// always SAFE; betting everything (or more) is ALL_IN.
#[must_use]
pub fn classify_wager(score: u64, wager: u64) -> WagerTier {
    if wager == 0 || score == 0 {
        return WagerTier::Safe;
    }
    if wager >= score {
        return WagerTier::AllIn;
    }
    #[allow(clippy::cast_precision_loss)]
    let ratio = wager as f64 / score as f64;
    if ratio >= 0.8 {
        WagerTier::Insane
    } else if ratio >= 0.5 {
        WagerTier::HighRoller
    } else if ratio >= 0.25 {
        WagerTier::Bold
    } else {
        WagerTier::Safe
    }
}

#[derive(Debug, Clone)]
pub struct WagerState {
    pub question: QuestionRecord,
    pub started_at: i64,
    pub ends_at: i64,
    pub stage: WagerStage,
    pub locked: bool,
    /// Last accepted amount per player, clamped and redline-guarded
    pub wagers: HashMap<PlayerId, u64>,
    /// Computed once at lock time
    pub tiers: HashMap<PlayerId, WagerTier>,
    /// Pre-generated 50/50 removals, replayed verbatim on reconnect
    pub removed_indexes: HashMap<PlayerId, Vec<usize>>,
}

impl WagerState {
    #[must_use]
    pub fn new(question: QuestionRecord, now_ms: i64) -> Self {
        Self {
            question,
            started_at: now_ms,
            ends_at: now_ms + WAGER_DURATION_MS,
            stage: WagerStage::Blind,
            locked: false,
            wagers: HashMap::new(),
            tiers: HashMap::new(),
            removed_indexes: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotlightEntry {
    pub player_id: PlayerId,
    pub name: String,
    pub wager: u64,
    pub ratio: f64,
    pub tier: WagerTier,
}

/// The locked-wager tableau broadcast after the wager phase closes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WagerSpotlight {
    pub total_wagered: u64,
    pub all_in_count: usize,
    pub zero_bet_count: usize,
    pub biggest: Option<SpotlightEntry>,
    pub top: Vec<SpotlightEntry>,
}

/// What a stage timer produced; the server layer turns these into envelopes.
#[derive(Debug, Default)]
pub struct StageEffects {
    pub extra_hints: Vec<(PlayerId, String)>,
    pub siren: bool,
    pub spotlight: Option<WagerSpotlight>,
}

/// Private perk bundle delivered when the wager question starts.
#[derive(Debug, Clone)]
pub struct WagerPerk {
    pub player_id: PlayerId,
    pub removed_indexes: Option<Vec<usize>>,
    pub extra_hint: Option<String>,
}

impl Room {
    /// Enter the wager phase for `question`. Clears the current question,
    /// closes the shop, and resets per-player wager fields.
    pub(crate) fn begin_wager(&mut self, question: QuestionRecord, now_ms: i64) {
        for player in self.players.values_mut() {
            player.reset_wager();
            player.locked_in = false;
        }
        self.current_question = None;
        self.shop_open = false;
        self.phase = Phase::Wager;
        self.wager_state = Some(WagerState::new(question, now_ms));
    }

    /// `wager:set`. Clamps to `[0, score]`; once redline is reached the
    /// recorded amount never decreases. Returns the recorded amount.
    pub fn set_wager(
        &mut self,
        player_id: &str,
        amount: u64,
        now_ms: i64,
    ) -> Result<u64, GameError> {
        if self.phase != Phase::Wager {
            return Err(GameError::NotInWagerPhase);
        }
        let state = self.wager_state.as_mut().ok_or(GameError::NotInWagerPhase)?;
        if state.locked {
            return Err(GameError::WagersLocked);
        }
        if now_ms > state.ends_at {
            return Err(GameError::TimeUp);
        }
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        if player.eliminated {
            return Err(GameError::Eliminated);
        }

        let mut clamped = amount.min(player.score);
        if state.stage >= WagerStage::Redline {
            if let Some(previous) = state.wagers.get(player_id) {
                clamped = clamped.max(*previous);
            }
        }

        state.wagers.insert(player_id.to_string(), clamped);
        player.wager = clamped;
        player.wager_submitted = true;
        Ok(clamped)
    }

    /// Timer callback for one wager stage. Returns `None` when the
    /// precondition no longer holds (locked, cleared, or already past the
    /// stage) so racing host commands are tolerated.
    pub fn wager_stage_fired(&mut self, stage: WagerStage, now_ms: i64) -> Option<StageEffects> {
        let state = self.wager_state.as_mut()?;
        if state.locked || state.stage >= stage {
            return None;
        }
        state.stage = stage;

        let mut effects = StageEffects::default();
        match stage {
            WagerStage::Redline => {
                if let Some(hint) = extra_hint_text(&state.question) {
                    let wagers = state.wagers.clone();
                    for player in self.players.values().filter(|p| p.is_active()) {
                        let wager = wagers.get(&player.id).copied().unwrap_or(0);
                        if classify_wager(player.score, wager) >= WagerTier::Bold {
                            effects.extra_hints.push((player.id.clone(), hint.clone()));
                        }
                    }
                }
            }
            WagerStage::Closing => {
                effects.siren = true;
            }
            WagerStage::Locked => {
                effects.spotlight = Some(self.lock_wagers(now_ms)?);
            }
            WagerStage::Blind | WagerStage::Category | WagerStage::Hint => {}
        }
        Some(effects)
    }

    /// Lock all wagers: classify tiers, pre-generate 50/50 removals for
    /// HIGH_ROLLER and up, and build the spotlight payload. Idempotent-safe:
    /// returns `None` if already locked or no wager is running.
    pub fn lock_wagers(&mut self, _now_ms: i64) -> Option<WagerSpotlight> {
        let state = self.wager_state.as_mut()?;
        if state.locked {
            return None;
        }
        state.locked = true;
        state.stage = WagerStage::Locked;
        self.timers.cancel_wager_stages();

        let state = self.wager_state.as_mut()?;
        let mut entries: Vec<SpotlightEntry> = Vec::new();
        let mut zero_bet_count = 0;
        for player in self.players.values().filter(|p| p.is_active()) {
            let wager = state.wagers.get(&player.id).copied().unwrap_or(0);
            let tier = classify_wager(player.score, wager);
            state.tiers.insert(player.id.clone(), tier);
            if tier >= WagerTier::HighRoller {
                state.removed_indexes.insert(
                    player.id.clone(),
                    pick_wrong_indexes(&state.question, 2),
                );
            }
            if wager == 0 {
                zero_bet_count += 1;
            }
            #[allow(clippy::cast_precision_loss)]
            let ratio = if player.score == 0 {
                0.0
            } else {
                wager as f64 / player.score as f64
            };
            entries.push(SpotlightEntry {
                player_id: player.id.clone(),
                name: player.name.clone(),
                wager,
                ratio,
                tier,
            });
        }

        entries.sort_by(|a, b| {
            b.ratio
                .partial_cmp(&a.ratio)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| b.wager.cmp(&a.wager))
        });

        Some(WagerSpotlight {
            total_wagered: entries.iter().map(|e| e.wager).sum(),
            all_in_count: entries.iter().filter(|e| e.tier == WagerTier::AllIn).count(),
            zero_bet_count,
            biggest: entries.first().cloned(),
            top: entries.iter().take(3).cloned().collect(),
        })
    }

    /// `wager:spotlight_end`: start the wager question and hand back the
    /// stored per-player perks for delivery.
    pub fn end_spotlight(&mut self, now_ms: i64) -> Result<Vec<WagerPerk>, GameError> {
        if self.phase != Phase::Wager {
            return Err(GameError::NotInWagerPhase);
        }
        let state = self.wager_state.as_ref().ok_or(GameError::NotInWagerPhase)?;
        if !state.locked {
            return Err(GameError::WrongPhase);
        }

        let question = state.question.clone();
        let duration = super::acts::ActId::WagerRound.config().question_duration_ms;
        let countdown = self.config.countdown_ms;
        // Choices stay hidden until answering opens
        self.start_question_internal(question, now_ms, Some(duration), Some(now_ms + countdown));
        Ok(self.wager_perks())
    }

    /// Perk bundles from the locked wager state; also used to replay perks on
    /// reconnect (the stored removals are never recomputed).
    #[must_use]
    pub fn wager_perks(&self) -> Vec<WagerPerk> {
        let Some(state) = self.wager_state.as_ref() else {
            return Vec::new();
        };
        let hint = extra_hint_text(&state.question);
        state
            .tiers
            .iter()
            .filter(|(_, tier)| **tier >= WagerTier::Bold)
            .map(|(player_id, tier)| WagerPerk {
                player_id: player_id.clone(),
                removed_indexes: if *tier >= WagerTier::HighRoller {
                    state.removed_indexes.get(player_id).cloned()
                } else {
                    None
                },
                extra_hint: hint.clone(),
            })
            .collect()
    }
}

fn extra_hint_text(question: &QuestionRecord) -> Option<String> {
    question
        .extra_hint
        .clone()
        .or_else(|| question.hint.clone())
}

/// Pick `count` distinct wrong choice indices, uniformly at random.
pub(crate) fn pick_wrong_indexes(question: &QuestionRecord, count: usize) -> Vec<usize> {
    let mut wrong: Vec<usize> = (0..question.choices.len())
        .filter(|i| *i != question.correct_index)
        .collect();
    fastrand::shuffle(&mut wrong);
    wrong.truncate(count);
    wrong.sort_unstable();
    wrong
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_classification_edges() {
        assert_eq!(classify_wager(0, 0), WagerTier::Safe);
        assert_eq!(classify_wager(0, 50), WagerTier::Safe);
        assert_eq!(classify_wager(400, 0), WagerTier::Safe);
        assert_eq!(classify_wager(400, 99), WagerTier::Safe);
        assert_eq!(classify_wager(400, 100), WagerTier::Bold);
        assert_eq!(classify_wager(400, 200), WagerTier::HighRoller);
        assert_eq!(classify_wager(400, 320), WagerTier::Insane);
        assert_eq!(classify_wager(400, 400), WagerTier::AllIn);
        assert_eq!(classify_wager(400, 500), WagerTier::AllIn);
    }

    #[test]
    fn tier_ordering_gates_perks() {
        assert!(WagerTier::Bold >= WagerTier::Bold);
        assert!(WagerTier::HighRoller > WagerTier::Bold);
        assert!(WagerTier::AllIn > WagerTier::Insane);
        assert!(WagerTier::Safe < WagerTier::Bold);
    }

    #[test]
    fn stage_offsets_are_the_documented_timeline() {
        let offsets: Vec<i64> = WAGER_STAGE_OFFSETS_MS.iter().map(|(_, ms)| *ms).collect();
        assert_eq!(offsets, vec![15_000, 30_000, 45_000, 55_000, 60_000]);
    }

    #[test]
    fn wrong_indexes_never_include_the_answer() {
        let question = QuestionRecord {
            id: "q".to_string(),
            prompt: String::new(),
            choices: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index: 2,
            value: 100,
            hard: false,
            category: String::new(),
            hint: None,
            extra_hint: None,
        };
        for _ in 0..50 {
            let removed = pick_wrong_indexes(&question, 2);
            assert_eq!(removed.len(), 2);
            assert!(!removed.contains(&2));
            assert!(removed[0] != removed[1]);
        }
    }
}
