//! Phase/act engine: act selection, question iteration, countdown→question→
//! reveal transitions, intermission gating, revives, and ending.
//!
//! Transitions are host-driven except the countdown auto-advance. Timer
//! callbacks re-enter through the server layer and re-validate here (same
//! phase, same question id) before acting, so a racing host command can never
//! be double-applied.

use super::acts::ActId;
use super::player::Player;
use super::question::CurrentQuestion;
use super::room::{ActState, BossState, GameConfigPatch, PendingRevive, Phase, Room};
use super::wager::WagerTier;
use super::GameError;
use crate::catalog::QuestionRecord;
use crate::protocol::room_codes::generate_player_id;
use crate::protocol::{validation, ConnectionId, PlayerId, MAX_PLAYERS_PER_ROOM};
use serde::{Deserialize, Serialize};

/// What `question:next` moved the room into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Next question began its countdown
    Question,
    /// Next wager-round question opened its wager phase
    Wager,
    /// Act exhausted; waiting on the host
    Intermission,
    /// No act was active
    Ended,
}

/// Per-player outcome summary, delivered privately at reveal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevealOutcome {
    pub player_id: PlayerId,
    pub correct_index: usize,
    pub your_answer: Option<usize>,
    pub correct: bool,
    pub score_delta: i64,
    pub coins_delta: i64,
    pub lives_delta: i64,
    pub speed_bonus: u64,
    pub shield_used: bool,
    pub double_points_used: bool,
    pub buyback_used: bool,
    pub eliminated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wager: Option<u64>,
}

/// Everything one reveal produced.
#[derive(Debug)]
pub struct RevealReport {
    pub outcomes: Vec<RevealOutcome>,
    pub game_over: bool,
    pub boss_defeated: bool,
}

impl Room {
    /// `game:configure`: lobby-only partial reconfiguration. Lobby players are
    /// re-seeded so everyone starts the game on the configured footing.
    pub fn configure(&mut self, patch: &GameConfigPatch) -> Result<(), GameError> {
        if self.phase != Phase::Lobby {
            return Err(GameError::GameInProgress);
        }
        self.config.apply(patch);
        for player in self.players.values_mut() {
            player.lives = self.config.max_lives;
            player.coins = self.config.starting_coins;
        }
        Ok(())
    }

    /// `room:join`: create a player. Only possible in the lobby; players are
    /// never removed afterwards.
    pub fn join(
        &mut self,
        name: &str,
        connection: ConnectionId,
        now_ms: i64,
    ) -> Result<PlayerId, GameError> {
        if self.phase != Phase::Lobby {
            return Err(GameError::GameInProgress);
        }
        if self.players.len() >= MAX_PLAYERS_PER_ROOM {
            return Err(GameError::RoomFull);
        }
        validation::validate_player_name(name).map_err(GameError::InvalidInput)?;
        validation::validate_name_uniqueness(name, &self.players)
            .map_err(|_| GameError::NameTaken)?;

        let player_id = generate_player_id();
        let player = Player::new(
            player_id.clone(),
            name.to_string(),
            connection,
            self.config.max_lives,
            self.config.starting_coins,
            now_ms,
        );
        self.connection_to_player
            .insert(connection, player_id.clone());
        self.players.insert(player_id.clone(), player);
        Ok(player_id)
    }

    /// `room:resume` for the host connection.
    pub fn resume_host(
        &mut self,
        host_token: &str,
        connection: ConnectionId,
    ) -> Result<(), GameError> {
        if host_token != self.host_token {
            return Err(GameError::NotAuthorized);
        }
        self.host_connection = Some(connection);
        Ok(())
    }

    /// `room:resume` for a player: re-associate the connection and flip
    /// `connected` without touching any game state.
    pub fn resume_player(
        &mut self,
        player_id: &str,
        connection: ConnectionId,
    ) -> Result<(), GameError> {
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        if let Some(stale) = player.connection_id.take() {
            self.connection_to_player.remove(&stale);
        }
        player.connection_id = Some(connection);
        player.connected = true;
        self.connection_to_player
            .insert(connection, player_id.to_string());
        Ok(())
    }

    /// Connection went away (socket close or `room:leave`). Players are
    /// flipped to disconnected, never removed.
    pub fn mark_disconnected(&mut self, connection: ConnectionId) -> Option<PlayerId> {
        self.watchers.remove(&connection);
        if self.host_connection == Some(connection) {
            self.host_connection = None;
            return None;
        }
        let player_id = self.connection_to_player.remove(&connection)?;
        if let Some(player) = self.players.get_mut(&player_id) {
            player.connected = false;
            player.connection_id = None;
        }
        Some(player_id)
    }

    /// Authorize a host-scoped operation.
    pub fn require_host(&self, host_token: &str) -> Result<(), GameError> {
        if host_token == self.host_token {
            Ok(())
        } else {
            Err(GameError::NotAuthorized)
        }
    }

    /// `game:start` / `act:start` / `boss:start`: begin `act` with its
    /// question pool. Acts only move forward; the first question starts
    /// immediately (or its wager phase does, in the wager round).
    pub fn start_act(
        &mut self,
        act: ActId,
        questions: Vec<QuestionRecord>,
        now_ms: i64,
    ) -> Result<(), GameError> {
        match self.phase {
            Phase::Lobby | Phase::Intermission | Phase::Shop => {}
            _ => return Err(GameError::WrongPhase),
        }
        if let Some(current) = self.current_act() {
            if act <= current {
                return Err(GameError::ActOrderViolation);
            }
        }
        if questions.is_empty() {
            return Err(GameError::NoQuestionsForAct);
        }

        let mut questions = questions;
        fastrand::shuffle(&mut questions);
        self.act_state = Some(ActState {
            act_id: act,
            questions,
            question_index: 0,
        });
        self.boss_state = (act == ActId::BossFight).then(|| BossState {
            hp: self.config.boss_hp,
            max_hp: self.config.boss_hp,
        });
        self.shop_open = false;
        self.wager_state = None;

        // SAFETY: act_state was just set with a non-empty list.
        #[allow(clippy::expect_used)]
        let first = self
            .take_next_question()
            .expect("freshly started act has questions");
        if act == ActId::WagerRound {
            self.begin_wager(first, now_ms);
        } else {
            self.start_question_internal(first, now_ms, None, None);
        }
        Ok(())
    }

    pub(crate) fn take_next_question(&mut self) -> Option<QuestionRecord> {
        let act = self.act_state.as_mut()?;
        let question = act.questions.get(act.question_index)?.clone();
        act.question_index += 1;
        Some(question)
    }

    /// Arm a question: countdown, timestamps, per-player reset. The caller
    /// (server layer) schedules the countdown one-shot from
    /// `countdown_ends_at`.
    pub(crate) fn start_question_internal(
        &mut self,
        question: QuestionRecord,
        now_ms: i64,
        duration_override_ms: Option<i64>,
        blackout_until: Option<i64>,
    ) {
        for player in self.players.values_mut() {
            player.locked_in = false;
        }
        let duration = duration_override_ms.unwrap_or_else(|| {
            self.current_act()
                .map_or(22_000, |act| act.config().question_duration_ms)
        });
        self.timers.cancel_countdown();
        self.current_question = Some(CurrentQuestion::new(
            question,
            now_ms,
            self.config.countdown_ms,
            duration,
            blackout_until,
        ));
        self.shop_open = false;
        self.phase = Phase::Countdown;
    }

    /// Countdown one-shot fired. Only transitions if the room is still in
    /// countdown for the same question; stale timers return false and change
    /// nothing.
    pub fn finish_countdown(&mut self, question_id: &str) -> bool {
        if self.phase != Phase::Countdown {
            return false;
        }
        let Some(q) = self.current_question.as_ref() else {
            return false;
        };
        if q.id() != question_id || q.locked {
            return false;
        }
        self.phase = if self.boss_state.is_some() {
            Phase::Boss
        } else {
            Phase::Question
        };
        true
    }

    /// `player:answer`. Last submission wins; an ALL_IN wager player may
    /// overwrite once more after locking in (the final swap).
    pub fn submit_answer(
        &mut self,
        player_id: &str,
        answer_index: usize,
        now_ms: i64,
    ) -> Result<(), GameError> {
        if !matches!(self.phase, Phase::Question | Phase::Boss) {
            return Err(GameError::WrongPhase);
        }
        let reveal_at = self.reveal_at().ok_or(GameError::NoActiveQuestion)?;
        let is_wager_question = self.current_act() == Some(ActId::WagerRound);
        let tier = self
            .wager_state
            .as_ref()
            .and_then(|w| w.tiers.get(player_id).copied());

        let q = self
            .current_question
            .as_mut()
            .ok_or(GameError::NoActiveQuestion)?;
        if q.locked {
            return Err(GameError::AnswerLocked);
        }
        validation::validate_answer_index(answer_index, q.question.choices.len())
            .map_err(|_| GameError::AnswerOutOfRange)?;

        let player_ends_at = q.player_ends_at(player_id);
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        if player.eliminated {
            return Err(GameError::Eliminated);
        }
        if now_ms > player_ends_at.min(reveal_at) {
            return Err(GameError::TimeUp);
        }

        let swapping = player.locked_in;
        if swapping {
            let all_in = is_wager_question && tier == Some(WagerTier::AllIn);
            if !all_in || player.wager_swap_used {
                return Err(GameError::AnswerLocked);
            }
            player.wager_swap_used = true;
        }

        q.answers.insert(player_id.to_string(), answer_index);
        Ok(())
    }

    /// `player:lockin`. Returns true when this lock-in completed the room
    /// (every active player done) and armed the forced reveal.
    pub fn lock_in(&mut self, player_id: &str, now_ms: i64) -> Result<bool, GameError> {
        if !matches!(self.phase, Phase::Question | Phase::Boss) {
            return Err(GameError::WrongPhase);
        }
        let reveal_at = self.reveal_at().ok_or(GameError::NoActiveQuestion)?;
        {
            let q = self
                .current_question
                .as_mut()
                .ok_or(GameError::NoActiveQuestion)?;
            if q.locked {
                return Err(GameError::AnswerLocked);
            }
            let has_answer = q.answers.contains_key(player_id);
            let player_ends_at = q.player_ends_at(player_id);

            let player = self
                .players
                .get_mut(player_id)
                .ok_or(GameError::PlayerNotFound)?;
            if player.eliminated {
                return Err(GameError::Eliminated);
            }
            if player.locked_in {
                return Err(GameError::AnswerLocked);
            }
            if !has_answer {
                return Err(GameError::LockinWithoutAnswer);
            }
            if now_ms > player_ends_at.min(reveal_at) {
                return Err(GameError::TimeUp);
            }

            player.locked_in = true;
            q.lockin_time.insert(player_id.to_string(), now_ms);
        }

        if self.all_active_done(now_ms) {
            if let Some(q) = self.current_question.as_mut() {
                if q.forced_reveal_at.is_none() {
                    q.forced_reveal_at = Some(now_ms);
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// `question:reveal` (host). Legal once the reveal time has passed or the
    /// forced-reveal short-circuit armed. Adjudicates exactly once.
    pub fn reveal(&mut self, now_ms: i64) -> Result<RevealReport, GameError> {
        if !matches!(self.phase, Phase::Question | Phase::Boss) {
            return Err(GameError::WrongPhase);
        }
        let q = self
            .current_question
            .as_ref()
            .ok_or(GameError::NoActiveQuestion)?;
        if q.locked {
            return Err(GameError::AlreadyRevealed);
        }
        let reveal_at = self.reveal_at().ok_or(GameError::NoActiveQuestion)?;
        if now_ms < reveal_at {
            return Err(GameError::RevealTooEarly);
        }

        let report = self.adjudicate(now_ms);
        self.phase = if report.game_over {
            self.timers.cancel_all();
            Phase::Ended
        } else {
            Phase::Reveal
        };
        Ok(report)
    }

    /// `question:next` (host): advance out of reveal/shop.
    pub fn advance(&mut self, now_ms: i64) -> Result<Advance, GameError> {
        if !matches!(self.phase, Phase::Reveal | Phase::Shop) {
            return Err(GameError::WrongPhase);
        }
        self.shop_open = false;
        self.current_question = None;

        if self.act_state.is_none() {
            self.phase = Phase::Ended;
            return Ok(Advance::Ended);
        }
        match self.take_next_question() {
            Some(question) => {
                if self.current_act() == Some(ActId::WagerRound) {
                    self.begin_wager(question, now_ms);
                    Ok(Advance::Wager)
                } else {
                    self.start_question_internal(question, now_ms, None, None);
                    Ok(Advance::Question)
                }
            }
            None => {
                self.phase = Phase::Intermission;
                Ok(Advance::Intermission)
            }
        }
    }

    /// `revive:request` (player).
    pub fn request_revive(&mut self, player_id: &str, now_ms: i64) -> Result<(), GameError> {
        if matches!(self.phase, Phase::Question | Phase::Boss) {
            return Err(GameError::ReviveNotAllowed);
        }
        if self.current_act() == Some(ActId::BossFight) {
            return Err(GameError::ReviveNotAllowed);
        }
        if self.pending_revive.is_some() {
            return Err(GameError::RevivePending);
        }
        let player = self
            .players
            .get(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        if !player.eliminated {
            return Err(GameError::NotEliminated);
        }
        self.pending_revive = Some(PendingRevive {
            player_id: player.id.clone(),
            player_name: player.name.clone(),
            requested_at: now_ms,
        });
        Ok(())
    }

    /// `revive:approve` / `revive:decline` (host). Clears the ticket either
    /// way and returns whose it was.
    pub fn resolve_revive(&mut self, approve: bool) -> Result<(PlayerId, bool), GameError> {
        let ticket = self
            .pending_revive
            .take()
            .ok_or(GameError::NoRevivePending)?;
        if approve {
            if let Some(player) = self.players.get_mut(&ticket.player_id) {
                player.lives = self.config.max_lives;
                player.eliminated = false;
            }
        }
        Ok((ticket.player_id, approve))
    }

    /// `player:buyback`: self-service revive for coins.
    pub fn buyback(&mut self, player_id: &str) -> Result<(), GameError> {
        let cost = self.config.buyback_cost_coins;
        let player = self
            .players
            .get_mut(player_id)
            .ok_or(GameError::PlayerNotFound)?;
        if !player.eliminated {
            return Err(GameError::NotEliminated);
        }
        if player.coins < cost {
            return Err(GameError::NotEnoughCoins);
        }
        player.coins -= cost;
        player.lives = 1;
        player.eliminated = false;
        Ok(())
    }
}
