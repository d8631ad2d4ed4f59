//! Scheduled one-shots: the question countdown and the five wager stages.
//!
//! A timer callback re-acquires the room lock and re-validates its
//! precondition (same phase, same question id, stage still ahead) before
//! acting, so racing host commands and cancelled phases are tolerated. A
//! timer that fires after its room was destroyed finds nothing and returns.

use super::{now_ms, GameServer};
use crate::game::room::{Phase, Room};
use crate::game::wager::WAGER_STAGE_OFFSETS_MS;
use crate::game::WagerStage;
use crate::protocol::ServerMessage;
use std::sync::Arc;
use std::time::Duration;

impl GameServer {
    /// Arm the countdown one-shot for the room's current question. Replaces
    /// any previous countdown timer.
    pub(crate) fn schedule_question_countdown(&self, room: &mut Room) {
        if room.phase != Phase::Countdown {
            return;
        }
        let Some(question) = room.current_question.as_ref() else {
            return;
        };
        let Some(server) = self.weak.upgrade() else {
            return;
        };
        let code = room.code.clone();
        let question_id = question.id().to_string();
        let delay_ms = (question.countdown_ends_at - now_ms()).max(0);

        #[allow(clippy::cast_sign_loss)]
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(delay_ms as u64)).await;
            server.on_countdown_fired(&code, &question_id).await;
        });
        room.timers.cancel_countdown();
        room.timers.countdown = Some(handle.abort_handle());
    }

    /// Arm the five wager stage one-shots at their fixed offsets.
    pub(crate) fn schedule_wager_stages(&self, room: &mut Room) {
        let Some(state) = room.wager_state.as_ref() else {
            return;
        };
        let started_at = state.started_at;
        room.timers.cancel_wager_stages();

        let now = now_ms();
        for (stage, offset_ms) in WAGER_STAGE_OFFSETS_MS {
            let Some(server) = self.weak.upgrade() else {
                return;
            };
            let delay_ms = (started_at + offset_ms - now).max(0);
            let code = room.code.clone();
            #[allow(clippy::cast_sign_loss)]
            let handle = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms as u64)).await;
                server.on_wager_stage_fired(&code, stage).await;
            });
            room.timers.wager_stages.push(handle.abort_handle());
        }
    }

    async fn on_countdown_fired(&self, code: &str, question_id: &str) {
        let Some(handle) = self.registry.get(code) else {
            return;
        };
        let mut room = handle.lock().await;
        if !room.finish_countdown(question_id) {
            tracing::debug!(room_code = %code, question_id, "Stale countdown timer ignored");
            return;
        }
        let now = now_ms();
        room.touch(now);
        tracing::debug!(room_code = %code, question_id, phase = ?room.phase, "Question opened");
        self.send_snapshots(&room, now);
    }

    async fn on_wager_stage_fired(&self, code: &str, stage: WagerStage) {
        let Some(handle) = self.registry.get(code) else {
            return;
        };
        let mut room = handle.lock().await;
        let now = now_ms();
        let Some(effects) = room.wager_stage_fired(stage, now) else {
            tracing::debug!(room_code = %code, ?stage, "Stale wager stage timer ignored");
            return;
        };
        room.touch(now);
        tracing::debug!(room_code = %code, ?stage, "Wager stage advanced");

        self.send_snapshots(&room, now);
        if effects.siren {
            self.broadcast_room(&room, &Arc::new(ServerMessage::WagerSiren));
        }
        if let Some(spotlight) = effects.spotlight {
            self.broadcast_room(
                &room,
                &Arc::new(ServerMessage::WagerSpotlight(Box::new(spotlight))),
            );
        }
        for (player_id, hint) in effects.extra_hints {
            self.send_to_player(&room, &player_id, ServerMessage::WagerExtraHint { hint });
        }
    }
}
