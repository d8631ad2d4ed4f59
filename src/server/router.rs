//! Inbound event dispatch.
//!
//! Every inbound event produces exactly one acknowledgement. On success the
//! router broadcasts the public snapshot to the room group, sends the
//! host-scoped snapshot to the host connection, and only then emits any
//! per-player private envelopes. Failed operations mutate nothing.

use super::{now_ms, GameServer};
use crate::game::room::{Phase, Room};
use crate::game::{ActId, GameError, ItemUse};
use crate::protocol::{
    validation, ClientEnvelope, ClientEvent, ConnectionId, HostRoomState, PublicRoomState,
    ServerMessage,
};
use crate::catalog::QuestionRecord;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

impl GameServer {
    /// Handle one inbound envelope and return its acknowledgement.
    pub async fn dispatch(&self, connection: ConnectionId, envelope: ClientEnvelope) -> Arc<ServerMessage> {
        let seq = envelope.seq;
        let event_name = envelope.event.name();
        match self.handle_event(connection, envelope.event).await {
            Ok(data) => Arc::new(ServerMessage::ack_ok(seq, data)),
            Err(error) => {
                tracing::debug!(%connection, event = event_name, %error, "Event rejected");
                Arc::new(ServerMessage::ack_err(seq, &error))
            }
        }
    }

    fn lookup(&self, code: &str) -> Result<Arc<Mutex<Room>>, GameError> {
        validation::validate_room_code(code).map_err(GameError::InvalidInput)?;
        self.registry.get(code).ok_or(GameError::RoomNotFound)
    }

    fn questions_for(&self, pack_id: &str, act: ActId) -> Result<Vec<QuestionRecord>, GameError> {
        let questions = self
            .catalog
            .questions(pack_id, act)
            .ok_or(GameError::NoQuestionsForAct)?;
        if questions.is_empty() {
            return Err(GameError::NoQuestionsForAct);
        }
        Ok(questions)
    }

    /// Schedule whatever the room's new phase needs.
    fn arm_phase_timers(&self, room: &mut Room) {
        match room.phase {
            Phase::Countdown => self.schedule_question_countdown(room),
            Phase::Wager => self.schedule_wager_stages(room),
            _ => {}
        }
    }

    async fn handle_event(
        &self,
        connection: ConnectionId,
        event: ClientEvent,
    ) -> Result<Option<Value>, GameError> {
        let now = now_ms();
        match event {
            ClientEvent::RoomCreate { host_name, pack_id } => {
                validation::validate_player_name(&host_name).map_err(GameError::InvalidInput)?;
                let pack_id = match pack_id {
                    Some(id) => {
                        if self.catalog.pack(&id).is_none() {
                            return Err(GameError::PackNotFound);
                        }
                        id
                    }
                    None => self
                        .catalog
                        .default_pack_id()
                        .ok_or(GameError::NoPacksLoaded)?,
                };
                let (code, host_token, handle) =
                    self.registry
                        .create(&host_name, &pack_id, self.config.game_defaults, now)?;
                let mut room = handle.lock().await;
                room.host_connection = Some(connection);
                self.registry.associate(connection, &code);
                let state = HostRoomState::snapshot(&room, now);
                Ok(Some(json!({
                    "code": code,
                    "host_token": host_token,
                    "state": state,
                })))
            }

            ClientEvent::RoomJoin { code, name } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                let player_id = room.join(&name, connection, now)?;
                self.registry.associate(connection, &room.code);
                tracing::info!(room_code = %room.code, %player_id, name = %name, "Player joined");
                self.send_snapshots(&room, now);
                Ok(Some(json!({
                    "player_id": player_id,
                    "state": PublicRoomState::snapshot(&room, now),
                })))
            }

            ClientEvent::RoomResume {
                code,
                player_id,
                host_token,
            } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                if let Some(token) = host_token {
                    room.resume_host(&token, connection)?;
                    self.registry.associate(connection, &room.code);
                    self.send_snapshots(&room, now);
                    return Ok(Some(json!({
                        "state": HostRoomState::snapshot(&room, now),
                    })));
                }
                let Some(player_id) = player_id else {
                    return Err(GameError::InvalidInput(
                        "Provide player_id or host_token".to_string(),
                    ));
                };
                room.resume_player(&player_id, connection)?;
                self.registry.associate(connection, &room.code);
                tracing::info!(room_code = %room.code, %player_id, "Player resumed");
                self.send_snapshots(&room, now);
                self.replay_wager_perks(&room, &player_id);
                Ok(Some(json!({
                    "player_id": player_id,
                    "state": PublicRoomState::snapshot(&room, now),
                })))
            }

            ClientEvent::RoomWatch { code } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.watchers.insert(connection);
                self.registry.associate(connection, &room.code);
                Ok(Some(json!({
                    "state": PublicRoomState::snapshot(&room, now),
                })))
            }

            ClientEvent::RoomLeave { code, player_id: _ } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.mark_disconnected(connection);
                self.registry.drop_connection(connection);
                self.send_snapshots(&room, now);
                Ok(None)
            }

            ClientEvent::GameConfigure {
                code,
                host_token,
                config,
            } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.require_host(&host_token)?;
                room.configure(&config)?;
                self.send_snapshots(&room, now);
                Ok(None)
            }

            ClientEvent::GameStart { code, host_token } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.require_host(&host_token)?;
                if room.phase != Phase::Lobby {
                    return Err(GameError::GameInProgress);
                }
                let questions = self.questions_for(&room.pack_id, ActId::Homeroom)?;
                room.start_act(ActId::Homeroom, questions, now)?;
                self.arm_phase_timers(&mut room);
                tracing::info!(room_code = %room.code, "Game started");
                self.send_snapshots(&room, now);
                Ok(None)
            }

            ClientEvent::ActStart {
                code,
                host_token,
                act_id,
            } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.require_host(&host_token)?;
                let questions = self.questions_for(&room.pack_id, act_id)?;
                room.start_act(act_id, questions, now)?;
                self.arm_phase_timers(&mut room);
                tracing::info!(room_code = %room.code, act = %act_id, "Act started");
                self.send_snapshots(&room, now);
                Ok(None)
            }

            ClientEvent::BossStart { code, host_token } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.require_host(&host_token)?;
                let questions = self.questions_for(&room.pack_id, ActId::BossFight)?;
                room.start_act(ActId::BossFight, questions, now)?;
                self.arm_phase_timers(&mut room);
                tracing::info!(room_code = %room.code, "Boss fight started");
                self.send_snapshots(&room, now);
                Ok(None)
            }

            ClientEvent::QuestionReveal { code, host_token } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.require_host(&host_token)?;
                let report = room.reveal(now)?;
                // Public snapshot (now carrying locked=true) goes out before
                // any private outcome envelope.
                self.send_snapshots(&room, now);
                for outcome in report.outcomes {
                    let player_id = outcome.player_id.clone();
                    self.send_to_player(
                        &room,
                        &player_id,
                        ServerMessage::PlayerReveal(Box::new(outcome)),
                    );
                }
                if report.game_over {
                    tracing::info!(
                        room_code = %room.code,
                        boss_defeated = report.boss_defeated,
                        "Game ended"
                    );
                }
                Ok(None)
            }

            ClientEvent::QuestionNext { code, host_token } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.require_host(&host_token)?;
                room.advance(now)?;
                self.arm_phase_timers(&mut room);
                self.send_snapshots(&room, now);
                Ok(None)
            }

            ClientEvent::ShopOpen {
                code,
                host_token,
                open,
            } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.require_host(&host_token)?;
                room.set_shop_open(open)?;
                self.send_snapshots(&room, now);
                Ok(None)
            }

            ClientEvent::PlayerAnswer {
                code,
                player_id,
                answer_index,
            } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.submit_answer(&player_id, answer_index, now)?;
                self.send_snapshots(&room, now);
                Ok(None)
            }

            ClientEvent::PlayerLockin { code, player_id } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                let forced = room.lock_in(&player_id, now)?;
                if forced {
                    tracing::debug!(room_code = %room.code, "All active players done; reveal unlocked");
                }
                self.send_snapshots(&room, now);
                Ok(None)
            }

            ClientEvent::PlayerBuyback { code, player_id } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.buyback(&player_id)?;
                tracing::info!(room_code = %room.code, %player_id, "Manual buyback");
                self.send_snapshots(&room, now);
                Ok(None)
            }

            ClientEvent::ShopBuy {
                code,
                player_id,
                item_id,
            } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.buy_item(&player_id, item_id)?;
                self.send_snapshots(&room, now);
                Ok(None)
            }

            ClientEvent::ItemUse {
                code,
                player_id,
                item_id,
            } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                let result = room.use_item(&player_id, item_id, now)?;
                self.send_snapshots(&room, now);
                let envelope = match result {
                    ItemUse::FiftyFifty { removed_indexes } => {
                        ServerMessage::ItemFiftyFifty { removed_indexes }
                    }
                    ItemUse::FreezeTime { added_ms, ends_at } => {
                        ServerMessage::ItemFreezeTime { added_ms, ends_at }
                    }
                };
                self.send_to_player(&room, &player_id, envelope);
                Ok(None)
            }

            ClientEvent::WagerSet {
                code,
                player_id,
                amount,
            } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                let recorded = room.set_wager(&player_id, amount, now)?;
                self.send_snapshots(&room, now);
                Ok(Some(json!({ "recorded": recorded })))
            }

            ClientEvent::WagerLock { code, host_token } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.require_host(&host_token)?;
                if room.phase != Phase::Wager {
                    return Err(GameError::NotInWagerPhase);
                }
                let spotlight = room.lock_wagers(now).ok_or(GameError::WagersLocked)?;
                self.send_snapshots(&room, now);
                self.broadcast_room(
                    &room,
                    &Arc::new(ServerMessage::WagerSpotlight(Box::new(spotlight))),
                );
                Ok(None)
            }

            ClientEvent::WagerSpotlightEnd { code, host_token } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.require_host(&host_token)?;
                let perks = room.end_spotlight(now)?;
                self.arm_phase_timers(&mut room);
                self.send_snapshots(&room, now);
                for perk in perks {
                    if let Some(removed_indexes) = perk.removed_indexes {
                        self.send_to_player(
                            &room,
                            &perk.player_id,
                            ServerMessage::WagerFiftyFifty { removed_indexes },
                        );
                    }
                    if let Some(hint) = perk.extra_hint {
                        self.send_to_player(
                            &room,
                            &perk.player_id,
                            ServerMessage::WagerExtraHint { hint },
                        );
                    }
                }
                Ok(None)
            }

            ClientEvent::ReviveRequest { code, player_id } => {
                let handle = self.lookup(&code)?;
                let mut room = handle.lock().await;
                room.touch(now);
                room.request_revive(&player_id, now)?;
                self.send_snapshots(&room, now);
                self.send_to_player(&room, &player_id, ServerMessage::RevivePending);
                Ok(None)
            }

            ClientEvent::ReviveApprove { code, host_token } => {
                self.resolve_revive_event(&code, &host_token, true, now).await
            }

            ClientEvent::ReviveDecline { code, host_token } => {
                self.resolve_revive_event(&code, &host_token, false, now)
                    .await
            }
        }
    }

    async fn resolve_revive_event(
        &self,
        code: &str,
        host_token: &str,
        approve: bool,
        now: i64,
    ) -> Result<Option<Value>, GameError> {
        let handle = self.lookup(code)?;
        let mut room = handle.lock().await;
        room.touch(now);
        room.require_host(host_token)?;
        let (player_id, approved) = room.resolve_revive(approve)?;
        tracing::info!(room_code = %room.code, %player_id, approved, "Revive resolved");
        self.send_snapshots(&room, now);
        self.send_to_player(&room, &player_id, ServerMessage::ReviveResult { approved });
        Ok(None)
    }

    /// After a resume during a live wager question, re-send the stored perks
    /// for that player. Removals are replayed verbatim, never recomputed.
    fn replay_wager_perks(&self, room: &Room, player_id: &str) {
        let wager_question_active = room.current_act() == Some(ActId::WagerRound)
            && room.wager_state.is_some()
            && room
                .current_question
                .as_ref()
                .is_some_and(|q| !q.locked);
        if !wager_question_active {
            return;
        }
        for perk in room.wager_perks() {
            if perk.player_id != player_id {
                continue;
            }
            if let Some(removed_indexes) = perk.removed_indexes {
                self.send_to_player(
                    room,
                    player_id,
                    ServerMessage::WagerFiftyFifty { removed_indexes },
                );
            }
            if let Some(hint) = perk.extra_hint {
                self.send_to_player(room, player_id, ServerMessage::WagerExtraHint { hint });
            }
        }
    }
}
