use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error_codes::ErrorCode;
use super::snapshots::{HostRoomState, PublicRoomState};
use super::types::PlayerId;
use crate::game::engine::RevealOutcome;
use crate::game::room::GameConfigPatch;
use crate::game::wager::WagerSpotlight;
use crate::game::{ActId, ItemId};

/// Inbound envelope: a client-chosen sequence number plus the event. The
/// acknowledgement for the event echoes `seq`.
#[derive(Debug, Clone, Serialize)]
pub struct ClientEnvelope {
    pub seq: u64,
    #[serde(flatten)]
    pub event: ClientEvent,
}

// Deserialized by hand: `seq` sits next to the tagged event's `type`/`data`
// keys, which serde's flatten does not untangle reliably for tagged enums.
impl<'de> Deserialize<'de> for ClientEnvelope {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Helper {
            #[serde(default)]
            seq: u64,
            #[serde(rename = "type")]
            kind: String,
            data: Value,
        }

        let helper = Helper::deserialize(deserializer)?;
        let event = serde_json::from_value(serde_json::json!({
            "type": helper.kind,
            "data": helper.data,
        }))
        .map_err(serde::de::Error::custom)?;
        Ok(Self {
            seq: helper.seq,
            event,
        })
    }
}

/// Message types sent from client to server.
///
/// Every event carries its room code; host-scoped events additionally carry
/// the host token issued at `room:create`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ClientEvent {
    /// Create a room; the caller becomes its host
    #[serde(rename = "room:create")]
    RoomCreate {
        host_name: String,
        /// Defaults to the first loaded pack
        #[serde(skip_serializing_if = "Option::is_none")]
        pack_id: Option<String>,
    },
    /// Join a lobby as a player
    #[serde(rename = "room:join")]
    RoomJoin { code: String, name: String },
    /// Re-associate a dropped connection with an existing room
    #[serde(rename = "room:resume")]
    RoomResume {
        code: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
        #[serde(skip_serializing_if = "Option::is_none")]
        host_token: Option<String>,
    },
    /// Observe a room without playing
    #[serde(rename = "room:watch")]
    RoomWatch { code: String },
    /// Detach from a room (players stay on the roster, marked disconnected)
    #[serde(rename = "room:leave")]
    RoomLeave {
        code: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
    },
    /// Lobby-only partial reconfiguration; unknown keys are ignored
    #[serde(rename = "game:configure")]
    GameConfigure {
        code: String,
        host_token: String,
        config: GameConfigPatch,
    },
    /// Start the game at the first act
    #[serde(rename = "game:start")]
    GameStart { code: String, host_token: String },
    /// Start a specific act (forward-only)
    #[serde(rename = "act:start")]
    ActStart {
        code: String,
        host_token: String,
        act_id: ActId,
    },
    #[serde(rename = "question:reveal")]
    QuestionReveal { code: String, host_token: String },
    #[serde(rename = "question:next")]
    QuestionNext { code: String, host_token: String },
    #[serde(rename = "shop:open")]
    ShopOpen {
        code: String,
        host_token: String,
        open: bool,
    },
    /// Enter the boss fight
    #[serde(rename = "boss:start")]
    BossStart { code: String, host_token: String },
    #[serde(rename = "player:answer")]
    PlayerAnswer {
        code: String,
        player_id: PlayerId,
        answer_index: usize,
    },
    #[serde(rename = "player:lockin")]
    PlayerLockin { code: String, player_id: PlayerId },
    #[serde(rename = "player:buyback")]
    PlayerBuyback { code: String, player_id: PlayerId },
    #[serde(rename = "shop:buy")]
    ShopBuy {
        code: String,
        player_id: PlayerId,
        item_id: ItemId,
    },
    #[serde(rename = "item:use")]
    ItemUse {
        code: String,
        player_id: PlayerId,
        item_id: ItemId,
    },
    #[serde(rename = "wager:set")]
    WagerSet {
        code: String,
        player_id: PlayerId,
        amount: u64,
    },
    /// Host locks wagers ahead of the timed close
    #[serde(rename = "wager:lock")]
    WagerLock { code: String, host_token: String },
    /// Host dismisses the spotlight and starts the wager question
    #[serde(rename = "wager:spotlight_end")]
    WagerSpotlightEnd { code: String, host_token: String },
    #[serde(rename = "revive:request")]
    ReviveRequest { code: String, player_id: PlayerId },
    #[serde(rename = "revive:approve")]
    ReviveApprove { code: String, host_token: String },
    #[serde(rename = "revive:decline")]
    ReviveDecline { code: String, host_token: String },
}

impl ClientEvent {
    /// Room code carried by the event, if any (`room:create` has none yet).
    #[must_use]
    pub fn room_code(&self) -> Option<&str> {
        match self {
            Self::RoomCreate { .. } => None,
            Self::RoomJoin { code, .. }
            | Self::RoomResume { code, .. }
            | Self::RoomWatch { code }
            | Self::RoomLeave { code, .. }
            | Self::GameConfigure { code, .. }
            | Self::GameStart { code, .. }
            | Self::ActStart { code, .. }
            | Self::QuestionReveal { code, .. }
            | Self::QuestionNext { code, .. }
            | Self::ShopOpen { code, .. }
            | Self::BossStart { code, .. }
            | Self::PlayerAnswer { code, .. }
            | Self::PlayerLockin { code, .. }
            | Self::PlayerBuyback { code, .. }
            | Self::ShopBuy { code, .. }
            | Self::ItemUse { code, .. }
            | Self::WagerSet { code, .. }
            | Self::WagerLock { code, .. }
            | Self::WagerSpotlightEnd { code, .. }
            | Self::ReviveRequest { code, .. }
            | Self::ReviveApprove { code, .. }
            | Self::ReviveDecline { code, .. } => Some(code),
        }
    }

    /// Short name used in tracing fields.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RoomCreate { .. } => "room:create",
            Self::RoomJoin { .. } => "room:join",
            Self::RoomResume { .. } => "room:resume",
            Self::RoomWatch { .. } => "room:watch",
            Self::RoomLeave { .. } => "room:leave",
            Self::GameConfigure { .. } => "game:configure",
            Self::GameStart { .. } => "game:start",
            Self::ActStart { .. } => "act:start",
            Self::QuestionReveal { .. } => "question:reveal",
            Self::QuestionNext { .. } => "question:next",
            Self::ShopOpen { .. } => "shop:open",
            Self::BossStart { .. } => "boss:start",
            Self::PlayerAnswer { .. } => "player:answer",
            Self::PlayerLockin { .. } => "player:lockin",
            Self::PlayerBuyback { .. } => "player:buyback",
            Self::ShopBuy { .. } => "shop:buy",
            Self::ItemUse { .. } => "item:use",
            Self::WagerSet { .. } => "wager:set",
            Self::WagerLock { .. } => "wager:lock",
            Self::WagerSpotlightEnd { .. } => "wager:spotlight_end",
            Self::ReviveRequest { .. } => "revive:request",
            Self::ReviveApprove { .. } => "revive:approve",
            Self::ReviveDecline { .. } => "revive:decline",
        }
    }
}

/// Message types sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ServerMessage {
    /// Acknowledgement for one inbound event
    #[serde(rename = "ack")]
    Ack {
        seq: u64,
        ok: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_code: Option<ErrorCode>,
    },
    /// Public snapshot, broadcast to the room group
    #[serde(rename = "room:state")]
    RoomState(Box<PublicRoomState>),
    /// Host-scoped snapshot (adds the correct index, pending revive, acts)
    #[serde(rename = "host:state")]
    HostState(Box<HostRoomState>),
    /// Locked-wager tableau
    #[serde(rename = "wager:spotlight")]
    WagerSpotlight(Box<WagerSpotlight>),
    /// Last-seconds klaxon during the wager closing stage
    #[serde(rename = "wager:siren")]
    WagerSiren,
    /// Per-player outcome at reveal
    #[serde(rename = "player:reveal")]
    PlayerReveal(Box<RevealOutcome>),
    /// Redline-stage perk for BOLD-and-up wagers
    #[serde(rename = "wager:extra_hint")]
    WagerExtraHint { hint: String },
    /// Pre-generated 50/50 perk for HIGH_ROLLER-and-up wagers
    #[serde(rename = "wager:fifty_fifty")]
    WagerFiftyFifty { removed_indexes: Vec<usize> },
    /// fifty_fifty item confirmation
    #[serde(rename = "item:fifty_fifty")]
    ItemFiftyFifty { removed_indexes: Vec<usize> },
    /// freeze_time item confirmation
    #[serde(rename = "item:freeze_time")]
    ItemFreezeTime { added_ms: i64, ends_at: i64 },
    /// Revive ticket received, waiting on the host
    #[serde(rename = "revive:pending")]
    RevivePending,
    #[serde(rename = "revive:result")]
    ReviveResult { approved: bool },
    /// Out-of-band error (malformed frame, rate limit)
    #[serde(rename = "error")]
    Error {
        message: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        error_code: Option<ErrorCode>,
    },
}

impl ServerMessage {
    #[must_use]
    pub fn ack_ok(seq: u64, data: Option<Value>) -> Self {
        Self::Ack {
            seq,
            ok: true,
            data,
            error: None,
            error_code: None,
        }
    }

    #[must_use]
    pub fn ack_err(seq: u64, error: &crate::game::GameError) -> Self {
        Self::Ack {
            seq,
            ok: false,
            data: None,
            error: Some(error.to_string()),
            error_code: Some(error.code()),
        }
    }
}
