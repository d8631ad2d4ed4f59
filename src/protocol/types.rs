//! Core protocol identifier types and limits.

use uuid::Uuid;

/// Identifies one WebSocket connection for its lifetime.
pub type ConnectionId = Uuid;

/// Opaque player identifier, stable across reconnects.
pub type PlayerId = String;

/// Five-character uppercase room code.
pub type RoomCode = String;

/// Room codes avoid characters that read ambiguously when shouted across a
/// living room (I/L/O/0/1).
pub const ROOM_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub const ROOM_CODE_LENGTH: usize = 5;

pub const PLAYER_ID_LENGTH: usize = 12;

pub const HOST_TOKEN_LENGTH: usize = 32;

pub const MAX_PLAYERS_PER_ROOM: usize = 30;

pub const MIN_PLAYER_NAME_LENGTH: usize = 2;

pub const MAX_PLAYER_NAME_LENGTH: usize = 18;
