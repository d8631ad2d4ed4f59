//! Field validation for inbound events.
//!
//! Validators return the human-readable reason on failure; callers map them
//! into domain errors. A failed validation never mutates room state.

use super::types::{MAX_PLAYER_NAME_LENGTH, MIN_PLAYER_NAME_LENGTH, ROOM_CODE_LENGTH};
use crate::game::Player;
use crate::protocol::PlayerId;
use std::collections::HashMap;

/// Validate a prospective player name: 2-18 characters, no surrounding
/// whitespace, alphanumeric (any script) plus space, dash, underscore,
/// apostrophe.
pub fn validate_player_name(name: &str) -> Result<(), String> {
    let char_count = name.chars().count();
    if char_count < MIN_PLAYER_NAME_LENGTH {
        return Err(format!(
            "Name must be at least {MIN_PLAYER_NAME_LENGTH} characters"
        ));
    }
    if char_count > MAX_PLAYER_NAME_LENGTH {
        return Err(format!(
            "Name must be at most {MAX_PLAYER_NAME_LENGTH} characters"
        ));
    }
    if name.trim().len() != name.len() || name.trim().is_empty() {
        return Err("Name cannot start or end with whitespace".to_string());
    }
    for ch in name.chars() {
        if ch.is_alphanumeric() || matches!(ch, ' ' | '-' | '_' | '\'') {
            continue;
        }
        return Err(format!("Name contains disallowed character '{ch}'"));
    }
    Ok(())
}

/// Validate a room code shape (length and alphanumeric). Case is normalized
/// by the caller before lookup.
pub fn validate_room_code(code: &str) -> Result<(), String> {
    if code.chars().count() != ROOM_CODE_LENGTH {
        return Err(format!("Room code must be {ROOM_CODE_LENGTH} characters"));
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Room code must be alphanumeric".to_string());
    }
    Ok(())
}

/// Names are unique within a room, case-insensitively.
pub fn validate_name_uniqueness(
    name: &str,
    players: &HashMap<PlayerId, Player>,
) -> Result<(), String> {
    let lowered = name.to_lowercase();
    if players.values().any(|p| p.name.to_lowercase() == lowered) {
        return Err("Name already taken".to_string());
    }
    Ok(())
}

/// An answer index must address one of the question's choices.
pub fn validate_answer_index(index: usize, choice_count: usize) -> Result<(), String> {
    if index >= choice_count {
        return Err("Answer index out of range".to_string());
    }
    Ok(())
}
