use super::types::{HOST_TOKEN_LENGTH, PLAYER_ID_LENGTH, ROOM_CODE_ALPHABET, ROOM_CODE_LENGTH};
use rand::RngExt;

/// Generate a room code from the confusion-safe alphabet.
/// Uppercase letters and digits only, minus I/L/O/0/1.
pub fn generate_room_code() -> String {
    let mut rng = rand::rng();
    (0..ROOM_CODE_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..ROOM_CODE_ALPHABET.len());
            // SAFETY: `idx` is produced by `random_range(0..len)`, so it is
            // always within [0, len).
            #[allow(clippy::indexing_slicing)]
            let ch = ROOM_CODE_ALPHABET[idx] as char;
            ch
        })
        .collect()
}

/// Generate an opaque 12-character player id, stable across reconnects.
pub fn generate_player_id() -> String {
    random_alphanumeric(PLAYER_ID_LENGTH)
}

/// Generate the opaque secret that authorizes host operations.
pub fn generate_host_token() -> String {
    random_alphanumeric(HOST_TOKEN_LENGTH)
}

fn random_alphanumeric(length: usize) -> String {
    const CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    let mut rng = rand::rng();
    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CHARS.len());
            // SAFETY: `idx` is produced by `random_range(0..len)`, so it is
            // always within [0, len).
            #[allow(clippy::indexing_slicing)]
            let ch = CHARS[idx] as char;
            ch
        })
        .collect()
}
