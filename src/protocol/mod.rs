// Protocol module: message types, error codes, snapshots, and room codes

pub mod error_codes;
pub mod messages;
pub mod room_codes;
pub mod snapshots;
pub mod types;
pub mod validation;

// Re-export everything for convenience, so external code can use
// `use crate::protocol::*`

// From error_codes
pub use error_codes::ErrorCode;

// From types
pub use types::{
    ConnectionId, PlayerId, RoomCode, HOST_TOKEN_LENGTH, MAX_PLAYERS_PER_ROOM,
    MAX_PLAYER_NAME_LENGTH, MIN_PLAYER_NAME_LENGTH, PLAYER_ID_LENGTH, ROOM_CODE_ALPHABET,
    ROOM_CODE_LENGTH,
};

// From messages
pub use messages::{ClientEnvelope, ClientEvent, ServerMessage};

// From snapshots
pub use snapshots::{
    HostRoomState, PublicActState, PublicBossState, PublicPlayer, PublicQuestion, PublicRoomState,
    PublicWagerState,
};

#[cfg(test)]
mod tests {
    use super::room_codes::{generate_host_token, generate_room_code};
    use super::validation::{validate_answer_index, validate_player_name, validate_room_code};
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_room_code_generation() {
        let code = generate_room_code();
        assert_eq!(code.len(), ROOM_CODE_LENGTH);
        // Confusion-safe alphabet only
        assert!(code
            .bytes()
            .all(|b| ROOM_CODE_ALPHABET.contains(&b)));
        assert!(!code.contains('I'));
        assert!(!code.contains('L'));
        assert!(!code.contains('O'));
        assert!(!code.contains('0'));
        assert!(!code.contains('1'));

        // Generate multiple codes to test uniqueness probability
        let mut codes = std::collections::HashSet::new();
        for _ in 0..100 {
            codes.insert(generate_room_code());
        }
        assert!(codes.len() > 90);
    }

    #[test]
    fn test_host_token_generation() {
        let token = generate_host_token();
        assert_eq!(token.len(), HOST_TOKEN_LENGTH);
        assert_ne!(generate_host_token(), generate_host_token());
    }

    #[test]
    fn test_player_name_validation() {
        assert!(validate_player_name("Jo").is_ok());
        assert!(validate_player_name("Valid Player").is_ok());
        assert!(validate_player_name("Player-One").is_ok());
        assert!(validate_player_name("玩家One").is_ok());
        assert!(validate_player_name("J").is_err()); // Too short
        assert!(validate_player_name("").is_err());
        assert!(validate_player_name("  ").is_err());
        assert!(validate_player_name(" spaced ").is_err());
        assert!(validate_player_name("a".repeat(19).as_str()).is_err()); // Too long
        assert!(validate_player_name("Player\tOne").is_err()); // Contains tab
    }

    #[test]
    fn test_room_code_validation() {
        assert!(validate_room_code("ABCDE").is_ok());
        assert!(validate_room_code("abcde").is_ok()); // Normalized upstream
        assert!(validate_room_code("ABCD").is_err());
        assert!(validate_room_code("ABCDEF").is_err());
        assert!(validate_room_code("AB DE").is_err());
        assert!(validate_room_code("").is_err());
    }

    #[test]
    fn test_answer_index_validation() {
        assert!(validate_answer_index(0, 4).is_ok());
        assert!(validate_answer_index(3, 4).is_ok());
        assert!(validate_answer_index(4, 4).is_err());
    }

    #[test]
    fn client_event_round_trips_through_json() {
        let raw = r#"{"seq":7,"type":"room:join","data":{"code":"ABCDE","name":"Dana"}}"#;
        let envelope: ClientEnvelope = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.seq, 7);
        match &envelope.event {
            ClientEvent::RoomJoin { code, name } => {
                assert_eq!(code, "ABCDE");
                assert_eq!(name, "Dana");
            }
            other => panic!("unexpected event: {other:?}"),
        }

        let back = serde_json::to_string(&envelope).unwrap();
        assert!(back.contains("room:join"));
    }

    #[test]
    fn server_messages_keep_wire_names() {
        let msg = ServerMessage::WagerSiren;
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("wager:siren"));

        let msg = ServerMessage::ReviveResult { approved: true };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("revive:result"));
    }

    fn expected_player_name_ok(name: &str) -> bool {
        let char_count = name.chars().count();
        if char_count < MIN_PLAYER_NAME_LENGTH || char_count > MAX_PLAYER_NAME_LENGTH {
            return false;
        }
        if name.trim().len() != name.len() || name.trim().is_empty() {
            return false;
        }
        name.chars()
            .all(|c| c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '\'')
    }

    proptest! {
        #[test]
        fn player_name_validation_matches_predicate(raw in proptest::collection::vec(any::<char>(), 0..=24)) {
            let candidate: String = raw.into_iter().collect();
            prop_assert_eq!(
                validate_player_name(&candidate).is_ok(),
                expected_player_name_ok(&candidate)
            );
        }

        #[test]
        fn room_code_validation_matches_predicate(raw in proptest::collection::vec(any::<char>(), 0..=8)) {
            let candidate: String = raw.into_iter().collect();
            let expected = candidate.chars().count() == ROOM_CODE_LENGTH
                && candidate.chars().all(|c| c.is_ascii_alphanumeric());
            prop_assert_eq!(validate_room_code(&candidate).is_ok(), expected);
        }
    }
}
