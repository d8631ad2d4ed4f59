//! Shared helpers for integration tests.

use quiz_rush_server::catalog::{QuestionPack, QuestionRecord};
use quiz_rush_server::game::room::{GameConfig, Room};
use quiz_rush_server::game::{ActId, ACT_ORDER};
use quiz_rush_server::protocol::PlayerId;
use std::collections::HashMap;
use uuid::Uuid;

#[allow(dead_code)]
pub fn test_config() -> GameConfig {
    GameConfig {
        max_lives: 3,
        countdown_ms: 3_000,
        starting_coins: 150,
        buyback_cost_coins: 200,
        boss_hp: 6,
    }
}

#[allow(dead_code)]
pub fn question(id: &str, correct_index: usize, value: u64, hard: bool) -> QuestionRecord {
    QuestionRecord {
        id: id.to_string(),
        prompt: format!("Prompt for {id}"),
        choices: vec!["A".into(), "B".into(), "C".into(), "D".into()],
        correct_index,
        value,
        hard,
        category: "General".to_string(),
        hint: Some("A useful hint".to_string()),
        extra_hint: Some("An even better hint".to_string()),
    }
}

/// A pack with three questions in every act.
#[allow(dead_code)]
pub fn full_pack(id: &str) -> QuestionPack {
    let acts: HashMap<ActId, Vec<QuestionRecord>> = ACT_ORDER
        .iter()
        .map(|act| {
            let questions = (0..3_usize)
                .map(|i| question(&format!("{act}-{i}"), i % 4, 100, false))
                .collect();
            (*act, questions)
        })
        .collect();
    QuestionPack {
        id: id.to_string(),
        title: "Test Pack".to_string(),
        acts,
    }
}

/// A lobby room with `player_count` joined players, created at t=0.
#[allow(dead_code)]
pub fn room_with_players(player_count: usize) -> (Room, Vec<PlayerId>) {
    let mut room = Room::new(
        "ABCDE".to_string(),
        "Host".to_string(),
        "host-token".to_string(),
        "classic".to_string(),
        test_config(),
        0,
    );
    let mut player_ids = Vec::new();
    for i in 0..player_count {
        let id = room
            .join(&format!("Player{i}"), Uuid::new_v4(), 0)
            .expect("lobby join");
        player_ids.push(id);
    }
    (room, player_ids)
}
