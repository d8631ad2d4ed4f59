//! The High-Stakes wager round: staged timeline, redline monotonicity, tier
//! classification at lock, the spotlight, perks, and the ALL_IN final swap.

mod common;

use common::{question, room_with_players};
use quiz_rush_server::game::room::Phase;
use quiz_rush_server::game::{ActId, GameError, WagerStage, WagerTier};

/// A room inside the wager phase with the given player scores, started at t=0.
fn wager_room(scores: &[u64]) -> (quiz_rush_server::game::room::Room, Vec<String>) {
    let (mut room, players) = room_with_players(scores.len());
    for (player, score) in players.iter().zip(scores) {
        room.player_mut(player).unwrap().score = *score;
    }
    room.start_act(ActId::WagerRound, vec![question("wq", 1, 200, false)], 0)
        .unwrap();
    assert_eq!(room.phase, Phase::Wager);
    (room, players)
}

#[test]
fn starting_the_wager_round_resets_per_player_fields() {
    let (mut room, players) = room_with_players(1);
    {
        let p = room.player_mut(&players[0]).unwrap();
        p.score = 400;
        p.wager = 99;
        p.wager_submitted = true;
        p.wager_swap_used = true;
    }
    room.start_act(ActId::WagerRound, vec![question("wq", 0, 200, false)], 0)
        .unwrap();

    let p = room.player(&players[0]).unwrap();
    assert_eq!(p.wager, 0);
    assert!(!p.wager_submitted);
    assert!(!p.wager_swap_used);

    let state = room.wager_state.as_ref().unwrap();
    assert_eq!(state.stage, WagerStage::Blind);
    assert_eq!(state.ends_at, 60_000);
    assert!(room.current_question.is_none());
    assert!(!room.shop_open);
}

#[test]
fn wagers_clamp_to_score() {
    let (mut room, players) = wager_room(&[400]);
    let recorded = room.set_wager(&players[0], 9_999, 1_000).unwrap();
    assert_eq!(recorded, 400);
    assert_eq!(room.player(&players[0]).unwrap().wager, 400);
}

#[test]
fn wager_rejected_after_the_window() {
    let (mut room, players) = wager_room(&[400]);
    assert_eq!(
        room.set_wager(&players[0], 100, 60_001),
        Err(GameError::TimeUp)
    );
}

#[test]
fn redline_blocks_decreases_but_allows_raises() {
    // Scenario: wager 50 at t=0; at t=46s (redline) 20 is clamped back to 50,
    // then 100 is accepted.
    let (mut room, players) = wager_room(&[400]);
    let player = &players[0];

    assert_eq!(room.set_wager(player, 50, 0).unwrap(), 50);

    assert!(room.wager_stage_fired(WagerStage::Category, 15_000).is_some());
    assert!(room.wager_stage_fired(WagerStage::Hint, 30_000).is_some());
    assert!(room.wager_stage_fired(WagerStage::Redline, 45_000).is_some());

    assert_eq!(room.set_wager(player, 20, 46_000).unwrap(), 50);
    assert_eq!(room.player(player).unwrap().wager, 50);

    assert_eq!(room.set_wager(player, 100, 47_000).unwrap(), 100);
    assert_eq!(room.player(player).unwrap().wager, 100);
}

#[test]
fn stage_timers_only_move_forward() {
    let (mut room, _players) = wager_room(&[400]);
    assert!(room.wager_stage_fired(WagerStage::Hint, 30_000).is_some());
    // A late category timer must not rewind the stage
    assert!(room.wager_stage_fired(WagerStage::Category, 30_001).is_none());
    assert_eq!(room.wager_state.as_ref().unwrap().stage, WagerStage::Hint);
}

#[test]
fn redline_sends_extra_hints_to_bold_and_up() {
    let (mut room, players) = wager_room(&[400, 400, 400]);
    room.set_wager(&players[0], 100, 1_000).unwrap(); // BOLD
    room.set_wager(&players[1], 50, 1_000).unwrap(); // SAFE
    room.set_wager(&players[2], 400, 1_000).unwrap(); // ALL_IN

    let effects = room.wager_stage_fired(WagerStage::Redline, 45_000).unwrap();
    let mut hinted: Vec<&str> = effects
        .extra_hints
        .iter()
        .map(|(id, _)| id.as_str())
        .collect();
    hinted.sort_unstable();
    let mut expected = vec![players[0].as_str(), players[2].as_str()];
    expected.sort_unstable();
    assert_eq!(hinted, expected);
}

#[test]
fn closing_emits_the_siren_and_locked_produces_the_spotlight() {
    let (mut room, players) = wager_room(&[400, 200]);
    room.set_wager(&players[0], 400, 1_000).unwrap();
    room.set_wager(&players[1], 100, 1_000).unwrap();

    let closing = room.wager_stage_fired(WagerStage::Closing, 55_000).unwrap();
    assert!(closing.siren);
    assert!(closing.spotlight.is_none());

    let locked = room.wager_stage_fired(WagerStage::Locked, 60_000).unwrap();
    let spotlight = locked.spotlight.unwrap();
    assert_eq!(spotlight.total_wagered, 500);
    assert_eq!(spotlight.all_in_count, 1);
    assert_eq!(spotlight.zero_bet_count, 0);
    // Sorted by ratio: the ALL_IN leads
    assert_eq!(spotlight.biggest.as_ref().unwrap().wager, 400);
    assert_eq!(spotlight.top.len(), 2);
    assert!(room.wager_state.as_ref().unwrap().locked);
}

#[test]
fn lock_classifies_tiers_and_pregenerates_fifty_fifty() {
    let (mut room, players) = wager_room(&[400, 400, 400, 400, 400]);
    room.set_wager(&players[0], 0, 1_000).unwrap(); // SAFE
    room.set_wager(&players[1], 100, 1_000).unwrap(); // BOLD
    room.set_wager(&players[2], 200, 1_000).unwrap(); // HIGH_ROLLER
    room.set_wager(&players[3], 320, 1_000).unwrap(); // INSANE
    room.set_wager(&players[4], 400, 1_000).unwrap(); // ALL_IN

    room.lock_wagers(60_000).unwrap();
    let state = room.wager_state.as_ref().unwrap();
    assert_eq!(state.tiers[&players[0]], WagerTier::Safe);
    assert_eq!(state.tiers[&players[1]], WagerTier::Bold);
    assert_eq!(state.tiers[&players[2]], WagerTier::HighRoller);
    assert_eq!(state.tiers[&players[3]], WagerTier::Insane);
    assert_eq!(state.tiers[&players[4]], WagerTier::AllIn);

    // 50/50 only from HIGH_ROLLER up, never touching the correct answer
    assert!(!state.removed_indexes.contains_key(&players[0]));
    assert!(!state.removed_indexes.contains_key(&players[1]));
    for player in &players[2..] {
        let removed = &state.removed_indexes[player];
        assert_eq!(removed.len(), 2);
        assert!(!removed.contains(&1));
    }

    // Locking twice is a no-op
    assert!(room.lock_wagers(60_001).is_none());
}

#[test]
fn spotlight_end_starts_the_question_and_hands_out_perks() {
    let (mut room, players) = wager_room(&[400, 400]);
    room.set_wager(&players[0], 400, 1_000).unwrap(); // ALL_IN: both perks
    room.set_wager(&players[1], 100, 1_000).unwrap(); // BOLD: hint only
    room.lock_wagers(60_000).unwrap();

    let perks = room.end_spotlight(61_000).unwrap();
    assert_eq!(room.phase, Phase::Countdown);
    // Wager act duration override applies
    let q = room.current_question.as_ref().unwrap();
    assert_eq!(q.duration_ms(), 25_000);
    // Choices stay blacked out through the countdown
    assert_eq!(q.blackout_until, Some(61_000 + 3_000));

    let all_in = perks.iter().find(|p| p.player_id == players[0]).unwrap();
    assert!(all_in.removed_indexes.is_some());
    assert!(all_in.extra_hint.is_some());
    let bold = perks.iter().find(|p| p.player_id == players[1]).unwrap();
    assert!(bold.removed_indexes.is_none());
    assert!(bold.extra_hint.is_some());
}

#[test]
fn spotlight_end_requires_locked_wagers() {
    let (mut room, _players) = wager_room(&[400]);
    assert!(matches!(
        room.end_spotlight(30_000),
        Err(GameError::WrongPhase)
    ));
}

#[test]
fn perk_replay_is_stable_across_reconnects() {
    let (mut room, players) = wager_room(&[400]);
    room.set_wager(&players[0], 400, 1_000).unwrap();
    room.lock_wagers(60_000).unwrap();
    room.end_spotlight(61_000).unwrap();

    let first: Vec<_> = room.wager_perks();
    let second: Vec<_> = room.wager_perks();
    assert_eq!(
        first[0].removed_indexes.as_ref().unwrap(),
        second[0].removed_indexes.as_ref().unwrap()
    );
}

#[test]
fn all_in_correct_with_final_swap() {
    // Scenario: score 400, ALL_IN. Submit A, lock in, swap to the correct B.
    let (mut room, players) = wager_room(&[400, 400]);
    let (all_in, other) = (&players[0], &players[1]);
    room.set_wager(all_in, 400, 1_000).unwrap();
    room.set_wager(other, 10, 1_000).unwrap();
    room.lock_wagers(60_000).unwrap();
    room.end_spotlight(61_000).unwrap();

    let question_id = room.current_question.as_ref().unwrap().id().to_string();
    assert!(room.finish_countdown(&question_id));
    let t = room.current_question.as_ref().unwrap().started_at + 2_000;

    room.submit_answer(all_in, 0, t).unwrap();
    assert!(!room.lock_in(all_in, t).unwrap());
    // The one allowed post-lockin swap
    room.submit_answer(all_in, 1, t + 500).unwrap();
    assert!(room.player(all_in).unwrap().wager_swap_used);
    // A second swap is rejected
    assert!(matches!(
        room.submit_answer(all_in, 0, t + 600),
        Err(GameError::AnswerLocked)
    ));

    let ends_at = room.current_question.as_ref().unwrap().ends_at;
    let report = room.reveal(ends_at + 1).unwrap();
    let outcome = report
        .outcomes
        .iter()
        .find(|o| &o.player_id == all_in)
        .unwrap();
    assert!(outcome.correct);
    assert_eq!(outcome.score_delta, 400);
    assert_eq!(outcome.wager, Some(400));
    assert_eq!(outcome.coins_delta, 0);
    assert_eq!(outcome.lives_delta, 0);
    assert_eq!(outcome.speed_bonus, 0);
    assert_eq!(room.player(all_in).unwrap().score, 800);
    // Settlement resets the swap flag
    assert!(!room.player(all_in).unwrap().wager_swap_used);
}

#[test]
fn non_all_in_players_get_no_swap() {
    let (mut room, players) = wager_room(&[400, 400]);
    let bold = &players[0];
    room.set_wager(bold, 100, 1_000).unwrap();
    room.lock_wagers(60_000).unwrap();
    room.end_spotlight(61_000).unwrap();

    let question_id = room.current_question.as_ref().unwrap().id().to_string();
    room.finish_countdown(&question_id);
    let t = room.current_question.as_ref().unwrap().started_at + 1_000;

    room.submit_answer(bold, 0, t).unwrap();
    room.lock_in(bold, t).unwrap();
    assert!(matches!(
        room.submit_answer(bold, 1, t + 100),
        Err(GameError::AnswerLocked)
    ));
}

#[test]
fn wrong_wager_answer_costs_exactly_the_wager() {
    let (mut room, players) = wager_room(&[400, 300]);
    let (loser, absent) = (&players[0], &players[1]);
    room.set_wager(loser, 150, 1_000).unwrap();
    room.set_wager(absent, 100, 1_000).unwrap();
    room.lock_wagers(60_000).unwrap();
    room.end_spotlight(61_000).unwrap();

    let question_id = room.current_question.as_ref().unwrap().id().to_string();
    room.finish_countdown(&question_id);
    let t = room.current_question.as_ref().unwrap().started_at + 1_000;
    room.submit_answer(loser, 3, t).unwrap();
    // The second player never answers: treated as incorrect

    let ends_at = room.current_question.as_ref().unwrap().ends_at;
    let report = room.reveal(ends_at + 1).unwrap();

    let lost = report.outcomes.iter().find(|o| &o.player_id == loser).unwrap();
    assert_eq!(lost.score_delta, -150);
    assert_eq!(lost.lives_delta, 0);
    let no_answer = report
        .outcomes
        .iter()
        .find(|o| &o.player_id == absent)
        .unwrap();
    assert_eq!(no_answer.score_delta, -100);
    assert!(no_answer.your_answer.is_none());

    assert_eq!(room.player(loser).unwrap().score, 250);
    assert_eq!(room.player(absent).unwrap().score, 200);
    // Wager state is gone after settlement
    assert!(room.wager_state.is_none());
}

#[test]
fn active_items_rejected_during_the_wager_round() {
    use quiz_rush_server::game::ItemId;

    let (mut room, players) = wager_room(&[400]);
    room.set_wager(&players[0], 100, 1_000).unwrap();
    room.lock_wagers(60_000).unwrap();
    room.end_spotlight(61_000).unwrap();
    let question_id = room.current_question.as_ref().unwrap().id().to_string();
    room.finish_countdown(&question_id);

    room.player_mut(&players[0])
        .unwrap()
        .grant_item(ItemId::FiftyFifty);
    let t = room.current_question.as_ref().unwrap().started_at + 1_000;
    assert!(matches!(
        room.use_item(&players[0], ItemId::FiftyFifty, t),
        Err(GameError::ItemNotAllowed)
    ));
}

#[test]
fn eliminated_players_cannot_wager() {
    let (mut room, players) = wager_room(&[400]);
    room.player_mut(&players[0]).unwrap().eliminated = true;
    assert_eq!(
        room.set_wager(&players[0], 50, 1_000),
        Err(GameError::Eliminated)
    );
}
