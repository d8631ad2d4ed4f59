//! Dispatch-level integration tests: the acknowledgement contract, snapshot
//! fan-out, host authorization, and reconnect behavior, all without sockets.

mod common;

use common::full_pack;
use quiz_rush_server::catalog::Catalog;
use quiz_rush_server::config::Config;
use quiz_rush_server::protocol::{ClientEnvelope, ClientEvent, ConnectionId, ServerMessage};
use quiz_rush_server::server::{GameServer, ServerConfig};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;

fn make_server() -> Arc<GameServer> {
    let catalog = Catalog::empty();
    catalog.insert_pack(full_pack("classic"));
    GameServer::new(ServerConfig::from_config(&Config::default()), catalog)
}

fn connect(server: &Arc<GameServer>) -> (ConnectionId, mpsc::Receiver<Arc<ServerMessage>>) {
    let (tx, rx) = mpsc::channel(64);
    (server.register_connection(tx), rx)
}

fn envelope(seq: u64, event: ClientEvent) -> ClientEnvelope {
    ClientEnvelope { seq, event }
}

/// Unpack an acknowledgement, asserting it carries the expected seq.
fn unpack_ack(message: &ServerMessage, expected_seq: u64) -> (bool, Option<Value>, Option<String>) {
    match message {
        ServerMessage::Ack {
            seq,
            ok,
            data,
            error,
            ..
        } => {
            assert_eq!(*seq, expected_seq);
            (*ok, data.clone(), error.clone())
        }
        other => panic!("expected ack, got {other:?}"),
    }
}

/// Create a room and return (code, host_token, host connection, host rx).
async fn create_room(
    server: &Arc<GameServer>,
) -> (String, String, ConnectionId, mpsc::Receiver<Arc<ServerMessage>>) {
    let (host_conn, host_rx) = connect(server);
    let ack = server
        .dispatch(
            host_conn,
            envelope(
                1,
                ClientEvent::RoomCreate {
                    host_name: "Quizmaster".to_string(),
                    pack_id: None,
                },
            ),
        )
        .await;
    let (ok, data, _) = unpack_ack(&ack, 1);
    assert!(ok);
    let data = data.unwrap();
    let code = data["code"].as_str().unwrap().to_string();
    let host_token = data["host_token"].as_str().unwrap().to_string();
    (code, host_token, host_conn, host_rx)
}

#[tokio::test]
async fn room_create_acks_with_code_and_token() {
    let server = make_server();
    let (code, host_token, _conn, _rx) = create_room(&server).await;

    assert_eq!(code.len(), 5);
    assert!(!host_token.is_empty());
    assert_eq!(server.room_count(), 1);
}

#[tokio::test]
async fn create_fails_with_no_packs_loaded() {
    let server = GameServer::new(
        ServerConfig::from_config(&Config::default()),
        Catalog::empty(),
    );
    let (conn, _rx) = connect(&server);
    let ack = server
        .dispatch(
            conn,
            envelope(
                9,
                ClientEvent::RoomCreate {
                    host_name: "Quizmaster".to_string(),
                    pack_id: None,
                },
            ),
        )
        .await;
    let (ok, _, error) = unpack_ack(&ack, 9);
    assert!(!ok);
    assert_eq!(error.as_deref(), Some("No question packs loaded"));
}

#[tokio::test]
async fn join_broadcasts_snapshots_to_the_host() {
    let server = make_server();
    let (code, _token, _host_conn, mut host_rx) = create_room(&server).await;

    let (player_conn, _player_rx) = connect(&server);
    let ack = server
        .dispatch(
            player_conn,
            envelope(
                2,
                ClientEvent::RoomJoin {
                    code: code.clone(),
                    name: "Dana".to_string(),
                },
            ),
        )
        .await;
    let (ok, data, _) = unpack_ack(&ack, 2);
    assert!(ok);
    let player_id = data.unwrap()["player_id"].as_str().unwrap().to_string();
    assert_eq!(player_id.len(), 12);

    // The host connection received the public snapshot, then its host-scoped one
    let first = host_rx.recv().await.unwrap();
    assert!(matches!(&*first, ServerMessage::RoomState(_)));
    let second = host_rx.recv().await.unwrap();
    match &*second {
        ServerMessage::HostState(state) => {
            assert_eq!(state.public.players.len(), 1);
            assert_eq!(state.public.players[0].name, "Dana");
        }
        other => panic!("expected host state, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_room_is_a_recoverable_error() {
    let server = make_server();
    let (conn, _rx) = connect(&server);
    let ack = server
        .dispatch(
            conn,
            envelope(
                3,
                ClientEvent::RoomJoin {
                    code: "QQQQQ".to_string(),
                    name: "Dana".to_string(),
                },
            ),
        )
        .await;
    let (ok, _, error) = unpack_ack(&ack, 3);
    assert!(!ok);
    assert_eq!(error.as_deref(), Some("Room not found"));
}

#[tokio::test]
async fn host_operations_require_the_host_token() {
    let server = make_server();
    let (code, _token, _host_conn, _host_rx) = create_room(&server).await;

    let (conn, _rx) = connect(&server);
    let ack = server
        .dispatch(
            conn,
            envelope(
                4,
                ClientEvent::GameStart {
                    code,
                    host_token: "wrong-token".to_string(),
                },
            ),
        )
        .await;
    let (ok, _, error) = unpack_ack(&ack, 4);
    assert!(!ok);
    assert_eq!(error.as_deref(), Some("Not authorized"));
}

#[tokio::test]
async fn game_start_moves_the_room_into_countdown() {
    let server = make_server();
    let (code, host_token, host_conn, _host_rx) = create_room(&server).await;

    let (player_conn, _player_rx) = connect(&server);
    server
        .dispatch(
            player_conn,
            envelope(
                2,
                ClientEvent::RoomJoin {
                    code: code.clone(),
                    name: "Dana".to_string(),
                },
            ),
        )
        .await;

    let ack = server
        .dispatch(
            host_conn,
            envelope(3, ClientEvent::GameStart { code: code.clone(), host_token }),
        )
        .await;
    let (ok, _, _) = unpack_ack(&ack, 3);
    assert!(ok);

    let room = server_room(&server, &code).await;
    assert_eq!(
        room["phase"].as_str(),
        Some("countdown"),
        "room should be counting down: {room}"
    );
    assert_eq!(room["act"]["act_id"].as_str(), Some("homeroom"));
}

#[tokio::test]
async fn wager_set_outside_the_wager_phase_is_rejected() {
    let server = make_server();
    let (code, _token, _host_conn, _host_rx) = create_room(&server).await;

    let (player_conn, _player_rx) = connect(&server);
    let ack = server
        .dispatch(
            player_conn,
            envelope(
                2,
                ClientEvent::RoomJoin {
                    code: code.clone(),
                    name: "Dana".to_string(),
                },
            ),
        )
        .await;
    let (_, data, _) = unpack_ack(&ack, 2);
    let player_id = data.unwrap()["player_id"].as_str().unwrap().to_string();

    let ack = server
        .dispatch(
            player_conn,
            envelope(
                3,
                ClientEvent::WagerSet {
                    code,
                    player_id,
                    amount: 100,
                },
            ),
        )
        .await;
    let (ok, _, error) = unpack_ack(&ack, 3);
    assert!(!ok);
    assert_eq!(error.as_deref(), Some("Not in wager phase"));
}

#[tokio::test]
async fn disconnect_flips_connected_and_resume_restores_it() {
    let server = make_server();
    let (code, _token, _host_conn, _host_rx) = create_room(&server).await;

    let (player_conn, _player_rx) = connect(&server);
    let ack = server
        .dispatch(
            player_conn,
            envelope(
                2,
                ClientEvent::RoomJoin {
                    code: code.clone(),
                    name: "Dana".to_string(),
                },
            ),
        )
        .await;
    let (_, data, _) = unpack_ack(&ack, 2);
    let player_id = data.unwrap()["player_id"].as_str().unwrap().to_string();

    server.handle_disconnect(player_conn).await;
    let room = server_room(&server, &code).await;
    assert_eq!(room["players"][0]["connected"].as_bool(), Some(false));

    let (new_conn, _new_rx) = connect(&server);
    let ack = server
        .dispatch(
            new_conn,
            envelope(
                3,
                ClientEvent::RoomResume {
                    code: code.clone(),
                    player_id: Some(player_id),
                    host_token: None,
                },
            ),
        )
        .await;
    let (ok, _, _) = unpack_ack(&ack, 3);
    assert!(ok);

    let room = server_room(&server, &code).await;
    assert_eq!(room["players"][0]["connected"].as_bool(), Some(true));
}

#[tokio::test]
async fn watch_returns_the_public_snapshot_without_joining() {
    let server = make_server();
    let (code, _token, _host_conn, _host_rx) = create_room(&server).await;

    let (watcher_conn, _watcher_rx) = connect(&server);
    let ack = server
        .dispatch(
            watcher_conn,
            envelope(5, ClientEvent::RoomWatch { code: code.clone() }),
        )
        .await;
    let (ok, data, _) = unpack_ack(&ack, 5);
    assert!(ok);
    let state = &data.unwrap()["state"];
    assert_eq!(state["code"].as_str(), Some(code.as_str()));
    assert_eq!(state["players"].as_array().unwrap().len(), 0);
}

/// Fetch the current public snapshot of a room as JSON.
async fn server_room(server: &Arc<GameServer>, code: &str) -> Value {
    let (conn, _rx) = connect(server);
    let ack = server
        .dispatch(
            conn,
            envelope(99, ClientEvent::RoomWatch { code: code.to_string() }),
        )
        .await;
    let (ok, data, error) = unpack_ack(&ack, 99);
    assert!(ok, "watch failed: {error:?}");
    data.unwrap()["state"].clone()
}
