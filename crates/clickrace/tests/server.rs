//! Integration tests for the ClickRace server, handler, and full connection flow.

use std::time::Duration;

use clickrace::prelude::*;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port whose rooms get `codes` first, and
/// returns the address.
async fn start_server_with_codes(codes: &[&str]) -> String {
    let server = ClickRaceServer::builder()
        .bind("127.0.0.1:0")
        .code_source(FixedCodes::new(codes.iter().copied()))
        .build()
        .await
        .expect("server should build");

    let addr = server
        .local_addr()
        .expect("should have local addr")
        .to_string();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    addr
}

async fn start_server() -> String {
    start_server_with_codes(&["AB12CD"]).await
}

async fn connect(addr: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("should connect");
    ws
}

async fn emit(ws: &mut ClientWs, event: Value) {
    ws.send(Message::text(event.to_string()))
        .await
        .expect("send event");
}

/// Reads the next event, skipping control frames.
async fn next_event(ws: &mut ClientWs) -> ServerEvent {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for event")
            .expect("stream ended")
            .expect("recv error");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("decode event");
            }
            Message::Binary(data) => {
                return serde_json::from_slice(&data).expect("decode event");
            }
            _ => continue,
        }
    }
}

/// Asserts nothing arrives within a short window.
async fn expect_silence(ws: &mut ClientWs) {
    let result = tokio::time::timeout(Duration::from_millis(100), ws.next()).await;
    assert!(result.is_err(), "expected no event, got {result:?}");
}

async fn create_room(ws: &mut ClientWs, name: &str) -> RoomCode {
    emit(ws, json!({"event": "createRoom", "data": {"playerName": name}})).await;
    match next_event(ws).await {
        ServerEvent::RoomCreated { room_code } => room_code,
        other => panic!("expected roomCreated, got {other:?}"),
    }
}

async fn join_room(ws: &mut ClientWs, code: &str, name: &str) {
    emit(
        ws,
        json!({"event": "joinRoom", "data": {"roomCode": code, "playerName": name}}),
    )
    .await;
}

/// Two connected clients seated in room `AB12CD`, `gameStart` drained.
async fn two_players(addr: &str) -> (ClientWs, ClientWs) {
    let mut ada = connect(addr).await;
    let mut grace = connect(addr).await;

    let code = create_room(&mut ada, "ada").await;
    join_room(&mut grace, code.as_str(), "grace").await;

    assert!(matches!(next_event(&mut ada).await, ServerEvent::GameStart { .. }));
    assert!(matches!(next_event(&mut grace).await, ServerEvent::GameStart { .. }));
    (ada, grace)
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_full_game_flow() {
    let addr = start_server().await;
    let mut ada = connect(&addr).await;
    let mut grace = connect(&addr).await;

    let code = create_room(&mut ada, "ada").await;
    assert_eq!(code.as_str(), "AB12CD");

    join_room(&mut grace, "AB12CD", "grace").await;
    let start = ServerEvent::GameStart {
        player1: PlayerSnapshot { name: "ada".into(), score: 0 },
        player2: PlayerSnapshot { name: "grace".into(), score: 0 },
    };
    assert_eq!(next_event(&mut ada).await, start);
    assert_eq!(next_event(&mut grace).await, start);

    emit(&mut ada, json!({"event": "startGame", "data": {"roomCode": "AB12CD"}})).await;
    assert_eq!(next_event(&mut ada).await, ServerEvent::StartTimer);
    assert_eq!(next_event(&mut grace).await, ServerEvent::StartTimer);

    emit(
        &mut grace,
        json!({"event": "updateScore", "data": {
            "roomCode": "AB12CD", "player1Score": 5, "player2Score": 3
        }}),
    )
    .await;
    let update = ServerEvent::ScoreUpdate { player1_score: 5, player2_score: 3 };
    assert_eq!(next_event(&mut ada).await, update);
    assert_eq!(next_event(&mut grace).await, update);

    emit(&mut ada, json!({"event": "endGame", "data": {"roomCode": "AB12CD"}})).await;
    let over = ServerEvent::GameOver(GameResult {
        winner: Winner::Player1,
        winner_name: Some("ada".into()),
        player1_score: 5,
        player2_score: 3,
        player1_name: "ada".into(),
        player2_name: "grace".into(),
    });
    assert_eq!(next_event(&mut ada).await, over);
    assert_eq!(next_event(&mut grace).await, over);
}

#[tokio::test]
async fn test_game_over_wire_shape() {
    let addr = start_server().await;
    let (mut ada, _grace) = two_players(&addr).await;

    emit(&mut ada, json!({"event": "endGame", "data": {"roomCode": "AB12CD"}})).await;

    let msg = tokio::time::timeout(Duration::from_secs(2), ada.next())
        .await
        .expect("timed out")
        .expect("stream ended")
        .expect("recv error");
    let value: Value = serde_json::from_str(msg.to_text().expect("text frame")).unwrap();
    assert_eq!(
        value,
        json!({"event": "gameOver", "data": {
            "winner": "tie",
            "winnerName": null,
            "player1Score": 0,
            "player2Score": 0,
            "player1Name": "ada",
            "player2Name": "grace"
        }})
    );
}

#[tokio::test]
async fn test_join_unknown_code_errors_only_to_joiner() {
    let addr = start_server().await;
    let mut ada = connect(&addr).await;
    let mut grace = connect(&addr).await;
    create_room(&mut ada, "ada").await;

    join_room(&mut grace, "ZZZZZZ", "grace").await;

    assert_eq!(next_event(&mut grace).await, ServerEvent::error("Invalid room code"));
    expect_silence(&mut ada).await;
}

#[tokio::test]
async fn test_third_player_gets_room_full() {
    let addr = start_server().await;
    let (mut ada, mut grace) = two_players(&addr).await;
    let mut linus = connect(&addr).await;

    join_room(&mut linus, "AB12CD", "linus").await;

    assert_eq!(next_event(&mut linus).await, ServerEvent::error("Room is full"));
    expect_silence(&mut ada).await;
    expect_silence(&mut grace).await;
}

#[tokio::test]
async fn test_join_code_is_case_insensitive() {
    let addr = start_server().await;
    let mut ada = connect(&addr).await;
    let mut grace = connect(&addr).await;
    create_room(&mut ada, "ada").await;

    join_room(&mut grace, "ab12cd", "grace").await;

    assert!(matches!(next_event(&mut grace).await, ServerEvent::GameStart { .. }));
}

#[tokio::test]
async fn test_malformed_frames_are_skipped() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    ws.send(Message::text("not json")).await.unwrap();
    emit(&mut ws, json!({"event": "leaveRoom", "data": {"roomCode": "AB12CD"}})).await;
    emit(&mut ws, json!({"event": "joinRoom", "data": {"roomCode": "AB12CD"}})).await;

    // The connection is still open and serving.
    let code = create_room(&mut ws, "ada").await;
    assert_eq!(code.as_str(), "AB12CD");
}

#[tokio::test]
async fn test_events_for_unknown_room_are_ignored() {
    let addr = start_server().await;
    let mut ws = connect(&addr).await;

    emit(&mut ws, json!({"event": "startGame", "data": {"roomCode": "NOPE00"}})).await;
    emit(&mut ws, json!({"event": "endGame", "data": {"roomCode": "NOPE00"}})).await;

    expect_silence(&mut ws).await;
}

#[tokio::test]
async fn test_end_game_without_opponent_is_ignored() {
    let addr = start_server().await;
    let mut ada = connect(&addr).await;
    create_room(&mut ada, "ada").await;

    emit(&mut ada, json!({"event": "endGame", "data": {"roomCode": "AB12CD"}})).await;
    emit(
        &mut ada,
        json!({"event": "updateScore", "data": {
            "roomCode": "AB12CD", "player1Score": 4, "player2Score": 9
        }}),
    )
    .await;

    // No gameOver in between; the empty seat reads 0.
    assert_eq!(
        next_event(&mut ada).await,
        ServerEvent::ScoreUpdate { player1_score: 4, player2_score: 0 }
    );
}

#[tokio::test]
async fn test_disconnect_notifies_opponent_and_removes_room() {
    let addr = start_server().await;
    let (mut ada, mut grace) = two_players(&addr).await;

    ada.close(None).await.unwrap();

    assert_eq!(next_event(&mut grace).await, ServerEvent::PlayerDisconnected);

    let mut linus = connect(&addr).await;
    join_room(&mut linus, "AB12CD", "linus").await;
    assert_eq!(next_event(&mut linus).await, ServerEvent::error("Invalid room code"));
}

#[tokio::test]
async fn test_code_collision_gets_fresh_code() {
    let addr = start_server_with_codes(&["AB12CD", "AB12CD", "ZZ9999"]).await;
    let mut ada = connect(&addr).await;
    let mut grace = connect(&addr).await;

    let first = create_room(&mut ada, "ada").await;
    let second = create_room(&mut grace, "grace").await;

    assert_eq!(first.as_str(), "AB12CD");
    assert_eq!(second.as_str(), "ZZ9999");
}

#[tokio::test]
async fn test_idle_tcp_peer_does_not_block_other_clients() {
    let addr = start_server().await;

    // Connects at the TCP level but never sends the upgrade request.
    let _idle = tokio::net::TcpStream::connect(addr.as_str()).await.unwrap();

    let (mut ada, _) = tokio::time::timeout(
        Duration::from_secs(3),
        tokio_tungstenite::connect_async(format!("ws://{addr}")),
    )
    .await
    .expect("second client should connect while the first peer idles")
    .expect("should connect");

    let code = create_room(&mut ada, "ada").await;
    assert_eq!(code.as_str(), "AB12CD");
}

#[tokio::test]
async fn test_two_rooms_play_independently() {
    let addr = start_server_with_codes(&["AB12CD", "ZZ9999"]).await;
    let (mut ada, mut grace) = two_players(&addr).await;
    let mut linus = connect(&addr).await;
    let mut ken = connect(&addr).await;
    let code = create_room(&mut linus, "linus").await;
    join_room(&mut ken, code.as_str(), "ken").await;
    assert!(matches!(next_event(&mut linus).await, ServerEvent::GameStart { .. }));
    assert!(matches!(next_event(&mut ken).await, ServerEvent::GameStart { .. }));

    for (ws, room, p1, p2) in [(&mut ada, "AB12CD", 1, 2), (&mut linus, "ZZ9999", 7, 8)] {
        emit(
            ws,
            json!({"event": "updateScore", "data": {
                "roomCode": room, "player1Score": p1, "player2Score": p2
            }}),
        )
        .await;
    }

    let first = ServerEvent::ScoreUpdate { player1_score: 1, player2_score: 2 };
    let second = ServerEvent::ScoreUpdate { player1_score: 7, player2_score: 8 };
    assert_eq!(next_event(&mut grace).await, first);
    assert_eq!(next_event(&mut ken).await, second);
    assert_eq!(next_event(&mut ada).await, first);
    assert_eq!(next_event(&mut linus).await, second);
    expect_silence(&mut grace).await;
}
