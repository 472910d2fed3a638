//! Integration tests for the Duet server: real sockets, full connection flow.

use std::time::Duration;

use duet::prelude::*;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Starts a server on a random port and returns the address.
async fn start_server() -> String {
    let server = DuetServer::builder()
        .bind("127.0.0.1:0")
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

    addr
}

async fn connect(addr: &str, path: &str) -> ClientWs {
    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}{path}"))
        .await
        .expect("should connect");
    ws
}

/// Connects and waits for the join notification, so joins happen in the
/// order the test performs them.
async fn join(addr: &str, path: &str, expected_count: u64) -> ClientWs {
    let mut ws = connect(addr, path).await;
    let update = recv_json(&mut ws).await;
    assert_eq!(update, json!({ "type": "ROOM_UPDATE", "count": expected_count }));
    ws
}

async fn send_json(ws: &mut ClientWs, value: Value) {
    ws.send(Message::Text(value.to_string().into()))
        .await
        .expect("send");
}

async fn recv_json(ws: &mut ClientWs) -> Value {
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for message")
        .expect("stream ended")
        .expect("websocket error");
    match msg {
        Message::Text(text) => serde_json::from_str(text.as_str()).expect("json"),
        other => panic!("expected text frame, got {other:?}"),
    }
}

async fn recv_close_code(ws: &mut ClientWs) -> CloseCode {
    let msg = tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("timed out waiting for close");
    match msg {
        Some(Ok(Message::Close(Some(frame)))) => frame.code,
        other => panic!("expected close frame, got {other:?}"),
    }
}

/// Joins a room whose last occupant is on the way out.
///
/// The server drops the old seat after it reads the close frame, so a join
/// can land first and see two occupants. Such a join is backed out and
/// retried until the room reports a single occupant. A retry can also
/// meet a full room while earlier attempts are still being dropped.
async fn join_empty_room(addr: &str, path: &str) -> ClientWs {
    for _ in 0..50 {
        let mut ws = connect(addr, path).await;
        let first = tokio::time::timeout(Duration::from_secs(2), ws.next())
            .await
            .expect("timed out waiting for message");
        if let Some(Ok(Message::Text(text))) = first {
            let update: Value = serde_json::from_str(text.as_str()).expect("json");
            if update["count"] == 1 {
                return ws;
            }
            ws.send(Message::Close(None)).await.expect("close");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("room {path} never emptied");
}

/// Asserts nothing arrives for a short while.
async fn assert_silent(ws: &mut ClientWs) {
    let result =
        tokio::time::timeout(Duration::from_millis(200), ws.next()).await;
    assert!(result.is_err(), "expected no message, got {result:?}");
}

fn start_game(kind: &str, game_type: &str, role: &str) -> Value {
    json!({ "type": kind, "payload": { "gameType": game_type, "role": role } })
}

// =========================================================================
// Joining
// =========================================================================

#[tokio::test]
async fn test_join_reports_occupancy_to_both() {
    let addr = start_server().await;
    let mut a = join(&addr, "/123456", 1).await;
    let _b = join(&addr, "/123456", 2).await;

    assert_eq!(recv_json(&mut a).await, json!({ "type": "ROOM_UPDATE", "count": 2 }));
}

#[tokio::test]
async fn test_query_string_is_not_part_of_room_id() {
    let addr = start_server().await;
    let mut a = join(&addr, "/lobby?name=alice", 1).await;
    let _b = join(&addr, "/lobby?name=bob", 2).await;

    assert_eq!(recv_json(&mut a).await["count"], 2);
}

#[tokio::test]
async fn test_missing_room_id_is_closed() {
    let addr = start_server().await;
    let mut ws = connect(&addr, "/").await;

    assert_eq!(recv_close_code(&mut ws).await, CloseCode::Normal);
}

#[tokio::test]
async fn test_third_connection_is_rejected_with_policy_violation() {
    let addr = start_server().await;
    let mut a = join(&addr, "/full", 1).await;
    let mut b = join(&addr, "/full", 2).await;
    recv_json(&mut a).await;

    let mut c = connect(&addr, "/full").await;
    assert_eq!(recv_close_code(&mut c).await, CloseCode::Policy);

    assert_silent(&mut a).await;
    assert_silent(&mut b).await;
}

// =========================================================================
// Handshake
// =========================================================================

#[tokio::test]
async fn test_host_initiated_handshake() {
    let addr = start_server().await;
    let mut a = join(&addr, "/r1", 1).await;
    let mut b = join(&addr, "/r1", 2).await;
    recv_json(&mut a).await;

    send_json(&mut a, start_game("START_GAME", "pong", "sender")).await;

    assert_eq!(
        recv_json(&mut a).await,
        json!({ "type": "GAME_STARTED", "payload": { "gameType": "pong", "role": "sender" } })
    );
    assert_eq!(
        recv_json(&mut b).await,
        json!({ "type": "GAME_STARTED", "payload": { "gameType": "pong", "role": "receiver" } })
    );
}

#[tokio::test]
async fn test_peer_joined_handshake_redirects_peer() {
    let addr = start_server().await;
    let mut a = join(&addr, "/654321", 1).await;
    let mut b = join(&addr, "/654321", 2).await;
    recv_json(&mut a).await;

    send_json(&mut a, start_game("JOINED_GAME", "pong", "receiver")).await;

    assert_eq!(
        recv_json(&mut a).await,
        json!({ "type": "GAME_STARTED", "payload": { "gameType": "pong", "role": "receiver" } })
    );
    let redirect = recv_json(&mut b).await;
    assert_eq!(redirect["type"], "REDIRECT_TO_GAME");
    assert_eq!(
        redirect["payload"]["url"],
        "/game/654321?gameType=pong&role=sender"
    );
}

#[tokio::test]
async fn test_duplicate_handshake_is_silent() {
    let addr = start_server().await;
    let mut a = join(&addr, "/dup", 1).await;
    let mut b = join(&addr, "/dup", 2).await;
    recv_json(&mut a).await;

    send_json(&mut a, start_game("START_GAME", "pong", "sender")).await;
    recv_json(&mut a).await;
    recv_json(&mut b).await;

    send_json(&mut b, start_game("START_GAME", "chess", "sender")).await;
    assert_silent(&mut a).await;
    assert_silent(&mut b).await;
}

#[tokio::test]
async fn test_handshake_alone_is_silent() {
    let addr = start_server().await;
    let mut a = join(&addr, "/alone", 1).await;

    send_json(&mut a, start_game("START_GAME", "pong", "sender")).await;
    assert_silent(&mut a).await;
}

#[tokio::test]
async fn test_malformed_and_unknown_messages_are_dropped() {
    let addr = start_server().await;
    let mut a = join(&addr, "/junk", 1).await;
    let mut b = join(&addr, "/junk", 2).await;
    recv_json(&mut a).await;

    a.send(Message::Text(String::from("not json").into()))
        .await
        .expect("send");
    send_json(&mut a, json!({ "type": "START_GAME" })).await;
    send_json(&mut a, start_game("START_GAME", "pong", "spectator")).await;
    send_json(&mut a, json!({ "type": "CHAT", "text": "hi" })).await;
    assert_silent(&mut b).await;

    // The connection is still usable.
    send_json(&mut a, start_game("START_GAME", "pong", "receiver")).await;
    assert_eq!(recv_json(&mut a).await["payload"]["role"], "receiver");
    assert_eq!(recv_json(&mut b).await["payload"]["role"], "sender");
}

// =========================================================================
// Disconnects
// =========================================================================

#[tokio::test]
async fn test_disconnect_updates_peer_and_resets_handshake() {
    let addr = start_server().await;
    let mut a = join(&addr, "/reset", 1).await;
    let mut b = join(&addr, "/reset", 2).await;
    recv_json(&mut a).await;

    send_json(&mut a, start_game("START_GAME", "pong", "sender")).await;
    recv_json(&mut a).await;
    recv_json(&mut b).await;

    a.send(Message::Close(None)).await.expect("close");
    assert_eq!(recv_json(&mut b).await, json!({ "type": "ROOM_UPDATE", "count": 1 }));

    // A newcomer takes the free seat and a fresh handshake goes through.
    let mut c = join(&addr, "/reset", 2).await;
    assert_eq!(recv_json(&mut b).await["count"], 2);

    send_json(&mut c, start_game("START_GAME", "chess", "sender")).await;
    assert_eq!(recv_json(&mut c).await["payload"]["gameType"], "chess");
    assert_eq!(recv_json(&mut b).await["payload"]["role"], "receiver");
}

#[tokio::test]
async fn test_room_is_fresh_after_everyone_leaves() {
    let addr = start_server().await;
    let mut a = join(&addr, "/again", 1).await;
    let mut b = join(&addr, "/again", 2).await;
    recv_json(&mut a).await;

    send_json(&mut a, start_game("START_GAME", "pong", "sender")).await;
    recv_json(&mut a).await;
    recv_json(&mut b).await;

    a.send(Message::Close(None)).await.expect("close");
    assert_eq!(recv_json(&mut b).await["count"], 1);
    b.send(Message::Close(None)).await.expect("close");

    let mut c = join_empty_room(&addr, "/again").await;
    let mut d = join(&addr, "/again", 2).await;
    assert_eq!(recv_json(&mut c).await["count"], 2);

    send_json(&mut c, start_game("START_GAME", "chess", "receiver")).await;
    assert_eq!(
        recv_json(&mut c).await,
        json!({ "type": "GAME_STARTED", "payload": { "gameType": "chess", "role": "receiver" } })
    );
    assert_eq!(
        recv_json(&mut d).await,
        json!({ "type": "GAME_STARTED", "payload": { "gameType": "chess", "role": "sender" } })
    );
}
