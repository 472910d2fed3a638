//! Per-connection handler: seat the connection, relay, clean up.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Derive the room id from the request path → close if there is none
//!   2. Join the room → close with policy violation if it is full
//!   3. Loop: decode inbound frames into the registry, and write out
//!      whatever the registry queued for this connection
//!   4. Give up the seat when the client goes away

use std::sync::Arc;

use duet_protocol::{ClientMessage, Codec, RoomId};
use duet_room::RoomError;
use duet_transport::{
    CLOSE_NORMAL, CLOSE_POLICY_VIOLATION, Connection, ConnectionId,
    WebSocketConnection,
};
use tokio::sync::mpsc;

use crate::DuetError;
use crate::server::ServerState;

/// Gives up a connection's seat when the handler exits.
///
/// The normal path releases explicitly so the peer sees the new head count
/// before the task ends. If the handler bails out early or panics, `Drop`
/// spawns the release instead, since it can't await the lock itself.
struct SeatGuard<C: Codec> {
    conn_id: ConnectionId,
    state: Arc<ServerState<C>>,
    released: bool,
}

impl<C: Codec> SeatGuard<C> {
    async fn release(mut self) {
        self.state.rooms.lock().await.leave(self.conn_id);
        self.released = true;
    }
}

impl<C: Codec> Drop for SeatGuard<C> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let conn_id = self.conn_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            state.rooms.lock().await.leave(conn_id);
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), DuetError> {
    let conn_id = conn.id();

    // --- Step 1: Room id ---
    let Some(room_id) = RoomId::from_path(conn.request_path()) else {
        tracing::info!(%conn_id, "connection without a room id, closing");
        conn.close(CLOSE_NORMAL, "missing room id").await?;
        return Err(RoomError::MissingRoomId.into());
    };

    // --- Step 2: Seat ---
    let (outbox, mut inbox) = mpsc::unbounded_channel();
    let joined = state
        .rooms
        .lock()
        .await
        .join_room(room_id.clone(), conn_id, outbox);
    if let Err(e) = joined {
        tracing::info!(%conn_id, %room_id, error = %e, "rejecting connection");
        let (code, reason) = rejection(&e);
        conn.close(code, reason).await?;
        return Err(e.into());
    }
    let guard = SeatGuard {
        conn_id,
        state: Arc::clone(&state),
        released: false,
    };

    // --- Step 3: Relay ---
    loop {
        tokio::select! {
            incoming = conn.recv() => match incoming {
                Ok(Some(data)) => {
                    handle_frame(&state, conn_id, &room_id, &data).await;
                }
                Ok(None) => {
                    tracing::info!(%conn_id, %room_id, "client disconnected");
                    break;
                }
                Err(e) => {
                    tracing::debug!(%conn_id, %room_id, error = %e, "connection error");
                    break;
                }
            },
            Some(msg) = inbox.recv() => {
                let bytes = state.codec.encode(&msg)?;
                if let Err(e) = conn.send(&bytes).await {
                    tracing::debug!(%conn_id, error = %e, "send failed");
                    break;
                }
            }
        }
    }

    // --- Step 4: Cleanup ---
    guard.release().await;
    Ok(())
}

/// Close code and reason for a connection that could not be seated.
fn rejection(err: &RoomError) -> (u16, &'static str) {
    match err {
        RoomError::RoomFull(_) => (CLOSE_POLICY_VIOLATION, "room is full"),
        RoomError::AlreadyInRoom(..) => {
            (CLOSE_POLICY_VIOLATION, "already in a room")
        }
        _ => (CLOSE_NORMAL, "unable to join room"),
    }
}

/// Decodes one inbound frame and applies it to the registry.
///
/// Malformed frames and messages the room can't act on are dropped
/// without a reply.
async fn handle_frame<C: Codec>(
    state: &ServerState<C>,
    conn_id: ConnectionId,
    room_id: &RoomId,
    data: &[u8],
) {
    tracing::debug!(%conn_id, %room_id, len = data.len(), "received message");

    let msg: ClientMessage = match state.codec.decode(data) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "dropping malformed message");
            return;
        }
    };

    if let Err(e) = state.rooms.lock().await.handle_message(conn_id, msg) {
        tracing::debug!(%conn_id, error = %e, "message ignored");
    }
}
