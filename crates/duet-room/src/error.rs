//! Error types for the room layer.

use duet_protocol::RoomId;
use duet_transport::ConnectionId;

use crate::RoomPhase;

/// Errors that can occur during room operations.
///
/// None of these are fatal: each is scoped to the one connection or
/// message that caused it.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The connection's path named no room.
    #[error("connection path carries no room id")]
    MissingRoomId,

    /// Both seats are taken.
    #[error("room {0} is full")]
    RoomFull(RoomId),

    /// The connection already holds a seat.
    #[error("{0} already in room {1}")]
    AlreadyInRoom(ConnectionId, RoomId),

    /// The connection holds no seat in any room.
    #[error("{0} is not in any room")]
    NotInRoom(ConnectionId),

    /// A game-initiation message arrived while the room could not start a
    /// session: the peer is missing, or a session is already negotiated.
    #[error("stale handshake in room {room_id} ({phase})")]
    StaleHandshake { room_id: RoomId, phase: RoomPhase },
}
