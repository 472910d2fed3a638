//! Room registry: creates, tracks, and destroys rooms and seats connections.

use std::collections::HashMap;

use duet_protocol::{RoomId, ServerMessage};
use duet_transport::ConnectionId;

use crate::room::Room;
use crate::{
    GameState, Occupant, Outbox, RegistryConfig, RoomError, RoomPhase,
};

/// Where a connection sits: which room, which seat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub room_id: RoomId,
    pub slot: usize,
}

/// Owns every live room and the seat held by each connection.
///
/// A room is registered exactly as long as at least one of its seats is
/// taken. The registry is plain data with synchronous methods; the server
/// keeps a single instance behind one mutex so every join, leave and
/// handshake on a room is atomic with respect to the others.
pub struct RoomRegistry {
    /// Live rooms, keyed by the name clients connected with.
    rooms: HashMap<RoomId, Room>,

    /// Seat held by each connection. A connection holds at most one.
    members: HashMap<ConnectionId, Membership>,

    config: RegistryConfig,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new(config: RegistryConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            members: HashMap::new(),
            config,
        }
    }

    /// Returns the configuration the registry was created with.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Seats a connection in the named room, creating the room if needed.
    ///
    /// Takes the lowest free seat, records it against the connection and
    /// tells every occupant the new head count. Returns the seat index.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyInRoom`] if the connection already has a seat
    /// - [`RoomError::RoomFull`] if both seats are taken; the occupants
    ///   are left untouched
    pub fn join_room(
        &mut self,
        room_id: RoomId,
        conn_id: ConnectionId,
        outbox: Outbox,
    ) -> Result<usize, RoomError> {
        if let Some(current) = self.members.get(&conn_id) {
            return Err(RoomError::AlreadyInRoom(
                conn_id,
                current.room_id.clone(),
            ));
        }

        if let Some(room) = self.rooms.get(&room_id) {
            if room.first_free_slot().is_none() {
                return Err(RoomError::RoomFull(room_id));
            }
        }

        let room = self.rooms.entry(room_id.clone()).or_insert_with(|| {
            tracing::info!(%room_id, "room created");
            Room::new()
        });
        let slot = room
            .first_free_slot()
            .ok_or_else(|| RoomError::RoomFull(room_id.clone()))?;

        room.occupy(slot, Occupant::new(conn_id, outbox));
        tracing::info!(
            %room_id,
            %conn_id,
            slot,
            count = room.occupancy(),
            "connection joined"
        );
        room.broadcast_occupancy();

        self.members.insert(conn_id, Membership { room_id, slot });
        Ok(slot)
    }

    /// Empties one seat.
    ///
    /// The last occupant leaving removes the room; a later join with the
    /// same id starts from scratch. If one occupant remains, any
    /// negotiated session is discarded and the survivor gets a fresh head
    /// count. A room that no longer exists, or a seat that is already
    /// empty, is a no-op.
    pub fn leave_room(&mut self, room_id: &RoomId, slot: usize) {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return;
        };

        // An empty or out-of-range seat means this leave was already
        // processed, or never applied; the room must stay as it is.
        let Some(occupant) = room.vacate(slot) else {
            return;
        };
        self.members.remove(&occupant.conn_id());
        tracing::info!(
            %room_id,
            conn_id = %occupant.conn_id(),
            slot,
            count = room.occupancy(),
            "connection left"
        );

        if room.is_empty() {
            self.rooms.remove(room_id);
            tracing::info!(%room_id, "room is empty and has been removed");
            return;
        }

        if room.game_state.take().is_some() {
            tracing::debug!(%room_id, "peer left, session discarded");
        }
        room.broadcast_occupancy();
    }

    /// Removes a connection from whatever seat it holds.
    ///
    /// Safe to call more than once: a connection without a seat is a
    /// no-op, and a seat since taken by someone else is never touched.
    pub fn leave(&mut self, conn_id: ConnectionId) {
        if let Some(Membership { room_id, slot }) =
            self.members.get(&conn_id).cloned()
        {
            self.leave_room(&room_id, slot);
        }
    }

    /// Sends `msg` to every open occupant of the room. Closed and empty
    /// seats are skipped; an unknown room is a no-op.
    pub fn broadcast(&self, room_id: &RoomId, msg: &ServerMessage) {
        if let Some(room) = self.rooms.get(room_id) {
            room.broadcast(msg);
        }
    }

    /// Returns the seat held by a connection, if any.
    pub fn membership(&self, conn_id: ConnectionId) -> Option<&Membership> {
        self.members.get(&conn_id)
    }

    /// Number of occupied seats in a room; 0 for an unknown room.
    pub fn occupancy(&self, room_id: &RoomId) -> usize {
        self.rooms.get(room_id).map_or(0, Room::occupancy)
    }

    /// Current phase of a room; `Empty` for an unknown room.
    pub fn phase(&self, room_id: &RoomId) -> RoomPhase {
        self.rooms.get(room_id).map_or(RoomPhase::Empty, Room::phase)
    }

    /// The negotiated session of a room, if one exists.
    pub fn game_state(&self, room_id: &RoomId) -> Option<&GameState> {
        self.rooms.get(room_id).and_then(|r| r.game_state.as_ref())
    }

    /// Whether a room with this id is currently live.
    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub(crate) fn room_mut(&mut self, room_id: &RoomId) -> Option<&mut Room> {
        self.rooms.get_mut(room_id)
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}
