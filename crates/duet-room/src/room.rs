//! A single room: two ordered seats and an optional negotiated session.

use std::collections::HashMap;

use duet_protocol::{Role, ServerMessage};
use duet_transport::ConnectionId;
use tokio::sync::mpsc;

use crate::{RoomPhase, SLOTS_PER_ROOM};

/// Channel sender for delivering outbound messages to a connection's task.
///
/// Unbounded, so fan-out under the registry lock never waits on a slow
/// client.
pub type Outbox = mpsc::UnboundedSender<ServerMessage>;

/// The registry's handle on a connection sitting in a seat.
///
/// It does not own the connection. The connection task holds the receiving
/// end of the outbox; once that task is gone the occupant reads as closed.
#[derive(Debug, Clone)]
pub struct Occupant {
    conn_id: ConnectionId,
    outbox: Outbox,
}

impl Occupant {
    pub fn new(conn_id: ConnectionId, outbox: Outbox) -> Self {
        Self { conn_id, outbox }
    }

    pub fn conn_id(&self) -> ConnectionId {
        self.conn_id
    }

    /// Returns `true` while the connection task is still receiving.
    pub fn is_open(&self) -> bool {
        !self.outbox.is_closed()
    }

    /// Queues a message for the connection. Silently drops it if the
    /// connection has already gone away.
    pub(crate) fn send(&self, msg: ServerMessage) {
        if self.is_open() {
            let _ = self.outbox.send(msg);
        }
    }
}

/// The negotiated session of a full room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    game_type: String,
    roles: HashMap<ConnectionId, Role>,
}

impl GameState {
    pub(crate) fn new(
        game_type: String,
        assignments: [(ConnectionId, Role); 2],
    ) -> Self {
        Self {
            game_type,
            roles: assignments.into_iter().collect(),
        }
    }

    /// The opaque game label the initiator asked for.
    pub fn game_type(&self) -> &str {
        &self.game_type
    }

    /// The role assigned to `conn_id`, if it is part of this session.
    pub fn role_of(&self, conn_id: ConnectionId) -> Option<Role> {
        self.roles.get(&conn_id).copied()
    }
}

pub(crate) struct Room {
    slots: [Option<Occupant>; SLOTS_PER_ROOM],
    pub(crate) game_state: Option<GameState>,
}

impl Room {
    pub(crate) fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| None),
            game_state: None,
        }
    }

    /// Counts occupied seats. Computed on every call, never cached.
    pub(crate) fn occupancy(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub(crate) fn phase(&self) -> RoomPhase {
        RoomPhase::derive(self.occupancy(), self.game_state.is_some())
    }

    /// Lowest-indexed empty seat.
    pub(crate) fn first_free_slot(&self) -> Option<usize> {
        self.slots.iter().position(Option::is_none)
    }

    pub(crate) fn occupy(&mut self, slot: usize, occupant: Occupant) {
        self.slots[slot] = Some(occupant);
    }

    /// Empties a seat and returns whoever sat there. Out-of-range seats
    /// are treated as already empty.
    pub(crate) fn vacate(&mut self, slot: usize) -> Option<Occupant> {
        self.slots.get_mut(slot).and_then(Option::take)
    }

    pub(crate) fn occupant(&self, slot: usize) -> Option<&Occupant> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    /// The occupant of any seat other than `slot`.
    pub(crate) fn peer_of(&self, slot: usize) -> Option<&Occupant> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != slot)
            .find_map(|(_, s)| s.as_ref())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.occupancy() == 0
    }

    /// Sends `msg` to every open occupant.
    pub(crate) fn broadcast(&self, msg: &ServerMessage) {
        for occupant in self.slots.iter().flatten() {
            occupant.send(msg.clone());
        }
    }

    /// Tells every occupant how many seats are taken right now.
    pub(crate) fn broadcast_occupancy(&self) {
        self.broadcast(&ServerMessage::RoomUpdate {
            count: self.occupancy(),
        });
    }
}
