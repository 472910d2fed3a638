//! The session handshake: one message turns a full room into a session.
//!
//! Either occupant of a `Ready` room may send a game-initiation message
//! naming a game type and its own role. The other occupant gets the
//! complementary role. What each side is then told depends on where the
//! two clients currently are:
//!
//! | message       | initiator       | peer               |
//! |---------------|-----------------|--------------------|
//! | `START_GAME`  | `GAME_STARTED`  | `GAME_STARTED`     |
//! | `JOINED_GAME` | `GAME_STARTED`  | `REDIRECT_TO_GAME` |

use duet_protocol::{
    ClientMessage, GameAssignment, GameRequest, Redirect, Role, RoomId,
    ServerMessage,
};
use duet_transport::ConnectionId;
use url::form_urlencoded;

use crate::{GameState, RoomError, RoomRegistry};

/// Which client view each side is on when the session starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Initiation {
    /// Both are outside the session view.
    Host,
    /// The initiator is already inside; the peer must be sent there.
    PeerJoined,
}

impl RoomRegistry {
    /// Applies a client message from `conn_id` to its room.
    ///
    /// Unrecognized messages are accepted and do nothing.
    ///
    /// # Errors
    /// - [`RoomError::NotInRoom`] if the sender holds no seat
    /// - [`RoomError::StaleHandshake`] if the room has no peer yet or a
    ///   session is already negotiated; nothing is sent and nothing changes
    pub fn handle_message(
        &mut self,
        conn_id: ConnectionId,
        msg: ClientMessage,
    ) -> Result<(), RoomError> {
        let (initiation, request) = match msg {
            ClientMessage::StartGame { payload } => (Initiation::Host, payload),
            ClientMessage::JoinedGame { payload } => {
                (Initiation::PeerJoined, payload)
            }
            ClientMessage::Unknown => {
                tracing::debug!(%conn_id, "ignoring unrecognized message");
                return Ok(());
            }
        };

        let membership = self
            .membership(conn_id)
            .cloned()
            .ok_or(RoomError::NotInRoom(conn_id))?;
        let redirect_base = self.config().redirect_base.clone();
        let room_id = membership.room_id;
        let room = self
            .room_mut(&room_id)
            .ok_or(RoomError::NotInRoom(conn_id))?;

        let phase = room.phase();
        if !phase.accepts_handshake() {
            return Err(RoomError::StaleHandshake { room_id, phase });
        }

        // Ready means both seats are taken, so both lookups succeed.
        let (Some(initiator), Some(peer)) = (
            room.occupant(membership.slot).cloned(),
            room.peer_of(membership.slot).cloned(),
        ) else {
            return Err(RoomError::StaleHandshake { room_id, phase });
        };

        let GameRequest { game_type, role } = request;
        let peer_role = role.complement();
        room.game_state = Some(GameState::new(
            game_type.clone(),
            [(initiator.conn_id(), role), (peer.conn_id(), peer_role)],
        ));

        tracing::info!(
            %room_id,
            initiator = %initiator.conn_id(),
            peer = %peer.conn_id(),
            %game_type,
            %role,
            ?initiation,
            "session negotiated"
        );

        initiator.send(game_started(&game_type, role));
        let to_peer = match initiation {
            Initiation::Host => game_started(&game_type, peer_role),
            Initiation::PeerJoined => ServerMessage::RedirectToGame {
                payload: Redirect {
                    url: redirect_url(
                        &redirect_base,
                        &room_id,
                        &game_type,
                        peer_role,
                    ),
                },
            },
        };
        peer.send(to_peer);

        Ok(())
    }
}

fn game_started(game_type: &str, role: Role) -> ServerMessage {
    ServerMessage::GameStarted {
        payload: GameAssignment {
            game_type: game_type.to_owned(),
            role,
        },
    }
}

/// Builds the address of the in-session view for one participant:
/// `{base}/{room_id}?gameType={game_type}&role={role}`.
///
/// The room id is used as-is (it came from a request path); the query
/// values are form-urlencoded.
pub fn redirect_url(
    base: &str,
    room_id: &RoomId,
    game_type: &str,
    role: Role,
) -> String {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("gameType", game_type)
        .append_pair("role", role.as_str())
        .finish();
    format!("{}/{}?{}", base.trim_end_matches('/'), room_id, query)
}
