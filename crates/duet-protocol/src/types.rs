//! Wire types for the Duet relay.
//!
//! Every record is a JSON object with a `type` tag. Inbound messages that
//! start a session carry a `payload` with the game type and the sender's
//! requested role; outbound messages report occupancy, confirm a session,
//! or tell a client where to navigate.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// RoomId
// ---------------------------------------------------------------------------

/// The name of a room, taken verbatim from the path a client connected on.
///
/// Serializes as a plain string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Creates a room id from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives the room id from a request path by dropping its leading
    /// separator: `/123456` becomes `123456`.
    ///
    /// Returns `None` when nothing is left, so `/` and the empty path
    /// never name a room.
    pub fn from_path(path: &str) -> Option<Self> {
        let id = path.strip_prefix('/').unwrap_or(path);
        if id.is_empty() {
            None
        } else {
            Some(Self(id.to_owned()))
        }
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// The part a connection plays in a two-player session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Sender,
    Receiver,
}

impl Role {
    /// Returns the role the other occupant gets.
    ///
    /// There are exactly two roles, so this is a fixed swap.
    pub fn complement(self) -> Self {
        match self {
            Role::Sender => Role::Receiver,
            Role::Receiver => Role::Sender,
        }
    }

    /// The wire name of the role.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Sender => "sender",
            Role::Receiver => "receiver",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// What an initiator asks for: the game to play and its own role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRequest {
    /// Opaque label naming the game. The relay never interprets it.
    pub game_type: String,
    /// The role the initiator wants for itself.
    pub role: Role,
}

/// What a participant is told once a session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameAssignment {
    pub game_type: String,
    pub role: Role,
}

/// Where a client outside the session view should navigate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redirect {
    pub url: String,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Messages a client sends to the relay.
///
/// Internally tagged: `{"type": "START_GAME", "payload": {...}}`. A `type`
/// the relay doesn't know decodes to [`ClientMessage::Unknown`] rather than
/// failing, so newer clients can talk to an older relay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Host-initiated start: neither occupant is in the session view yet.
    /// Both get a `GAME_STARTED`.
    StartGame { payload: GameRequest },

    /// The sender is already in the session view and its peer is not.
    /// The sender gets `GAME_STARTED`, the peer a `REDIRECT_TO_GAME`.
    JoinedGame { payload: GameRequest },

    /// Any other `type`.
    #[serde(other)]
    Unknown,
}

/// Messages the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    /// Number of occupied slots in the client's room (0, 1 or 2).
    RoomUpdate { count: usize },

    /// The session started; here is your role.
    GameStarted { payload: GameAssignment },

    /// The session started without you in its view; go here.
    RedirectToGame { payload: Redirect },
}

#[cfg(test)]
mod tests {
    //! The browser client reads these shapes directly, so the tests pin
    //! the exact JSON rather than just checking that values survive.

    use super::*;
    use serde_json::json;

    // =====================================================================
    // RoomId
    // =====================================================================

    #[test]
    fn test_room_id_from_path_strips_leading_slash() {
        assert_eq!(RoomId::from_path("/123456"), Some(RoomId::new("123456")));
    }

    #[test]
    fn test_room_id_from_path_rejects_empty_remainder() {
        assert_eq!(RoomId::from_path("/"), None);
        assert_eq!(RoomId::from_path(""), None);
    }

    #[test]
    fn test_room_id_from_path_keeps_inner_separators() {
        let id = RoomId::from_path("/team/alpha").unwrap();
        assert_eq!(id.as_str(), "team/alpha");
    }

    #[test]
    fn test_room_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomId::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
        assert_eq!(RoomId::new("abc").to_string(), "abc");
    }

    // =====================================================================
    // Role
    // =====================================================================

    #[test]
    fn test_role_complement_swaps() {
        assert_eq!(Role::Sender.complement(), Role::Receiver);
        assert_eq!(Role::Receiver.complement(), Role::Sender);
        assert_eq!(Role::Sender.complement().complement(), Role::Sender);
    }

    #[test]
    fn test_role_wire_names_are_lowercase() {
        assert_eq!(serde_json::to_value(Role::Sender).unwrap(), json!("sender"));
        assert_eq!(
            serde_json::to_value(Role::Receiver).unwrap(),
            json!("receiver")
        );
        assert_eq!(Role::Receiver.to_string(), "receiver");
    }

    #[test]
    fn test_role_rejects_unknown_name() {
        let result: Result<Role, _> = serde_json::from_str("\"spectator\"");
        assert!(result.is_err());
    }

    // =====================================================================
    // ClientMessage
    // =====================================================================

    #[test]
    fn test_client_start_game_decodes() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "START_GAME",
            "payload": { "gameType": "chess", "role": "receiver" }
        }))
        .unwrap();
        assert_eq!(
            msg,
            ClientMessage::StartGame {
                payload: GameRequest {
                    game_type: "chess".into(),
                    role: Role::Receiver,
                }
            }
        );
    }

    #[test]
    fn test_client_joined_game_decodes() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "JOINED_GAME",
            "payload": { "gameType": "pong", "role": "sender" }
        }))
        .unwrap();
        assert!(matches!(msg, ClientMessage::JoinedGame { .. }));
    }

    #[test]
    fn test_client_unknown_type_decodes_to_unknown() {
        let msg: ClientMessage = serde_json::from_value(json!({
            "type": "CHAT",
            "payload": { "text": "hi" }
        }))
        .unwrap();
        assert_eq!(msg, ClientMessage::Unknown);
    }

    #[test]
    fn test_client_missing_payload_is_error() {
        let result: Result<ClientMessage, _> =
            serde_json::from_value(json!({ "type": "START_GAME" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_missing_game_type_is_error() {
        let result: Result<ClientMessage, _> = serde_json::from_value(json!({
            "type": "START_GAME",
            "payload": { "role": "sender" }
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_client_missing_type_is_error() {
        let result: Result<ClientMessage, _> = serde_json::from_value(json!({
            "payload": { "gameType": "pong", "role": "sender" }
        }));
        assert!(result.is_err());
    }

    // =====================================================================
    // ServerMessage
    // =====================================================================

    #[test]
    fn test_room_update_json_format() {
        let json =
            serde_json::to_value(ServerMessage::RoomUpdate { count: 1 }).unwrap();
        assert_eq!(json, json!({ "type": "ROOM_UPDATE", "count": 1 }));
    }

    #[test]
    fn test_game_started_json_format() {
        let msg = ServerMessage::GameStarted {
            payload: GameAssignment {
                game_type: "pong".into(),
                role: Role::Sender,
            },
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "GAME_STARTED",
                "payload": { "gameType": "pong", "role": "sender" }
            })
        );
    }

    #[test]
    fn test_redirect_json_format() {
        let msg = ServerMessage::RedirectToGame {
            payload: Redirect {
                url: "/game/42?gameType=pong&role=sender".into(),
            },
        };
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({
                "type": "REDIRECT_TO_GAME",
                "payload": { "url": "/game/42?gameType=pong&role=sender" }
            })
        );
    }
}
