//! Registry configuration and the room phase machine.

// ---------------------------------------------------------------------------
// RegistryConfig
// ---------------------------------------------------------------------------

/// Number of seats in every room.
pub const SLOTS_PER_ROOM: usize = 2;

/// Configuration for a [`RoomRegistry`](crate::RoomRegistry).
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Path prefix of the in-session client view. Redirects point at
    /// `{redirect_base}/{room_id}?gameType=..&role=..`.
    pub redirect_base: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            redirect_base: "/game".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// The lifecycle phase of a room.
///
/// Phases are never stored. They are derived from the number of occupied
/// seats and whether a game state exists, so a join or leave can never
/// leave a stale phase behind:
///
/// ```text
/// Empty ──join──→ Waiting ──join──→ Ready ──handshake──→ Negotiating
///   ↑               │  ↑              │                     │
///   └─────leave─────┘  └─────leave────┴─────────leave───────┘
/// ```
///
/// - **Empty**: no occupants. Only observable for a room id that isn't
///   registered, since empty rooms are removed on the spot.
/// - **Waiting**: one occupant, nobody to pair with.
/// - **Ready**: two occupants, no session negotiated yet.
/// - **Negotiating**: two occupants with assigned roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    Empty,
    Waiting,
    Ready,
    Negotiating,
}

impl RoomPhase {
    /// Derives the phase from the seat count and game state presence.
    pub fn derive(occupancy: usize, has_game_state: bool) -> Self {
        match (occupancy, has_game_state) {
            (0, _) => Self::Empty,
            (1, _) => Self::Waiting,
            (_, false) => Self::Ready,
            (_, true) => Self::Negotiating,
        }
    }

    /// Returns `true` if a game-initiation message would start a session.
    pub fn accepts_handshake(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl std::fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "empty"),
            Self::Waiting => write!(f, "waiting"),
            Self::Ready => write!(f, "ready"),
            Self::Negotiating => write!(f, "negotiating"),
        }
    }
}
