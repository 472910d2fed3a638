//! Room registry and session handshake for Duet.
//!
//! A room is a named pair of seats. Connections join by name, the registry
//! hands out seats and reports occupancy, and once both seats are taken a
//! single handshake message assigns complementary roles to the two
//! occupants.
//!
//! # Key types
//!
//! - [`RoomRegistry`]: owns every room; join, leave, broadcast, handshake
//! - [`Occupant`] / [`Outbox`]: the registry's handle on a connection
//! - [`GameState`]: the negotiated game type and roles of a full room
//! - [`RoomPhase`]: derived lifecycle state of a room
//! - [`RegistryConfig`]: registry settings (redirect target)

mod config;
mod error;
mod handshake;
mod registry;
mod room;

pub use config::{RegistryConfig, RoomPhase, SLOTS_PER_ROOM};
pub use error::RoomError;
pub use handshake::redirect_url;
pub use registry::{Membership, RoomRegistry};
pub use room::{GameState, Occupant, Outbox};
