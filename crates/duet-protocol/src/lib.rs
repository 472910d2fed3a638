//! Wire protocol for Duet.
//!
//! This crate defines what clients and the relay say to each other:
//!
//! - **Types** ([`ClientMessage`], [`ServerMessage`], [`Role`], [`RoomId`]):
//!   the records that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those records are
//!   converted to and from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong while doing so.
//!
//! The protocol layer knows nothing about sockets or rooms. It sits between
//! the transport (raw bytes) and the room registry (state machine).
//!
//! ```text
//! Transport (bytes) → Protocol (ClientMessage) → Room registry
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientMessage, GameAssignment, GameRequest, Redirect, Role, RoomId,
    ServerMessage,
};
