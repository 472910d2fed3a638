//! # Duet
//!
//! A real-time matchmaking relay for two-player web games.
//!
//! Clients open a WebSocket on `/{room_id}`. The first two connections on
//! a room id share it; a third is turned away. Both occupants are told the
//! head count whenever it changes, and once the room is full a single
//! handshake message assigns each of them one of two complementary roles.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use duet::prelude::*;
//!
//! # async fn start() -> Result<(), DuetError> {
//! let server = DuetServer::builder().bind("0.0.0.0:8081").build().await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod logging;
mod server;

pub use error::DuetError;
pub use logging::init_logging;
pub use server::{DEFAULT_BIND_ADDR, DuetServer, DuetServerBuilder};

pub mod prelude {
    //! Everything needed to run a server or talk to one.

    pub use crate::{DEFAULT_BIND_ADDR, DuetError, DuetServer, DuetServerBuilder};
    pub use duet_protocol::{
        ClientMessage, Codec, GameAssignment, GameRequest, JsonCodec,
        Redirect, Role, RoomId, ServerMessage,
    };
    pub use duet_room::{RegistryConfig, RoomError, RoomPhase};
}
