//! `DuetServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → room registry. One
//! registry is created per server and shared with every connection task.

use std::net::SocketAddr;
use std::sync::Arc;

use duet_protocol::{Codec, JsonCodec};
use duet_room::{RegistryConfig, RoomRegistry};
use duet_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::DuetError;
use crate::handler::handle_connection;

/// Address the server binds to unless told otherwise.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8081";

/// Shared server state passed to each connection handler task.
///
/// The registry is the only shared mutable resource, so it is the only
/// thing behind a lock.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) rooms: Mutex<RoomRegistry>,
    pub(crate) codec: C,
}

/// Builder for configuring and starting a Duet server.
///
/// # Example
///
/// ```rust,no_run
/// # async fn start() -> Result<(), duet::DuetError> {
/// use duet::DuetServer;
///
/// let server = DuetServer::builder()
///     .bind("127.0.0.1:8081")
///     .redirect_base("/play")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct DuetServerBuilder {
    bind_addr: String,
    registry_config: RegistryConfig,
}

impl DuetServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            registry_config: RegistryConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the path prefix redirects point at.
    pub fn redirect_base(mut self, base: &str) -> Self {
        self.registry_config.redirect_base = base.to_string();
        self
    }

    /// Replaces the whole registry configuration.
    pub fn registry_config(mut self, config: RegistryConfig) -> Self {
        self.registry_config = config;
        self
    }

    /// Binds the listener and builds the server.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<DuetServer<JsonCodec>, DuetError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomRegistry::new(self.registry_config)),
            codec: JsonCodec,
        });

        Ok(DuetServer { transport, state })
    }
}

impl Default for DuetServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Duet server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct DuetServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl DuetServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> DuetServerBuilder {
        DuetServerBuilder::new()
    }
}

impl<C: Codec> DuetServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, DuetError> {
        Ok(self.transport.local_addr()?)
    }

    /// Runs the accept loop.
    ///
    /// Each accepted connection gets its own task, which owns it until it
    /// closes. A failed accept only affects that one client. Runs until
    /// the process is terminated.
    pub async fn run(mut self) -> Result<(), DuetError> {
        tracing::info!(addr = ?self.transport.local_addr().ok(), "Duet server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
