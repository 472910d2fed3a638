//! Runs the Duet relay.
//!
//! Environment:
//! - `DUET_ADDR`: listen address (default `0.0.0.0:8081`)
//! - `DUET_REDIRECT_BASE`: path prefix of the in-session view (default `/game`)
//! - `RUST_LOG`: log filter (default `info`)

use duet::prelude::*;

#[tokio::main]
async fn main() -> Result<(), DuetError> {
    duet::init_logging("info");

    let mut builder = DuetServer::builder();
    if let Ok(addr) = std::env::var("DUET_ADDR") {
        builder = builder.bind(&addr);
    }
    if let Ok(base) = std::env::var("DUET_REDIRECT_BASE") {
        builder = builder.redirect_base(&base);
    }

    let server = builder.build().await?;
    tracing::info!(addr = %server.local_addr()?, "relay ready");
    server.run().await
}
