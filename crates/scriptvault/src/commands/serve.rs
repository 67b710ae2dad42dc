//! Server command handler.

use super::history::build_dispatcher;
use anyhow::Context;
use scriptvault_core::Config;
use scriptvault_server::AppState;
use std::net::SocketAddr;
use tracing::info;

/// Run the HTTP server until the process is stopped.
///
/// An explicit `address` overrides `server.address`; links to the markup
/// view then point at it unless `server.public_url` is set.
pub async fn run_server(config: &Config, address: Option<SocketAddr>) -> anyhow::Result<()> {
    let address = match address {
        Some(address) => address,
        None => config
            .server_address()
            .parse()
            .with_context(|| format!("Invalid server.address: {}", config.server_address()))?,
    };

    let public_url = match config.server.as_ref().and_then(|s| s.public_url.as_ref()) {
        Some(_) => config.public_url(),
        None => format!("http://{address}"),
    };

    info!(
        address = %address,
        lock_timeout_ms = config.lock_timeout().as_millis() as u64,
        "Starting scriptvault server"
    );
    let state = AppState::new(build_dispatcher(config, public_url)?);
    scriptvault_server::serve(state, address).await?;
    Ok(())
}
