//! `databag-svc` — service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the tracing subscriber (and OTLP export when configured).
//! 3. Resolve the shared secret and encryption version.
//! 4. Build the Axum router over an in-memory item store and serve it.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use databag::config::Config;
use databag::server::{self, state::AppState};
use databag::store::MemoryStore;
use databag::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(&cfg.log_level, cfg.otlp_endpoint.as_deref())?;

    // -----------------------------------------------------------------------
    // 3. Encryption settings
    // -----------------------------------------------------------------------
    let secret = cfg.secret()?;
    let version = cfg.scheme_version()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        encryption_enabled = !secret.is_empty(),
        encryption_version = %version,
        "databag-svc starting"
    );

    // -----------------------------------------------------------------------
    // 4. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::new(Arc::new(MemoryStore::new()), secret, version);
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    info!(addr = %addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
