//! remote-relay binary entry point.
//!
//! Usage:
//! ```bash
//! la-remote-relay --config relay.toml
//! RUST_LOG=la_remote_relay=debug la-remote-relay
//! ```

use anyhow::Context;
use la_remote_relay::cleanup::spawn_cleanup_task;
use la_remote_relay::config::Config;
use la_remote_relay::http::build_router;
use la_remote_relay::server::RemoteRelay;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "relay.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("la_remote_relay=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    let config = load_config()?;
    let bind_address = config.server.bind_address.clone();
    let cleanup_config = config.cleanup.clone();

    let relay = Arc::new(RemoteRelay::new(config));
    let cleanup = spawn_cleanup_task(relay.clone(), cleanup_config);
    let app = build_router(relay);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    tracing::info!(
        "la-remote-relay v{} listening on {}",
        env!("CARGO_PKG_VERSION"),
        bind_address
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    cleanup.abort();
    tracing::info!("Relay stopped");
    Ok(())
}

/// Load the config file named by `--config`, or `relay.toml` if present.
///
/// An explicit path must exist; the default path may be absent, in which
/// case built-in defaults apply.
fn load_config() -> anyhow::Result<Config> {
    match get_config_path() {
        Some(path) => Config::from_file(&path)
            .with_context(|| format!("loading {}", path.display())),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default.exists() {
                Ok(Config::from_file(&default)?)
            } else {
                tracing::info!("No {} found, using defaults", DEFAULT_CONFIG_PATH);
                Ok(Config::default())
            }
        }
    }
}

fn get_config_path() -> Option<PathBuf> {
    std::env::args()
        .skip_while(|arg| arg != "--config")
        .nth(1)
        .map(PathBuf::from)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
