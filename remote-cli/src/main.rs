//! # la-remote
//!
//! Command-line client for the LA cloud remote relay.
//!
//! ## Commands
//!
//! - `init`: Create a device identity protected by a PIN
//! - `register`: Register the device with the relay
//! - `poll`: Poll for commands, re-registering if the relay lost state
//! - `send`: Queue ARM or DISARM for a device (phone role)
//! - `rotate-session`: Issue a new QR session token
//! - `hash-pin`: Print the SHA-256 digest of a PIN
//! - `status`: Show local state and relay reachability
//!
//! ## Example
//!
//! ```bash
//! # On the Mac
//! la-remote init --pin 1234
//! la-remote poll
//!
//! # From anywhere else
//! la-remote send ARM --device-id <id> --pin 1234
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use remote_types::{Command, PinHash};
use std::path::PathBuf;

mod client;
mod commands;
mod config;

use client::RelayClient;
use commands::{init, poll, register, send, session, status};

/// Command-line client for the LA cloud remote relay.
#[derive(Parser, Debug)]
#[command(name = "la-remote")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Relay base URL
    #[arg(long, global = true, default_value = "http://127.0.0.1:10000")]
    relay: String,

    /// Data directory for storing device state
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a device identity
    Init {
        /// PIN the phone must present
        #[arg(long)]
        pin: String,
    },

    /// Register the device with the relay
    Register,

    /// Poll the relay for commands
    Poll {
        /// Delay between polls in milliseconds
        #[arg(long, default_value = "1000")]
        interval_ms: u64,

        /// Poll a single time and exit
        #[arg(long)]
        once: bool,
    },

    /// Send a command to a device
    Send {
        /// ARM or DISARM
        command: Command,

        /// Target device identifier
        #[arg(long)]
        device_id: String,

        /// Device PIN
        #[arg(long)]
        pin: String,

        /// Session token from the QR code
        #[arg(long)]
        session_token: Option<String>,
    },

    /// Issue a new session token for the QR code
    RotateSession,

    /// Print the SHA-256 hex digest of a PIN
    HashPin {
        /// PIN to hash
        pin: String,
    },

    /// Show device status
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = RelayClient::new(&cli.relay)?;

    match cli.command {
        Commands::Init { pin } => {
            let data_dir = prepare_data_dir(cli.data_dir).await?;
            init::run(&data_dir, &pin).await?;
        }
        Commands::Register => {
            let data_dir = prepare_data_dir(cli.data_dir).await?;
            register::run(&data_dir, &client).await?;
        }
        Commands::Poll { interval_ms, once } => {
            let data_dir = prepare_data_dir(cli.data_dir).await?;
            poll::run(&data_dir, &client, interval_ms, once).await?;
        }
        Commands::Send {
            command,
            device_id,
            pin,
            session_token,
        } => {
            send::run(
                &client,
                command,
                &device_id,
                &pin,
                session_token.as_deref(),
            )
            .await?;
        }
        Commands::RotateSession => {
            let data_dir = prepare_data_dir(cli.data_dir).await?;
            session::run(&data_dir, &client).await?;
        }
        Commands::HashPin { pin } => {
            println!("{}", PinHash::from_pin(&pin).as_str());
        }
        Commands::Status => {
            let data_dir = prepare_data_dir(cli.data_dir).await?;
            status::run(&data_dir, &client).await?;
        }
    }

    Ok(())
}

/// Resolve the data directory and make sure it exists with owner-only access.
async fn prepare_data_dir(data_dir: Option<PathBuf>) -> Result<PathBuf> {
    let data_dir = match data_dir {
        Some(dir) => dir,
        None => default_data_dir()?,
    };

    tokio::fs::create_dir_all(&data_dir)
        .await
        .context("Failed to create data directory")?;
    config::set_dir_permissions_0700(&data_dir).await?;

    Ok(data_dir)
}

/// Get the default data directory for la-remote.
fn default_data_dir() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("com", "la-software", "la-remote")
        .context("Could not determine home directory")?;
    Ok(dirs.data_dir().to_path_buf())
}
