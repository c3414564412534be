//! Poll the relay for commands.

use anyhow::Result;
use remote_types::Command;
use std::path::Path;
use std::time::Duration;

use super::register::register_device;
use crate::client::{ClientError, RelayClient};
use crate::config::DeviceConfig;

/// Outcome of a single poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A command was delivered.
    Delivered(Command),
    /// Nothing pending.
    Idle,
    /// The relay had forgotten us; a fresh token was obtained.
    Reregistered,
}

/// Poll once, registering first if the device has no token yet.
///
/// A 403/404 means the relay lost our registration (restart or eviction).
/// The device re-registers and the new token is persisted before returning.
pub async fn poll_once(
    data_dir: &Path,
    client: &RelayClient,
    device: &mut DeviceConfig,
) -> Result<PollOutcome> {
    let Some(token) = device.token() else {
        register_device(client, device).await?;
        device.save(data_dir).await?;
        return Ok(PollOutcome::Reregistered);
    };

    match client.poll(&device.id(), &token).await {
        Ok(Some(command)) => Ok(PollOutcome::Delivered(command)),
        Ok(None) => Ok(PollOutcome::Idle),
        Err(ClientError::NotRegistered) => {
            eprintln!("Relay lost registration, re-registering...");
            register_device(client, device).await?;
            device.save(data_dir).await?;
            Ok(PollOutcome::Reregistered)
        }
        Err(e) => Err(e.into()),
    }
}

/// Run the poll command.
///
/// Transport errors are reported and retried on the next tick unless
/// `once` is set.
pub async fn run(data_dir: &Path, client: &RelayClient, interval_ms: u64, once: bool) -> Result<()> {
    let mut device = DeviceConfig::load(data_dir).await?;
    let interval = Duration::from_millis(interval_ms.max(1));

    if !once {
        println!(
            "Polling {} every {}ms (Ctrl+C to stop)",
            client.base_url(),
            interval.as_millis()
        );
    }

    loop {
        match poll_once(data_dir, client, &mut device).await {
            Ok(PollOutcome::Delivered(command)) => println!("{command}"),
            Ok(PollOutcome::Idle) => {
                if once {
                    println!("No pending command");
                }
            }
            Ok(PollOutcome::Reregistered) => println!("Registered with {}", client.base_url()),
            Err(e) if once => return Err(e),
            Err(e) => eprintln!("Poll failed: {e:#}"),
        }

        if once {
            return Ok(());
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = tokio::signal::ctrl_c() => {
                println!("Stopped.");
                return Ok(());
            }
        }
    }
}
