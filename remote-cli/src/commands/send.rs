//! Send a command to a device (phone role).

use anyhow::{Context, Result};
use remote_types::{Command, DeviceId, PinHash};

use crate::client::{ClientError, RelayClient};

/// Run the send command.
pub async fn run(
    client: &RelayClient,
    command: Command,
    device_id: &str,
    pin: &str,
    session_token: Option<&str>,
) -> Result<()> {
    let device_id = DeviceId::new(device_id);
    let pin_hash = PinHash::from_pin(pin);

    match client
        .send_command(&device_id, &pin_hash, command, session_token)
        .await
    {
        Ok(()) => {
            println!("{command} queued for {}", device_id.short());
            Ok(())
        }
        Err(ClientError::SessionExpired) => {
            anyhow::bail!("Session expired. Scan the new QR code on the Mac.")
        }
        Err(e) => Err(e).context("Failed to send command"),
    }
}
