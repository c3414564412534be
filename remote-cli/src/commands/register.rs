//! Register the device with the relay.

use anyhow::{Context, Result};
use std::path::Path;

use crate::client::RelayClient;
use crate::config::DeviceConfig;

/// Register `device` and store the fresh token on it.
///
/// The current session token, if any, is sent along so the relay keeps
/// accepting the QR code already on screen.
pub async fn register_device(client: &RelayClient, device: &mut DeviceConfig) -> Result<()> {
    let token = client
        .register(&device.id(), &device.pin(), device.session_token.as_deref())
        .await
        .with_context(|| format!("Failed to register with {}", client.base_url()))?;
    device.device_token = Some(token.as_str().to_string());
    Ok(())
}

/// Run the register command.
pub async fn run(data_dir: &Path, client: &RelayClient) -> Result<()> {
    let mut device = DeviceConfig::load(data_dir).await?;

    register_device(client, &mut device).await?;
    device.save(data_dir).await?;

    println!("Registered with {}", client.base_url());
    println!("  Device ID: {}", device.device_id);

    Ok(())
}
