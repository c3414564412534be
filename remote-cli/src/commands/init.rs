//! Initialize device identity.

use anyhow::Result;
use std::path::Path;

use crate::config::DeviceConfig;

/// Run the init command.
pub async fn run(data_dir: &Path, pin: &str) -> Result<()> {
    if pin.trim().is_empty() {
        anyhow::bail!("PIN must not be empty");
    }

    if DeviceConfig::exists(data_dir).await {
        anyhow::bail!(
            "Device already initialized. Delete {} to reinitialize.",
            data_dir.join("device.json").display()
        );
    }

    let config = DeviceConfig::new(pin);
    config.save(data_dir).await?;

    println!("Device initialized successfully!");
    println!();
    println!("  Device ID: {}", config.device_id);
    println!("  Data dir:  {}", data_dir.display());
    println!();
    println!("Next steps:");
    println!("  1. Register with the relay: la-remote register");
    println!("  2. Start polling:           la-remote poll");

    Ok(())
}
