//! Local device state for la-remote.

use anyhow::{Context, Result};
use remote_types::{DeviceId, DeviceToken, PinHash};
use serde::{Deserialize, Serialize};
use std::path::Path;

const DEVICE_FILE: &str = "device.json";

/// Device state stored locally by the Mac role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    /// Persistent device identifier (UUID v4).
    pub device_id: String,
    /// SHA-256 hex digest of the PIN.
    pub pin_hash: String,
    /// Token from the latest registration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_token: Option<String>,
    /// Session token currently shown in the QR code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    /// When the device was initialized.
    pub created_at: u64,
}

impl DeviceConfig {
    /// Create a new device with a random identifier.
    pub fn new(pin: &str) -> Self {
        Self {
            device_id: uuid::Uuid::new_v4().to_string(),
            pin_hash: PinHash::from_pin(pin).as_str().to_string(),
            device_token: None,
            session_token: None,
            created_at: unix_now(),
        }
    }

    /// Typed device identifier.
    pub fn id(&self) -> DeviceId {
        DeviceId::new(self.device_id.clone())
    }

    /// Typed PIN hash.
    pub fn pin(&self) -> PinHash {
        PinHash::new(self.pin_hash.clone())
    }

    /// Typed device token, if registered.
    pub fn token(&self) -> Option<DeviceToken> {
        self.device_token.clone().map(DeviceToken::new)
    }

    /// Load device state from a directory.
    pub async fn load(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(DEVICE_FILE);
        let contents = tokio::fs::read_to_string(&path)
            .await
            .context("Device not initialized. Run 'la-remote init --pin <pin>' first.")?;
        serde_json::from_str(&contents).context("Invalid device configuration")
    }

    /// Save device state to a directory.
    pub async fn save(&self, data_dir: &Path) -> Result<()> {
        let path = data_dir.join(DEVICE_FILE);
        let contents = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, contents)
            .await
            .context("Failed to save device configuration")?;
        set_file_permissions_0600(&path).await?;
        Ok(())
    }

    /// Check if the device is initialized.
    pub async fn exists(data_dir: &Path) -> bool {
        data_dir.join(DEVICE_FILE).exists()
    }
}

/// Seconds since the Unix epoch, zero if the clock is before it.
pub fn unix_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

/// Set file permissions to 0600 (owner read/write only) on Unix.
/// No-op on non-Unix platforms.
async fn set_file_permissions_0600(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .await
            .context("Failed to set file permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}

/// Set directory permissions to 0700 (owner only) on Unix.
/// No-op on non-Unix platforms.
pub async fn set_dir_permissions_0700(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))
            .await
            .context("Failed to set directory permissions")?;
    }
    #[cfg(not(unix))]
    {
        let _ = path;
    }
    Ok(())
}
