//! Rotate the QR session token.

use anyhow::Result;
use std::path::Path;

use super::register::register_device;
use crate::client::{ClientError, RelayClient};
use crate::config::DeviceConfig;

/// Generate a fresh session token.
pub fn new_session_token() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Push `session_token` to the relay, re-registering if the relay has
/// forgotten the device.
pub async fn rotate(
    data_dir: &Path,
    client: &RelayClient,
    device: &mut DeviceConfig,
    session_token: String,
) -> Result<()> {
    device.session_token = Some(session_token.clone());

    let updated = match device.token() {
        Some(token) => {
            match client
                .update_session(&device.id(), &token, &session_token)
                .await
            {
                Ok(()) => true,
                Err(ClientError::NotRegistered) => false,
                Err(e) => return Err(e.into()),
            }
        }
        None => false,
    };

    if !updated {
        // Registration carries the new session token
        register_device(client, device).await?;
    }

    device.save(data_dir).await
}

/// Run the rotate-session command.
pub async fn run(data_dir: &Path, client: &RelayClient) -> Result<()> {
    let mut device = DeviceConfig::load(data_dir).await?;
    let session_token = new_session_token();

    rotate(data_dir, client, &mut device, session_token.clone()).await?;

    println!("Session rotated.");
    println!("  Device ID:     {}", device.device_id);
    println!("  Session token: {session_token}");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_relay;
    use remote_types::{Command, PinHash};
    use tempfile::tempdir;

    #[test]
    fn session_tokens_are_unique() {
        assert_ne!(new_session_token(), new_session_token());
    }

    #[tokio::test]
    async fn rotation_expires_previous_session() {
        let (url, _relay) = spawn_relay().await;
        let client = RelayClient::new(&url).unwrap();
        let dir = tempdir().unwrap();
        let mut device = DeviceConfig::new("1234");

        rotate(dir.path(), &client, &mut device, "qr-1".to_string())
            .await
            .unwrap();
        rotate(dir.path(), &client, &mut device, "qr-2".to_string())
            .await
            .unwrap();

        let pin = PinHash::from_pin("1234");
        let stale = client
            .send_command(&device.id(), &pin, Command::Arm, Some("qr-1"))
            .await;
        assert!(matches!(stale, Err(ClientError::SessionExpired)));

        client
            .send_command(&device.id(), &pin, Command::Arm, Some("qr-2"))
            .await
            .unwrap();

        let saved = DeviceConfig::load(dir.path()).await.unwrap();
        assert_eq!(saved.session_token.as_deref(), Some("qr-2"));
    }

    #[tokio::test]
    async fn rotation_with_stale_token_reregisters() {
        let (url, _relay) = spawn_relay().await;
        let client = RelayClient::new(&url).unwrap();
        let dir = tempdir().unwrap();
        let mut device = DeviceConfig::new("1234");
        device.device_token = Some("not-a-real-token".to_string());

        rotate(dir.path(), &client, &mut device, "qr-1".to_string())
            .await
            .unwrap();

        assert_ne!(device.device_token.as_deref(), Some("not-a-real-token"));
        let token = device.token().unwrap();
        assert_eq!(client.poll(&device.id(), &token).await.unwrap(), None);
    }
}
