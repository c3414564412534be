//! Show local device state and relay reachability.

use anyhow::Result;
use std::path::Path;

use crate::client::RelayClient;
use crate::config::{unix_now, DeviceConfig};

/// Run the status command.
pub async fn run(data_dir: &Path, client: &RelayClient) -> Result<()> {
    println!("=== la-remote status ===");
    println!();

    let device = match DeviceConfig::load(data_dir).await {
        Ok(device) => device,
        Err(_) => {
            println!("Device: NOT INITIALIZED");
            println!();
            println!("Run 'la-remote init --pin <pin>' to initialize.");
            return Ok(());
        }
    };

    println!("Device:");
    println!("  ID:         {}", device.device_id);
    println!("  Init:       {}", format_timestamp(device.created_at));
    println!(
        "  Registered: {}",
        if device.device_token.is_some() { "yes" } else { "no" }
    );
    println!(
        "  Session:    {}",
        device.session_token.as_deref().unwrap_or("none")
    );
    println!();

    println!("Relay:");
    println!("  URL:    {}", client.base_url());
    match client.health().await {
        Ok(health) => println!("  Status: {} ({})", health.status, health.message),
        Err(e) => println!("  Status: UNREACHABLE ({e})"),
    }

    Ok(())
}

/// Format a Unix timestamp as a human-readable age.
fn format_timestamp(ts: u64) -> String {
    let diff = unix_now().saturating_sub(ts);

    if diff < 60 {
        "just now".to_string()
    } else if diff < 3600 {
        format!("{} minutes ago", diff / 60)
    } else if diff < 86400 {
        format!("{} hours ago", diff / 3600)
    } else {
        format!("{} days ago", diff / 86400)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_relay;
    use tempfile::tempdir;

    #[tokio::test]
    async fn status_without_init() {
        let dir = tempdir().unwrap();
        let client = RelayClient::new("http://127.0.0.1:9").unwrap();

        assert!(run(dir.path(), &client).await.is_ok());
    }

    #[tokio::test]
    async fn status_with_unreachable_relay() {
        let dir = tempdir().unwrap();
        DeviceConfig::new("1234").save(dir.path()).await.unwrap();
        let client = RelayClient::new("http://127.0.0.1:9").unwrap();

        assert!(run(dir.path(), &client).await.is_ok());
    }

    #[tokio::test]
    async fn status_with_live_relay() {
        let (url, _relay) = spawn_relay().await;
        let dir = tempdir().unwrap();
        DeviceConfig::new("1234").save(dir.path()).await.unwrap();
        let client = RelayClient::new(&url).unwrap();

        assert!(run(dir.path(), &client).await.is_ok());
    }

    #[test]
    fn format_timestamp_works() {
        let now = unix_now();

        assert_eq!(format_timestamp(now), "just now");
        assert!(format_timestamp(now - 120).contains("minutes"));
        assert!(format_timestamp(now - 7200).contains("hours"));
        assert!(format_timestamp(now - 172800).contains("days"));
    }
}
