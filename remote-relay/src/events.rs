//! Append-only usage-event log.
//!
//! Each accepted event becomes one JSON line. Appends are serialized so
//! concurrent requests never interleave partial lines.

use crate::config::EventsConfig;
use remote_types::{UsageEvent, UsageEventKind};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// One line of the events log.
#[derive(Debug, Serialize)]
struct EventRecord<'a> {
    user_id: &'a str,
    event: UsageEventKind,
    timestamp: &'a str,
    received_at: String,
}

/// Writer for the usage-event log.
#[derive(Debug)]
pub struct EventLog {
    /// `None` when the log is disabled.
    path: Option<PathBuf>,
    write_lock: Mutex<()>,
}

impl EventLog {
    /// Create a log from configuration.
    pub fn new(config: &EventsConfig) -> Self {
        Self {
            path: config.enabled.then(|| config.log_path.clone()),
            write_lock: Mutex::new(()),
        }
    }

    /// Path being written to, if enabled.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append an event.
    ///
    /// Returns `false` without touching the filesystem when the log is
    /// disabled.
    pub async fn append(&self, event: &UsageEvent) -> std::io::Result<bool> {
        let Some(path) = &self.path else {
            return Ok(false);
        };

        let record = EventRecord {
            user_id: &event.user_id,
            event: event.event,
            timestamp: &event.timestamp,
            received_at: chrono::Utc::now()
                .format("%Y-%m-%dT%H:%M:%SZ")
                .to_string(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn event(kind: UsageEventKind) -> UsageEvent {
        UsageEvent {
            user_id: "user-1".into(),
            event: kind,
            timestamp: "2024-05-01T12:00:00Z".into(),
        }
    }

    #[tokio::test]
    async fn appends_json_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.log");
        let log = EventLog::new(&EventsConfig {
            enabled: true,
            log_path: path.clone(),
        });

        assert!(log.append(&event(UsageEventKind::Armed)).await.unwrap());
        assert!(log.append(&event(UsageEventKind::AlarmFired)).await.unwrap());

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["user_id"], "user-1");
        assert_eq!(first["event"], "armed");
        assert_eq!(first["timestamp"], "2024-05-01T12:00:00Z");
        let received_at = first["received_at"].as_str().unwrap();
        assert_eq!(received_at.len(), "2024-05-01T12:00:00Z".len());
        assert!(received_at.ends_with('Z'));

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["event"], "alarm_fired");
    }

    #[tokio::test]
    async fn disabled_log_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("events.log");
        let log = EventLog::new(&EventsConfig {
            enabled: false,
            log_path: path.clone(),
        });

        assert!(!log.append(&event(UsageEventKind::Disarmed)).await.unwrap());
        assert!(log.path().is_none());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn unwritable_path_is_an_error() {
        let dir = tempdir().unwrap();
        let log = EventLog::new(&EventsConfig {
            enabled: true,
            log_path: dir.path().join("missing-dir").join("events.log"),
        });

        assert!(log.append(&event(UsageEventKind::Armed)).await.is_err());
    }
}
