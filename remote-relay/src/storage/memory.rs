//! In-memory device storage backed by DashMap.

use super::{normalize_session, DeviceRecord, DeviceStore, RegisterDevice, Registration};
use crate::error::StorageError;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use remote_types::{Command, DeviceId, DeviceToken, PinHash};
use std::time::{Duration, Instant};

/// Process-wide device table.
///
/// Starts empty and is never persisted. Per-key shard locks make each
/// check-then-mutate atomic with respect to other requests for the same
/// device.
#[derive(Debug, Default)]
pub struct MemoryStore {
    devices: DashMap<DeviceId, DeviceRecord>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl DeviceStore for MemoryStore {
    fn register(&self, req: RegisterDevice) -> Registration {
        let now = Instant::now();
        let session_token = normalize_session(req.session_token);

        match self.devices.entry(req.device_id.clone()) {
            Entry::Occupied(mut entry) => {
                let record = entry.get_mut();
                record.pin_hash = req.pin_hash;
                record.device_token = req.device_token;
                record.session_token = session_token;
                record.pending_command = None;
                record.last_seen = now;
                Registration::Updated
            }
            Entry::Vacant(entry) => {
                entry.insert(DeviceRecord {
                    device_id: req.device_id,
                    pin_hash: req.pin_hash,
                    device_token: req.device_token,
                    session_token,
                    pending_command: None,
                    last_seen: now,
                });
                Registration::Created
            }
        }
    }

    fn set_pending(
        &self,
        device_id: &DeviceId,
        pin_hash: &PinHash,
        session_token: Option<&str>,
        command: Command,
    ) -> Result<Option<Command>, StorageError> {
        let mut record = self
            .devices
            .get_mut(device_id)
            .ok_or(StorageError::UnknownDevice)?;

        if !record.pin_hash.matches(pin_hash) {
            return Err(StorageError::CredentialMismatch);
        }

        if let Some(expected) = record.session_token.as_deref() {
            if session_token != Some(expected) {
                return Err(StorageError::SessionMismatch);
            }
        }

        Ok(record.pending_command.replace(command))
    }

    fn take_pending(
        &self,
        device_id: &DeviceId,
        device_token: &DeviceToken,
    ) -> Result<Option<Command>, StorageError> {
        let mut record = self
            .devices
            .get_mut(device_id)
            .ok_or(StorageError::UnknownDevice)?;

        if !record.device_token.matches(device_token) {
            return Err(StorageError::CredentialMismatch);
        }

        record.last_seen = Instant::now();
        Ok(record.pending_command.take())
    }

    fn update_session(
        &self,
        device_id: &DeviceId,
        device_token: &DeviceToken,
        session_token: Option<String>,
    ) -> Result<(), StorageError> {
        let mut record = self
            .devices
            .get_mut(device_id)
            .ok_or(StorageError::UnknownDevice)?;

        if !record.device_token.matches(device_token) {
            return Err(StorageError::CredentialMismatch);
        }

        record.session_token = normalize_session(session_token);
        record.last_seen = Instant::now();
        Ok(())
    }

    fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let before = self.devices.len();
        self.devices
            .retain(|_, record| now.saturating_duration_since(record.last_seen) <= max_idle);
        before.saturating_sub(self.devices.len())
    }

    fn contains(&self, device_id: &DeviceId) -> bool {
        self.devices.contains_key(device_id)
    }

    fn get(&self, device_id: &DeviceId) -> Option<DeviceRecord> {
        self.devices.get(device_id).map(|r| r.value().clone())
    }

    fn len(&self) -> usize {
        self.devices.len()
    }
}
