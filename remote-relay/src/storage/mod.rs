//! Storage layer for the relay.
//!
//! Device records live in process memory only. Losing them on restart is
//! what tells the Mac client to re-register, so there is no durable backend.

mod memory;

pub use memory::MemoryStore;

use crate::error::StorageError;
use remote_types::{Command, DeviceId, DeviceToken, PinHash};
use std::time::{Duration, Instant};

/// Server-side state for one registered device.
#[derive(Debug, Clone)]
pub struct DeviceRecord {
    /// Client-generated identifier (primary key).
    pub device_id: DeviceId,
    /// PIN digest that authorizes command submission.
    pub pin_hash: PinHash,
    /// Latest polling credential; older tokens are invalid.
    pub device_token: DeviceToken,
    /// Session token from the Mac's current QR code, if any.
    pub session_token: Option<String>,
    /// The single undelivered command, if any.
    pub pending_command: Option<Command>,
    /// Last register, poll or session update.
    pub last_seen: Instant,
}

/// Request to register (or re-register) a device.
#[derive(Debug, Clone)]
pub struct RegisterDevice {
    /// Client-generated identifier.
    pub device_id: DeviceId,
    /// PIN digest to store.
    pub pin_hash: PinHash,
    /// Freshly minted token replacing any previous one.
    pub device_token: DeviceToken,
    /// Session token to store; empty strings are treated as absent.
    pub session_token: Option<String>,
}

/// Outcome of a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First registration of this device ID.
    Created,
    /// Existing record updated with a new token.
    Updated,
}

/// Trait for device storage backends.
///
/// Every method that checks a credential and mutates the record does both
/// under one lock, so concurrent requests for the same device cannot
/// interleave between the check and the write.
pub trait DeviceStore: Send + Sync {
    /// Create or update a device record, replacing its token.
    ///
    /// Any undelivered command is dropped.
    fn register(&self, req: RegisterDevice) -> Registration;

    /// Overwrite the pending command after checking the PIN digest and
    /// session token.
    ///
    /// Returns the undelivered command that was replaced, if any.
    fn set_pending(
        &self,
        device_id: &DeviceId,
        pin_hash: &PinHash,
        session_token: Option<&str>,
        command: Command,
    ) -> Result<Option<Command>, StorageError>;

    /// Take and clear the pending command after checking the device token.
    fn take_pending(
        &self,
        device_id: &DeviceId,
        device_token: &DeviceToken,
    ) -> Result<Option<Command>, StorageError>;

    /// Replace the stored session token after checking the device token.
    fn update_session(
        &self,
        device_id: &DeviceId,
        device_token: &DeviceToken,
        session_token: Option<String>,
    ) -> Result<(), StorageError>;

    /// Remove devices not seen for longer than `max_idle`.
    ///
    /// Returns the number of devices evicted.
    fn evict_idle(&self, max_idle: Duration) -> usize;

    /// Returns true if `device_id` is registered.
    fn contains(&self, device_id: &DeviceId) -> bool;

    /// Snapshot of a device record.
    fn get(&self, device_id: &DeviceId) -> Option<DeviceRecord>;

    /// Number of registered devices.
    fn len(&self) -> usize;

    /// Returns true if no device is registered.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Treat an empty session token as "no session".
pub(crate) fn normalize_session(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}
