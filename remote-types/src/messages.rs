//! Request and response bodies for the relay's JSON endpoints.
//!
//! Each operation has a request body posted by a client and a response body
//! returned by the relay. Error responses use [`ErrorBody`].

use serde::{Deserialize, Serialize};

use crate::{Command, DeviceId, DeviceToken, PinHash, UsageEventKind};

/// `POST /register`, sent by the Mac on first setup and after state loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Persistent device identifier
    pub device_id: DeviceId,
    /// SHA-256 hex digest of the user's PIN
    pub pin_hash: PinHash,
    /// Session token embedded in the current QR code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

/// Response to a registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Freshly minted polling credential
    pub device_token: DeviceToken,
}

/// `POST /command`, sent by the phone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    /// Target device, scanned from the QR code
    pub device_id: DeviceId,
    /// SHA-256 hex digest of the PIN typed on the phone
    pub pin_hash: PinHash,
    /// Command to queue
    pub command: Command,
    /// Session token from the scanned QR code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

/// Generic `{"status": "ok"}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Always "ok" on success
    pub status: String,
}

impl StatusResponse {
    /// The success acknowledgement.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
        }
    }
}

/// `POST /poll`, sent by the Mac on a fixed cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollRequest {
    /// Persistent device identifier
    pub device_id: DeviceId,
    /// Token from the latest registration
    pub device_token: DeviceToken,
}

/// Response to a poll. `command` is `null` when nothing is pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResponse {
    /// The delivered command, if any
    pub command: Option<Command>,
}

/// `POST /update-session`, sent by the Mac when it rotates its QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSessionRequest {
    /// Persistent device identifier
    pub device_id: DeviceId,
    /// Token from the latest registration
    pub device_token: DeviceToken,
    /// New session token
    pub session_token: String,
}

/// `POST /events`, usage analytics from the Mac app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEvent {
    /// Opaque user identifier chosen by the app
    pub user_id: String,
    /// What happened
    pub event: UsageEventKind,
    /// Client-side timestamp, stored verbatim
    pub timestamp: String,
}

/// Response to a usage event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageEventResponse {
    /// Always true on success
    pub ok: bool,
}

/// `GET /`, static liveness payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok"
    pub status: String,
    /// Human-readable banner
    pub message: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable reason
    pub detail: String,
}
