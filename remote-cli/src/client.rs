//! HTTP client for the relay's JSON endpoints.

use remote_types::{
    Command, CommandRequest, DeviceId, DeviceToken, ErrorBody, HealthResponse, PinHash,
    PollRequest, PollResponse, RegisterRequest, RegisterResponse, StatusResponse,
    UpdateSessionRequest,
};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;

/// Errors returned by [`RelayClient`].
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport failure or malformed response.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The relay does not know this device or token. Re-register.
    #[error("device not registered with the relay")]
    NotRegistered,

    /// Unknown device or wrong PIN.
    #[error("invalid device or PIN")]
    Forbidden,

    /// The session token no longer matches the device's QR code.
    #[error("session expired, scan the new QR code")]
    SessionExpired,

    /// Too many requests for this device.
    #[error("rate limited by relay")]
    RateLimited,

    /// Any other non-success response.
    #[error("relay returned {status}: {detail}")]
    Status {
        /// HTTP status code
        status: u16,
        /// `detail` from the error body
        detail: String,
    },
}

impl ClientError {
    /// Replace a 403/404 response with an operation-specific error.
    fn on_auth_failure(self, replacement: ClientError) -> ClientError {
        match self {
            ClientError::Status {
                status: 403 | 404, ..
            } => replacement,
            other => other,
        }
    }
}

/// Thin wrapper around a [`reqwest::Client`] bound to one relay.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    /// Create a client for the relay at `base_url`.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Relay base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /`
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let response = self.http.get(format!("{}/", self.base_url)).send().await?;
        Self::decode(response).await
    }

    /// Register (or re-register) a device and return its new token.
    pub async fn register(
        &self,
        device_id: &DeviceId,
        pin_hash: &PinHash,
        session_token: Option<&str>,
    ) -> Result<DeviceToken, ClientError> {
        let request = RegisterRequest {
            device_id: device_id.clone(),
            pin_hash: pin_hash.clone(),
            session_token: session_token.map(str::to_string),
        };
        let response: RegisterResponse = self.post("/register", &request).await?;
        Ok(response.device_token)
    }

    /// Queue a command for a device.
    pub async fn send_command(
        &self,
        device_id: &DeviceId,
        pin_hash: &PinHash,
        command: Command,
        session_token: Option<&str>,
    ) -> Result<(), ClientError> {
        let request = CommandRequest {
            device_id: device_id.clone(),
            pin_hash: pin_hash.clone(),
            command,
            session_token: session_token.map(str::to_string),
        };
        self.post::<_, StatusResponse>("/command", &request)
            .await
            .map_err(|e| e.on_auth_failure(ClientError::Forbidden))?;
        Ok(())
    }

    /// Take the pending command, if any.
    pub async fn poll(
        &self,
        device_id: &DeviceId,
        device_token: &DeviceToken,
    ) -> Result<Option<Command>, ClientError> {
        let request = PollRequest {
            device_id: device_id.clone(),
            device_token: device_token.clone(),
        };
        let response: PollResponse = self
            .post("/poll", &request)
            .await
            .map_err(|e| e.on_auth_failure(ClientError::NotRegistered))?;
        Ok(response.command)
    }

    /// Replace the device's session token.
    pub async fn update_session(
        &self,
        device_id: &DeviceId,
        device_token: &DeviceToken,
        session_token: &str,
    ) -> Result<(), ClientError> {
        let request = UpdateSessionRequest {
            device_id: device_id.clone(),
            device_token: device_token.clone(),
            session_token: session_token.to_string(),
        };
        self.post::<_, StatusResponse>("/update-session", &request)
            .await
            .map_err(|e| e.on_auth_failure(ClientError::NotRegistered))?;
        Ok(())
    }

    async fn post<Req, Resp>(&self, path: &str, body: &Req) -> Result<Resp, ClientError>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let response = self
            .http
            .post(format!("{}{}", self.base_url, path))
            .json(body)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<Resp: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<Resp, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let detail = match response.json::<ErrorBody>().await {
            Ok(body) => body.detail,
            Err(_) => status.to_string(),
        };

        Err(match status.as_u16() {
            410 => ClientError::SessionExpired,
            429 => ClientError::RateLimited,
            code => ClientError::Status {
                status: code,
                detail,
            },
        })
    }
}
