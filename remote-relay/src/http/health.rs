//! Health check endpoints.

use crate::server::RemoteRelay;
use axum::{Extension, Json};
use remote_types::HealthResponse;
use serde::Serialize;
use std::sync::Arc;

/// Detailed health status response.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    /// Overall status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Number of registered devices.
    pub devices: usize,
    /// Uptime in seconds.
    pub uptime_seconds: u64,
}

/// `GET /`, static liveness payload polled by hosting platforms.
pub async fn root_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "LA server running".to_string(),
    })
}

/// `GET /health`
pub async fn health_handler(Extension(relay): Extension<Arc<RemoteRelay>>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        devices: relay.total_devices(),
        uptime_seconds: relay.uptime_seconds(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_status_serializes() {
        let status = HealthStatus {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            devices: 42,
            uptime_seconds: 3600,
        };

        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"devices\":42"));
    }
}
