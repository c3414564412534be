//! Protocol endpoints: register, command, poll, update-session, events.
//!
//! Handlers only translate between JSON and [`RemoteRelay`] calls. Any body
//! that fails to deserialize is a 400, matching the relay's error taxonomy
//! rather than axum's default 422.

use crate::error::RelayError;
use crate::server::RemoteRelay;
use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use remote_types::{
    CommandRequest, PollRequest, PollResponse, RegisterRequest, RegisterResponse, StatusResponse,
    UpdateSessionRequest, UsageEvent, UsageEventResponse,
};
use std::sync::Arc;

type Payload<T> = Result<Json<T>, JsonRejection>;

fn parse<T>(payload: Payload<T>) -> Result<T, RelayError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| RelayError::bad_request(e.body_text()))
}

/// `POST /register`
pub async fn register_handler(
    Extension(relay): Extension<Arc<RemoteRelay>>,
    payload: Payload<RegisterRequest>,
) -> Result<Json<RegisterResponse>, RelayError> {
    let device_token = relay.register(parse(payload)?)?;
    Ok(Json(RegisterResponse { device_token }))
}

/// `POST /command`
pub async fn command_handler(
    Extension(relay): Extension<Arc<RemoteRelay>>,
    payload: Payload<CommandRequest>,
) -> Result<Json<StatusResponse>, RelayError> {
    relay.command(parse(payload)?)?;
    Ok(Json(StatusResponse::ok()))
}

/// `POST /poll`
pub async fn poll_handler(
    Extension(relay): Extension<Arc<RemoteRelay>>,
    payload: Payload<PollRequest>,
) -> Result<Json<PollResponse>, RelayError> {
    let command = relay.poll(parse(payload)?)?;
    Ok(Json(PollResponse { command }))
}

/// `POST /update-session`
pub async fn update_session_handler(
    Extension(relay): Extension<Arc<RemoteRelay>>,
    payload: Payload<UpdateSessionRequest>,
) -> Result<Json<StatusResponse>, RelayError> {
    relay.update_session(parse(payload)?)?;
    Ok(Json(StatusResponse::ok()))
}

/// `POST /events`
pub async fn events_handler(
    Extension(relay): Extension<Arc<RemoteRelay>>,
    payload: Payload<UsageEvent>,
) -> Result<Json<UsageEventResponse>, RelayError> {
    relay.record_event(parse(payload)?).await?;
    Ok(Json(UsageEventResponse { ok: true }))
}
