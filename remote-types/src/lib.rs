//! # remote-types
//!
//! Wire format types for the LA Cloud Remote relay protocol.
//!
//! This crate provides the types shared by the relay and its clients:
//! - [`DeviceId`], [`DeviceToken`], [`PinHash`] - Identity and credentials
//! - [`Command`], [`UsageEventKind`] - Fixed vocabularies
//! - Request/response bodies for every endpoint (see [`messages`])
//! - [`TypesError`] - Error types

#![warn(missing_docs)]
#![warn(clippy::all)]

mod command;
mod error;
mod ids;
pub mod messages;

pub use command::{Command, UsageEventKind};
pub use error::TypesError;
pub use ids::{DeviceId, DeviceToken, PinHash, TOKEN_BYTES};
pub use messages::{
    CommandRequest, ErrorBody, HealthResponse, PollRequest, PollResponse, RegisterRequest,
    RegisterResponse, StatusResponse, UpdateSessionRequest, UsageEvent, UsageEventResponse,
};
