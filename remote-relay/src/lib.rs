//! # remote-relay
//!
//! Cloud relay for LA Cloud Remote.
//!
//! This crate implements a relay server that:
//! - Registers Mac devices by their client-generated device ID
//! - Accepts ARM/DISARM commands from a phone, authenticated by PIN hash
//! - Hands each command to the Mac's next poll, exactly once
//! - Keeps all state in memory (a restart forces every Mac to re-register)
//!
//! ## Architecture
//!
//! ```text
//! Phone ──POST /command──┐            ┌──POST /poll──── Mac
//!                        │            │  POST /register
//!                    ┌───┴────────────┴───┐
//!                    │    remote-relay    │
//!                    │  ┌──────────────┐  │
//!                    │  │ DashMap (mem)│  │
//!                    │  └──────────────┘  │
//!                    └────────────────────┘
//! ```
//!
//! ## Protocol
//!
//! JSON over HTTP:
//! - `register` → `{device_token}` (rotates the token)
//! - `command` → `{status}` (one pending command, last write wins)
//! - `poll` → `{command}` (take-and-clear)
//! - `update-session`, `events` (QR rotation and usage analytics)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cleanup;
pub mod config;
pub mod error;
pub mod events;
pub mod http;
pub mod limits;
pub mod server;
pub mod storage;
