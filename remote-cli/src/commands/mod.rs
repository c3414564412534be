//! CLI command implementations.

pub mod init;
pub mod poll;
pub mod register;
pub mod send;
pub mod session;
pub mod status;
