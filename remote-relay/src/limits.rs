//! Rate limiting for the relay.
//!
//! Provides protection against PIN-hash guessing and registration spam.
//!
//! ## Design Notes
//!
//! Clients are identified by the `device_id` they present, not by IP, since
//! the relay usually sits behind a hosting proxy. We rate limit:
//! - **command** submissions per device (each one is a PIN-hash guess)
//! - **register** calls per device
//! - all protocol requests globally
//!
//! `poll` only counts against the global limiter: the Mac polls every second
//! and must never be throttled into believing the relay lost its state.
//!
//! Keyed limiters come from the governor crate, backed by DashMap.

use crate::config::LimitsConfig;
use governor::clock::DefaultClock;
use governor::middleware::NoOpMiddleware;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Type alias for a keyed rate limiter using DashMap.
type KeyedLimiter<K> = RateLimiter<
    K,
    dashmap::DashMap<K, InMemoryState>,
    DefaultClock,
    NoOpMiddleware<governor::clock::QuantaInstant>,
>;

/// Type alias for a direct (non-keyed) rate limiter.
type DirectLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiters for the relay server.
#[derive(Clone)]
pub struct RateLimits {
    /// Limits command submissions per device ID.
    command_limiter: Arc<KeyedLimiter<String>>,

    /// Limits registrations per device ID.
    register_limiter: Arc<KeyedLimiter<String>>,

    /// Global rate limiter across all clients.
    global_limiter: Arc<DirectLimiter>,
}

impl std::fmt::Debug for RateLimits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimits")
            .field("command_limiter", &"KeyedLimiter<String>")
            .field("register_limiter", &"KeyedLimiter<String>")
            .field("global_limiter", &"DirectLimiter")
            .finish()
    }
}

impl RateLimits {
    /// Create rate limiters from configuration.
    ///
    /// Zero quotas are rejected by [`crate::config::Config::validate`]; if
    /// one slips through it is treated as one request per period.
    pub fn new(config: &LimitsConfig) -> Self {
        let command_quota = Quota::per_minute(non_zero(config.commands_per_minute));
        let register_quota = Quota::per_minute(non_zero(config.registrations_per_minute));
        let global_quota = Quota::per_second(non_zero(config.global_requests_per_second));

        Self {
            command_limiter: Arc::new(RateLimiter::keyed(command_quota)),
            register_limiter: Arc::new(RateLimiter::keyed(register_quota)),
            global_limiter: Arc::new(RateLimiter::direct(global_quota)),
        }
    }

    /// Check if a command submission for `device_id` is allowed.
    pub fn check_command(&self, device_id: &str) -> Result<(), RateLimitError> {
        self.command_limiter
            .check_key(&device_id.to_string())
            .map_err(|_| RateLimitError::CommandLimitExceeded)
    }

    /// Check if a registration for `device_id` is allowed.
    pub fn check_register(&self, device_id: &str) -> Result<(), RateLimitError> {
        self.register_limiter
            .check_key(&device_id.to_string())
            .map_err(|_| RateLimitError::RegisterLimitExceeded)
    }

    /// Check if the global request rate is within limits.
    ///
    /// This is a server-wide rate limit that caps aggregate throughput
    /// regardless of individual client limits.
    pub fn check_global(&self) -> Result<(), RateLimitError> {
        self.global_limiter
            .check()
            .map_err(|_| RateLimitError::GlobalLimitExceeded)
    }

    /// Number of tracked command keys (for metrics).
    pub fn command_keys_count(&self) -> usize {
        self.command_limiter.len()
    }

    /// Number of tracked registration keys (for metrics).
    pub fn register_keys_count(&self) -> usize {
        self.register_limiter.len()
    }

    /// Evict idle entries from the keyed limiters.
    ///
    /// `retain_recent()` drops keys whose cells have fully recharged. Called
    /// from the cleanup task alongside device eviction.
    pub fn shrink(&self) {
        self.command_limiter.retain_recent();
        self.register_limiter.retain_recent();
    }
}

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

/// Rate limit error types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RateLimitError {
    /// Too many command submissions for this device.
    #[error("command rate limit exceeded")]
    CommandLimitExceeded,
    /// Too many registrations for this device.
    #[error("registration rate limit exceeded")]
    RegisterLimitExceeded,
    /// Global request rate exceeded across all clients.
    #[error("global rate limit exceeded")]
    GlobalLimitExceeded,
}
