//! Main relay coordination.
//!
//! RemoteRelay owns the device store, rate limiters, metrics and event log,
//! and implements the protocol operations the HTTP layer exposes.

use crate::config::Config;
use crate::error::{RelayError, Result, StorageError};
use crate::events::EventLog;
use crate::limits::{RateLimitError, RateLimits};
use crate::storage::{DeviceStore, MemoryStore, RegisterDevice, Registration};
use remote_types::{
    Command, CommandRequest, DeviceId, DeviceToken, PollRequest, RegisterRequest,
    UpdateSessionRequest, UsageEvent,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Operational metrics for monitoring relay activity.
///
/// All counters are monotonically increasing (reset only on restart).
#[derive(Debug, Default)]
pub struct RelayMetrics {
    /// Successful registrations (new and repeat).
    pub registrations_total: AtomicU64,
    /// Commands accepted from phones.
    pub commands_total: AtomicU64,
    /// Successful polls.
    pub polls_total: AtomicU64,
    /// Polls that delivered a command.
    pub commands_delivered: AtomicU64,
    /// Commands overwritten before delivery.
    pub commands_overwritten: AtomicU64,
    /// Rejected credentials (unknown device, PIN, token or session).
    pub auth_failures: AtomicU64,
    /// Requests rejected by a rate limiter.
    pub rate_limit_hits: AtomicU64,
    /// Devices removed by idle eviction.
    pub evictions_total: AtomicU64,
    /// Usage events accepted.
    pub events_total: AtomicU64,
}

/// Main relay server.
pub struct RemoteRelay {
    config: Config,
    store: Arc<dyn DeviceStore>,
    rate_limits: RateLimits,
    metrics: RelayMetrics,
    events: EventLog,
    started_at: Instant,
}

impl std::fmt::Debug for RemoteRelay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteRelay")
            .field("config", &self.config)
            .field("rate_limits", &self.rate_limits)
            .field("metrics", &self.metrics)
            .field("devices", &self.store.len())
            .finish_non_exhaustive()
    }
}

impl RemoteRelay {
    /// Create a relay with an empty in-memory device table.
    pub fn new(config: Config) -> Self {
        Self::with_store(config, Arc::new(MemoryStore::new()))
    }

    /// Create a relay over an existing store.
    pub fn with_store(config: Config, store: Arc<dyn DeviceStore>) -> Self {
        let rate_limits = RateLimits::new(&config.limits);
        let events = EventLog::new(&config.events);
        Self {
            config,
            store,
            rate_limits,
            metrics: RelayMetrics::default(),
            events,
            started_at: Instant::now(),
        }
    }

    /// Get the relay configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get access to the device store.
    pub fn store(&self) -> &dyn DeviceStore {
        self.store.as_ref()
    }

    /// Get access to the rate limiters.
    pub fn rate_limits(&self) -> &RateLimits {
        &self.rate_limits
    }

    /// Get access to the operational metrics.
    pub fn metrics(&self) -> &RelayMetrics {
        &self.metrics
    }

    /// Number of registered devices.
    pub fn total_devices(&self) -> usize {
        self.store.len()
    }

    /// Seconds since the relay was created.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Register a device, or re-register it after the Mac detected state loss.
    ///
    /// Always mints a new token; every earlier token stops working.
    pub fn register(&self, req: RegisterRequest) -> Result<DeviceToken> {
        self.check_rate(self.rate_limits.check_global())?;
        self.validate_device_id(&req.device_id)?;
        if req.pin_hash.is_blank() {
            return Err(RelayError::bad_request("Invalid pin_hash"));
        }
        self.check_rate(self.rate_limits.check_register(req.device_id.as_str()))?;

        let device_token =
            DeviceToken::generate().map_err(|e| RelayError::Internal(e.to_string()))?;
        let outcome = self.store.register(RegisterDevice {
            device_id: req.device_id.clone(),
            pin_hash: req.pin_hash,
            device_token: device_token.clone(),
            session_token: req.session_token,
        });

        self.metrics
            .registrations_total
            .fetch_add(1, Ordering::Relaxed);
        match outcome {
            Registration::Created => {
                tracing::info!("Registered new device {}", req.device_id.short())
            }
            Registration::Updated => {
                tracing::info!("Re-registered device {}", req.device_id.short())
            }
        }

        Ok(device_token)
    }

    /// Queue a command from the phone, replacing any undelivered one.
    ///
    /// Unknown device and wrong PIN hash fail identically.
    pub fn command(&self, req: CommandRequest) -> Result<()> {
        self.check_rate(self.rate_limits.check_global())?;
        // Unknown IDs stay out of the keyed map; the global limiter bounds them.
        if self.store.contains(&req.device_id) {
            self.check_rate(self.rate_limits.check_command(req.device_id.as_str()))?;
        }

        let replaced = self
            .store
            .set_pending(
                &req.device_id,
                &req.pin_hash,
                req.session_token.as_deref(),
                req.command,
            )
            .map_err(|e| {
                self.auth_failed("command", &req.device_id, e);
                match e {
                    StorageError::SessionMismatch => RelayError::SessionExpired,
                    StorageError::UnknownDevice | StorageError::CredentialMismatch => {
                        RelayError::Forbidden
                    }
                }
            })?;

        self.metrics.commands_total.fetch_add(1, Ordering::Relaxed);
        if let Some(previous) = replaced {
            self.metrics
                .commands_overwritten
                .fetch_add(1, Ordering::Relaxed);
            tracing::debug!(
                "Command {} for {} replaced undelivered {}",
                req.command,
                req.device_id.short(),
                previous
            );
        }
        tracing::info!("Queued {} for device {}", req.command, req.device_id.short());

        Ok(())
    }

    /// Deliver and clear the pending command, if any.
    ///
    /// Unknown device and stale token fail identically with
    /// [`RelayError::NotRegistered`], which tells the Mac to re-register.
    pub fn poll(&self, req: PollRequest) -> Result<Option<Command>> {
        self.check_rate(self.rate_limits.check_global())?;

        let command = self
            .store
            .take_pending(&req.device_id, &req.device_token)
            .map_err(|e| {
                self.auth_failed("poll", &req.device_id, e);
                RelayError::NotRegistered
            })?;

        self.metrics.polls_total.fetch_add(1, Ordering::Relaxed);
        if let Some(cmd) = command {
            self.metrics
                .commands_delivered
                .fetch_add(1, Ordering::Relaxed);
            tracing::info!("Delivered {} to device {}", cmd, req.device_id.short());
        }

        Ok(command)
    }

    /// Replace the session token after the Mac rotated its QR code.
    pub fn update_session(&self, req: UpdateSessionRequest) -> Result<()> {
        self.check_rate(self.rate_limits.check_global())?;

        self.store
            .update_session(
                &req.device_id,
                &req.device_token,
                Some(req.session_token),
            )
            .map_err(|e| {
                self.auth_failed("update-session", &req.device_id, e);
                RelayError::NotRegistered
            })?;

        tracing::debug!("Updated session for device {}", req.device_id.short());
        Ok(())
    }

    /// Record a usage event from the Mac app.
    pub async fn record_event(&self, event: UsageEvent) -> Result<()> {
        self.check_rate(self.rate_limits.check_global())?;

        if self.events.append(&event).await? {
            tracing::debug!("Recorded usage event {}", event.event);
        }
        self.metrics.events_total.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Evict devices idle for longer than `devices.expiry_secs`.
    ///
    /// An evicted Mac sees [`RelayError::NotRegistered`] on its next poll
    /// and re-registers, the same path as after a restart.
    pub fn evict_idle(&self) -> usize {
        let max_idle = Duration::from_secs(self.config.devices.expiry_secs);
        let evicted = self.store.evict_idle(max_idle);
        self.rate_limits.shrink();

        if evicted > 0 {
            self.metrics
                .evictions_total
                .fetch_add(evicted as u64, Ordering::Relaxed);
        }
        evicted
    }

    fn validate_device_id(&self, device_id: &DeviceId) -> Result<()> {
        if device_id.is_blank() || device_id.char_len() < self.config.devices.min_device_id_len {
            return Err(RelayError::bad_request("Invalid device_id"));
        }
        Ok(())
    }

    fn check_rate(&self, check: std::result::Result<(), RateLimitError>) -> Result<()> {
        check.map_err(|e| {
            tracing::warn!("Request rate limited: {}", e);
            self.metrics.rate_limit_hits.fetch_add(1, Ordering::Relaxed);
            RelayError::RateLimited(e)
        })
    }

    fn auth_failed(&self, op: &str, device_id: &DeviceId, reason: StorageError) {
        self.metrics.auth_failures.fetch_add(1, Ordering::Relaxed);
        tracing::warn!("{} rejected for device {}: {}", op, device_id.short(), reason);
    }
}
