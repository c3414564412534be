//! Prometheus metrics endpoint.

use crate::server::RemoteRelay;
use axum::{http::header::CONTENT_TYPE, response::IntoResponse, Extension};
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Prometheus metrics handler.
///
/// Returns metrics in Prometheus text format.
/// Includes both gauges (current state) and counters (monotonic since startup).
pub async fn metrics_handler(Extension(relay): Extension<Arc<RemoteRelay>>) -> impl IntoResponse {
    (
        [(CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        render(&relay),
    )
}

fn render(relay: &RemoteRelay) -> String {
    let m = relay.metrics();

    // Gauges: current state
    let devices = relay.total_devices();
    let limiter_keys =
        relay.rate_limits().command_keys_count() + relay.rate_limits().register_keys_count();

    // Counters: monotonic since startup
    let registrations = m.registrations_total.load(Ordering::Relaxed);
    let commands = m.commands_total.load(Ordering::Relaxed);
    let polls = m.polls_total.load(Ordering::Relaxed);
    let delivered = m.commands_delivered.load(Ordering::Relaxed);
    let overwritten = m.commands_overwritten.load(Ordering::Relaxed);
    let auth_failures = m.auth_failures.load(Ordering::Relaxed);
    let rate_limits = m.rate_limit_hits.load(Ordering::Relaxed);
    let evictions = m.evictions_total.load(Ordering::Relaxed);
    let events = m.events_total.load(Ordering::Relaxed);

    format!(
        r#"# HELP la_relay_devices_registered Number of registered devices
# TYPE la_relay_devices_registered gauge
la_relay_devices_registered {devices}

# HELP la_relay_rate_limiter_keys Number of device keys tracked by rate limiters
# TYPE la_relay_rate_limiter_keys gauge
la_relay_rate_limiter_keys {limiter_keys}

# HELP la_relay_info Server information
# TYPE la_relay_info gauge
la_relay_info{{version="{version}"}} 1

# HELP la_relay_registrations_total Total successful registrations
# TYPE la_relay_registrations_total counter
la_relay_registrations_total {registrations}

# HELP la_relay_commands_total Total commands accepted
# TYPE la_relay_commands_total counter
la_relay_commands_total {commands}

# HELP la_relay_polls_total Total successful polls
# TYPE la_relay_polls_total counter
la_relay_polls_total {polls}

# HELP la_relay_commands_delivered_total Total commands delivered to a Mac
# TYPE la_relay_commands_delivered_total counter
la_relay_commands_delivered_total {delivered}

# HELP la_relay_commands_overwritten_total Total commands replaced before delivery
# TYPE la_relay_commands_overwritten_total counter
la_relay_commands_overwritten_total {overwritten}

# HELP la_relay_auth_failures_total Total rejected credentials
# TYPE la_relay_auth_failures_total counter
la_relay_auth_failures_total {auth_failures}

# HELP la_relay_rate_limit_hits_total Total rate limit rejections
# TYPE la_relay_rate_limit_hits_total counter
la_relay_rate_limit_hits_total {rate_limits}

# HELP la_relay_evictions_total Total devices evicted for inactivity
# TYPE la_relay_evictions_total counter
la_relay_evictions_total {evictions}

# HELP la_relay_events_total Total usage events accepted
# TYPE la_relay_events_total counter
la_relay_events_total {events}
"#,
        version = env!("CARGO_PKG_VERSION"),
    )
}
