//! HTTP endpoints for the relay.
//!
//! Provides the protocol endpoints, health checks and metrics.

mod api;
pub mod health;
mod metrics;

use crate::server::RemoteRelay;
use axum::{
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

pub use health::HealthStatus;

/// Build the HTTP router with all endpoints.
///
/// CORS is open to any origin because the phone page is hosted elsewhere.
pub fn build_router(relay: Arc<RemoteRelay>) -> Router {
    let mut router = Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        .route("/register", post(api::register_handler))
        .route("/command", post(api::command_handler))
        .route("/poll", post(api::poll_handler))
        .route("/update-session", post(api::update_session_handler))
        .route("/events", post(api::events_handler));

    if relay.config().server.metrics_enabled {
        router = router.route("/metrics", get(metrics::metrics_handler));
    }

    router
        .layer(Extension(relay))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, EventsConfig};
    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn test_config() -> Config {
        Config {
            events: EventsConfig {
                enabled: false,
                ..EventsConfig::default()
            },
            ..Config::default()
        }
    }

    fn test_app() -> Router {
        build_router(Arc::new(RemoteRelay::new(test_config())))
    }

    async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
        app.clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn get_uri(app: &Router, uri: &str) -> Response {
        app.clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn register(app: &Router, device_id: &str, pin_hash: &str) -> String {
        let response = post_json(
            app,
            "/register",
            json!({"device_id": device_id, "pin_hash": pin_hash}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["device_token"]
            .as_str()
            .unwrap()
            .to_string()
    }

    #[tokio::test]
    async fn root_returns_static_status() {
        let app = test_app();
        let response = get_uri(&app, "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"status": "ok", "message": "LA server running"})
        );
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = test_app();
        let response = get_uri(&app, "/health").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["devices"], 0);
    }

    #[tokio::test]
    async fn metrics_endpoint_returns_ok() {
        let app = test_app();
        let response = get_uri(&app, "/metrics").await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_endpoint_can_be_disabled() {
        let mut config = test_config();
        config.server.metrics_enabled = false;
        let app = build_router(Arc::new(RemoteRelay::new(config)));

        let response = get_uri(&app, "/metrics").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn end_to_end_over_http() {
        let app = test_app();
        let token = register(&app, "d1", "h1").await;

        let response = post_json(
            &app,
            "/command",
            json!({"device_id": "d1", "pin_hash": "h1", "command": "ARM"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"status": "ok"}));

        let poll = json!({"device_id": "d1", "device_token": token});
        let response = post_json(&app, "/poll", poll.clone()).await;
        assert_eq!(body_json(response).await, json!({"command": "ARM"}));

        let response = post_json(&app, "/poll", poll).await;
        assert_eq!(body_json(response).await, json!({"command": null}));
    }

    #[tokio::test]
    async fn missing_fields_are_bad_request() {
        let app = test_app();

        let response = post_json(&app, "/register", json!({"device_id": "device-d1"})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["detail"].is_string());

        let response = post_json(&app, "/poll", json!({})).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn empty_device_id_is_bad_request() {
        let app = test_app();
        let response = post_json(
            &app,
            "/register",
            json!({"device_id": "", "pin_hash": "h1"}),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"detail": "Invalid device_id"})
        );
    }

    #[tokio::test]
    async fn unknown_command_is_bad_request() {
        let app = test_app();
        register(&app, "device-d1", "h1").await;

        let response = post_json(
            &app,
            "/command",
            json!({"device_id": "device-d1", "pin_hash": "h1", "command": "SELF_DESTRUCT"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn command_failures_are_identical() {
        let app = test_app();
        register(&app, "device-d1", "h1").await;

        let unknown = post_json(
            &app,
            "/command",
            json!({"device_id": "device-zz", "pin_hash": "h1", "command": "ARM"}),
        )
        .await;
        let wrong_pin = post_json(
            &app,
            "/command",
            json!({"device_id": "device-d1", "pin_hash": "nope", "command": "ARM"}),
        )
        .await;

        assert_eq!(unknown.status(), StatusCode::FORBIDDEN);
        assert_eq!(wrong_pin.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(unknown).await, body_json(wrong_pin).await);
    }

    #[tokio::test]
    async fn stale_token_poll_is_not_found() {
        let app = test_app();
        let stale = register(&app, "device-d1", "h1").await;
        let fresh = register(&app, "device-d1", "h1").await;
        assert_ne!(stale, fresh);

        let response = post_json(
            &app,
            "/poll",
            json!({"device_id": "device-d1", "device_token": stale}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = post_json(
            &app,
            "/poll",
            json!({"device_id": "device-d1", "device_token": fresh}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn stale_session_is_gone() {
        let app = test_app();
        let response = post_json(
            &app,
            "/register",
            json!({"device_id": "device-d1", "pin_hash": "h1", "session_token": "qr-1"}),
        )
        .await;
        let token = body_json(response).await["device_token"].clone();

        let response = post_json(
            &app,
            "/update-session",
            json!({"device_id": "device-d1", "device_token": token, "session_token": "qr-2"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = post_json(
            &app,
            "/command",
            json!({"device_id": "device-d1", "pin_hash": "h1", "command": "ARM", "session_token": "qr-1"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::GONE);
    }

    #[tokio::test]
    async fn events_validate_kind() {
        let app = test_app();

        let response = post_json(
            &app,
            "/events",
            json!({"user_id": "u1", "event": "armed", "timestamp": "2024-01-01T00:00:00Z"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"ok": true}));

        let response = post_json(
            &app,
            "/events",
            json!({"user_id": "u1", "event": "exploded", "timestamp": "2024-01-01T00:00:00Z"}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn cors_preflight_allows_any_origin() {
        let app = test_app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("OPTIONS")
                    .uri("/command")
                    .header("origin", "https://phone.example")
                    .header("access-control-request-method", "POST")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }
}
