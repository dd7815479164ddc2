//! Web server module for receiving webhooks and inspecting the event log.
//!
//! Routes:
//! - `POST /webhook`: verify and log a delivery
//! - `GET /events`: list logged deliveries, newest first
//! - `DELETE /events`: clear the log
//! - `GET /health`: liveness check

pub mod handlers;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub use handlers::{
    clear_events, envelope_from_headers, health, list_events, receive_webhook, AppState,
    ClearResponse, HealthResponse, WebhookResponse,
};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/webhook", post(receive_webhook))
        .route("/events", get(list_events).delete(clear_events))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
