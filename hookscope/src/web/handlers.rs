//! HTTP endpoint handlers.
//!
//! Every delivery to `/webhook` ends up in the event log, whether or not it
//! authenticates. Failures are answered with 401 and never escape as faults.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::signature::{
    DeliveryEnvelope, WebhookVerifier, HEADER_ID, HEADER_SIGNATURE, HEADER_TIMESTAMP,
};
use crate::store::{DeliveryRecord, EventStore};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub verifier: Arc<WebhookVerifier>,
    pub store: EventStore,
}

impl AppState {
    pub fn new(verifier: WebhookVerifier, store: EventStore) -> Self {
        Self {
            verifier: Arc::new(verifier),
            store,
        }
    }
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

// =============================================================================
// Webhook Receiver
// =============================================================================

/// Webhook response.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

/// Pull the signature envelope out of the request headers.
///
/// Missing or non-UTF-8 headers become empty fields, which the verifier
/// reports as a malformed envelope.
pub fn envelope_from_headers(headers: &HeaderMap) -> DeliveryEnvelope {
    let field = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };

    DeliveryEnvelope::new(
        field(HEADER_ID),
        field(HEADER_TIMESTAMP),
        field(HEADER_SIGNATURE),
    )
}

/// Webhook endpoint.
///
/// This endpoint:
/// 1. Verifies the `v1` signature over the raw body
/// 2. Logs the delivery, verified or not
/// 3. Returns 200 or 401
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let envelope = envelope_from_headers(&headers);

    info!(
        webhook_id = %envelope.id,
        webhook_timestamp = %envelope.timestamp,
        body_length = body.len(),
        has_signature = !envelope.signature.is_empty(),
        "webhook_received"
    );

    match state.verifier.verify(&envelope, &body) {
        Ok(payload) => {
            let stored = state
                .store
                .append(DeliveryRecord::verified(envelope, body.to_vec(), payload));

            let message = match stored.event_type() {
                Some(event_type) => {
                    format!("Webhook event '{}' processed successfully", event_type)
                }
                None => "Webhook received".to_string(),
            };

            info!(
                webhook_id = %stored.envelope().id,
                event_type = stored.event_type().unwrap_or("unknown"),
                "webhook_verified"
            );

            (
                StatusCode::OK,
                Json(WebhookResponse {
                    success: Some(true),
                    message: Some(message),
                    error: None,
                }),
            )
        }
        Err(e) => {
            warn!(webhook_id = %envelope.id, error = %e, "webhook_rejected");

            state
                .store
                .append(DeliveryRecord::rejected(envelope, body.to_vec(), &e));

            (
                StatusCode::UNAUTHORIZED,
                Json(WebhookResponse {
                    success: None,
                    message: None,
                    error: Some("Invalid webhook signature"),
                }),
            )
        }
    }
}

// =============================================================================
// Event Log
// =============================================================================

/// Clear response.
#[derive(Serialize)]
pub struct ClearResponse {
    pub success: bool,
}

/// List stored deliveries, newest first.
pub async fn list_events(State(state): State<AppState>) -> Json<Vec<DeliveryRecord>> {
    Json(state.store.snapshot())
}

/// Empty the event log.
pub async fn clear_events(State(state): State<AppState>) -> Json<ClearResponse> {
    state.store.clear();
    info!("event_log_cleared");
    Json(ClearResponse { success: true })
}
