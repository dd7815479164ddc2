//! Hookscope - Standard Webhooks receiver with an inspectable delivery log.
//!
//! This library provides shared modules for the three Hookscope binaries:
//! - `hookscope`: Web server that verifies and logs webhook deliveries
//! - `hookscope-keygen`: Generates `whsec_` secrets
//! - `hookscope-send`: Sends a signed webhook to a receiver
//!
//! ## Architecture
//!
//! ```text
//! POST /webhook → WebhookVerifier → DeliveryRecord → EventStore ← GET/DELETE /events
//! ```

pub mod client;
pub mod config;
pub mod signature;
pub mod store;
pub mod web;

// Re-export commonly used types
pub use client::{SendOutcome, Target, WebhookClient};
pub use config::{Config, ConfigError};
pub use signature::{
    DeliveryEnvelope, SecretError, VerificationError, WebhookSecret, WebhookVerifier,
};
pub use store::{DeliveryRecord, EventStore};
pub use web::{router, AppState};
