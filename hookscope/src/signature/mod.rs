//! Webhook signature verification.
//!
//! Implements the Standard Webhooks `v1` scheme:
//!
//! ```text
//! signature = base64(HMAC-SHA256(secret, "{id}.{timestamp}.{body}"))
//! webhook-signature: v1,<signature> [v1,<signature> ...]
//! ```

pub mod envelope;
pub mod secret;
pub mod verifier;

pub use envelope::{
    parse_signature_list, DeliveryEnvelope, SignatureComponent, HEADER_ID, HEADER_SIGNATURE,
    HEADER_TIMESTAMP, SIGNATURE_VERSION,
};
pub use secret::{SecretError, WebhookSecret, SECRET_PREFIX};
pub use verifier::{VerificationError, WebhookVerifier};
