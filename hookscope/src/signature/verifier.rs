//! Standard Webhooks `v1` signature verification.
//!
//! The signed content is `id.timestamp.body` over the exact request bytes,
//! authenticated with HMAC-SHA256 and transmitted as base64. A delivery may
//! carry several signatures so that secrets can be rotated without downtime.

use base64::{engine::general_purpose::STANDARD, Engine};
use hmac::{Hmac, Mac};
use serde_json::Value;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;
use tracing::{debug, warn};

use super::envelope::{DeliveryEnvelope, SIGNATURE_VERSION};
use super::secret::WebhookSecret;

type HmacSha256 = Hmac<Sha256>;

/// Why a delivery failed authentication.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    #[error("malformed webhook envelope: {0}")]
    MalformedEnvelope(String),

    #[error("no matching v1 signature")]
    SignatureMismatch,
}

/// Verifies and produces webhook signatures for a single shared secret.
///
/// The HMAC is keyed once at construction and cloned per message. Holds no
/// mutable state, so one instance can be shared freely between request
/// handlers.
#[derive(Clone)]
pub struct WebhookVerifier {
    keyed: HmacSha256,
}

impl WebhookVerifier {
    pub fn new(secret: &WebhookSecret) -> Self {
        // HMAC pads or hashes the key to the block size, so no length is rejected.
        let keyed = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC-SHA256 accepts keys of any length");
        Self { keyed }
    }

    /// Authenticate a delivery.
    ///
    /// On success returns the body parsed as JSON, or `None` when the body
    /// is not JSON. Never panics on request-supplied input.
    pub fn verify(
        &self,
        envelope: &DeliveryEnvelope,
        raw_body: &[u8],
    ) -> Result<Option<Value>, VerificationError> {
        let components = envelope.signatures().map_err(|reason| {
            warn!(webhook_id = %envelope.id, reason = %reason, "webhook_envelope_malformed");
            VerificationError::MalformedEnvelope(reason)
        })?;

        let expected = self.expected_signature(&envelope.id, &envelope.timestamp, raw_body);

        // Every candidate is compared; no early exit on the first match.
        let mut candidates = 0usize;
        let mut matched = subtle::Choice::from(0u8);
        for component in components
            .iter()
            .filter(|c| c.version == SIGNATURE_VERSION)
        {
            candidates += 1;
            matched |= component.value.as_bytes().ct_eq(expected.as_bytes());
        }

        if !bool::from(matched) {
            warn!(
                webhook_id = %envelope.id,
                signature_count = components.len(),
                v1_candidates = candidates,
                "webhook_signature_mismatch"
            );
            return Err(VerificationError::SignatureMismatch);
        }

        debug!(webhook_id = %envelope.id, body_length = raw_body.len(), "webhook_signature_valid");

        Ok(serde_json::from_slice(raw_body).ok())
    }

    /// Produce a `v1,<base64>` signature for the given delivery.
    pub fn sign(&self, id: &str, timestamp: &str, raw_body: &[u8]) -> String {
        format!(
            "{},{}",
            SIGNATURE_VERSION,
            self.expected_signature(id, timestamp, raw_body)
        )
    }

    fn expected_signature(&self, id: &str, timestamp: &str, raw_body: &[u8]) -> String {
        let mut mac = self.keyed.clone();
        mac.update(id.as_bytes());
        mac.update(b".");
        mac.update(timestamp.as_bytes());
        mac.update(b".");
        mac.update(raw_body);
        STANDARD.encode(mac.finalize().into_bytes())
    }
}

impl std::fmt::Debug for WebhookVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookVerifier").finish_non_exhaustive()
    }
}
