//! Delivery records kept in the event log.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::signature::{DeliveryEnvelope, VerificationError};

/// A received webhook delivery, verified or rejected.
///
/// Fields are private so that a verified record can never carry an error.
/// Records are only ever built by the two constructors; the JSON form is
/// output-only since the body text is lossy.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    envelope: DeliveryEnvelope,
    /// Exact request body; rendered as (lossy) UTF-8 text in JSON.
    #[serde(serialize_with = "body_as_text")]
    raw_body: Vec<u8>,
    payload: Option<Value>,
    verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    received_at: DateTime<Utc>,
}

impl DeliveryRecord {
    /// Record for a delivery that passed verification.
    pub fn verified(envelope: DeliveryEnvelope, raw_body: Vec<u8>, payload: Option<Value>) -> Self {
        Self {
            envelope,
            raw_body,
            payload,
            verified: true,
            error: None,
            received_at: Utc::now(),
        }
    }

    /// Record for a delivery that failed verification.
    ///
    /// The payload is still kept when the body happens to be JSON.
    pub fn rejected(envelope: DeliveryEnvelope, raw_body: Vec<u8>, error: &VerificationError) -> Self {
        let payload = serde_json::from_slice(&raw_body).ok();
        Self {
            envelope,
            raw_body,
            payload,
            verified: false,
            error: Some(error.to_string()),
            received_at: Utc::now(),
        }
    }

    pub fn envelope(&self) -> &DeliveryEnvelope {
        &self.envelope
    }

    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn is_verified(&self) -> bool {
        self.verified
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn received_at(&self) -> DateTime<Utc> {
        self.received_at
    }

    /// The `type` field of an object payload, if any.
    pub fn event_type(&self) -> Option<&str> {
        self.payload.as_ref()?.get("type")?.as_str()
    }

    pub(crate) fn stamp(&mut self, at: DateTime<Utc>) {
        self.received_at = at;
    }
}

fn body_as_text<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(body))
}
