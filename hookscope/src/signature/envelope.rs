//! Signature envelope carried in webhook request headers.

use serde::{Deserialize, Serialize};

/// Header carrying the unique message id.
pub const HEADER_ID: &str = "webhook-id";

/// Header carrying the delivery timestamp.
pub const HEADER_TIMESTAMP: &str = "webhook-timestamp";

/// Header carrying the space-separated signature list.
pub const HEADER_SIGNATURE: &str = "webhook-signature";

/// The only signature version this verifier accepts.
pub const SIGNATURE_VERSION: &str = "v1";

/// The three authentication fields of a webhook delivery.
///
/// `id` and `timestamp` are opaque strings; they are signed as-is and
/// never reinterpreted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryEnvelope {
    pub id: String,
    pub timestamp: String,
    pub signature: String,
}

/// One `<version>,<value>` entry of the signature header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignatureComponent<'a> {
    pub version: &'a str,
    pub value: &'a str,
}

impl DeliveryEnvelope {
    pub fn new(
        id: impl Into<String>,
        timestamp: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            timestamp: timestamp.into(),
            signature: signature.into(),
        }
    }

    /// Check that every field is present and split the signature list.
    ///
    /// Returns a human-readable reason when the envelope is malformed.
    pub fn signatures(&self) -> Result<Vec<SignatureComponent<'_>>, String> {
        let missing: Vec<&str> = [
            (HEADER_ID, &self.id),
            (HEADER_TIMESTAMP, &self.timestamp),
            (HEADER_SIGNATURE, &self.signature),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if !missing.is_empty() {
            return Err(format!("missing header(s): {}", missing.join(", ")));
        }

        parse_signature_list(&self.signature)
    }
}

/// Split a `webhook-signature` header into its components.
pub fn parse_signature_list(header: &str) -> Result<Vec<SignatureComponent<'_>>, String> {
    let components = header
        .split_whitespace()
        .map(|part| match part.split_once(',') {
            Some((version, value)) if !version.is_empty() && !value.is_empty() => {
                Ok(SignatureComponent { version, value })
            }
            _ => Err(format!("unparsable signature component {:?}", part)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    if components.is_empty() {
        return Err("empty signature list".to_string());
    }

    Ok(components)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single() {
        let parsed = parse_signature_list("v1,abc=").unwrap();
        assert_eq!(
            parsed,
            vec![SignatureComponent {
                version: "v1",
                value: "abc="
            }]
        );
    }

    #[test]
    fn test_parse_multiple_and_extra_spaces() {
        let parsed = parse_signature_list("v1,aaa  v1a,bbb v2,ccc").unwrap();
        let versions: Vec<&str> = parsed.iter().map(|c| c.version).collect();
        assert_eq!(versions, vec!["v1", "v1a", "v2"]);
    }

    #[test]
    fn test_value_may_contain_commas() {
        let parsed = parse_signature_list("v1,a,b").unwrap();
        assert_eq!(parsed[0].value, "a,b");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_signature_list("nocomma").is_err());
        assert!(parse_signature_list(",abc").is_err());
        assert!(parse_signature_list("v1,").is_err());
        assert!(parse_signature_list("v1,abc junk").is_err());
        assert!(parse_signature_list("   ").is_err());
    }

    #[test]
    fn test_signatures_reports_missing_headers() {
        let envelope = DeliveryEnvelope::new("", "1700000000", "");
        let err = envelope.signatures().unwrap_err();
        assert!(err.contains(HEADER_ID));
        assert!(err.contains(HEADER_SIGNATURE));
        assert!(!err.contains(HEADER_TIMESTAMP));
    }
}
