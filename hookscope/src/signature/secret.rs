//! Shared webhook secret handling.
//!
//! Secrets travel as base64 text, optionally carrying the conventional
//! `whsec_` prefix. They are decoded exactly once, at startup.

use std::fmt;

use base64::{engine::general_purpose::STANDARD, Engine};
use rand::RngCore;
use thiserror::Error;

/// Prefix conventionally attached to Standard Webhooks secrets.
pub const SECRET_PREFIX: &str = "whsec_";

/// Errors raised while loading a secret.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("webhook secret is empty")]
    Empty,

    #[error("webhook secret is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

/// Decoded HMAC key, immutable for the lifetime of the process.
#[derive(Clone, PartialEq, Eq)]
pub struct WebhookSecret {
    key: Vec<u8>,
}

impl WebhookSecret {
    /// Decode a base64 secret, stripping an optional `whsec_` prefix.
    pub fn from_base64(encoded: &str) -> Result<Self, SecretError> {
        let trimmed = encoded.trim();
        let body = trimmed.strip_prefix(SECRET_PREFIX).unwrap_or(trimmed);

        if body.is_empty() {
            return Err(SecretError::Empty);
        }

        let key = STANDARD.decode(body)?;
        Self::from_bytes(key)
    }

    /// Wrap raw key bytes.
    pub fn from_bytes(key: impl Into<Vec<u8>>) -> Result<Self, SecretError> {
        let key = key.into();
        if key.is_empty() {
            return Err(SecretError::Empty);
        }
        Ok(Self { key })
    }

    /// Generate a fresh random secret of `len` bytes.
    pub fn generate(len: usize) -> Result<Self, SecretError> {
        let mut key = vec![0u8; len];
        rand::thread_rng().fill_bytes(&mut key);
        Self::from_bytes(key)
    }

    /// Render as `whsec_<base64>`.
    pub fn to_base64_string(&self) -> String {
        format!("{}{}", SECRET_PREFIX, STANDARD.encode(&self.key))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.key.is_empty()
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSecret")
            .field("len", &self.key.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base64_plain() {
        let secret = WebhookSecret::from_base64("c3VwZXJzZWNyZXQ=").unwrap();
        assert_eq!(secret.as_bytes(), b"supersecret");
    }

    #[test]
    fn test_from_base64_strips_prefix() {
        let secret = WebhookSecret::from_base64("whsec_c3VwZXJzZWNyZXQ=").unwrap();
        assert_eq!(secret.as_bytes(), b"supersecret");
    }

    #[test]
    fn test_from_base64_empty() {
        assert!(matches!(
            WebhookSecret::from_base64(""),
            Err(SecretError::Empty)
        ));
        assert!(matches!(
            WebhookSecret::from_base64("whsec_"),
            Err(SecretError::Empty)
        ));
        assert!(matches!(
            WebhookSecret::from_base64("   "),
            Err(SecretError::Empty)
        ));
    }

    #[test]
    fn test_from_base64_invalid() {
        assert!(matches!(
            WebhookSecret::from_base64("not base64!!"),
            Err(SecretError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_generate_round_trips() {
        let secret = WebhookSecret::generate(32).unwrap();
        assert_eq!(secret.len(), 32);

        let rendered = secret.to_base64_string();
        assert!(rendered.starts_with(SECRET_PREFIX));
        assert_eq!(WebhookSecret::from_base64(&rendered).unwrap(), secret);
    }

    #[test]
    fn test_generate_zero_length_rejected() {
        assert!(matches!(WebhookSecret::generate(0), Err(SecretError::Empty)));
    }

    #[test]
    fn test_debug_hides_key() {
        let secret = WebhookSecret::from_bytes(b"supersecret".to_vec()).unwrap();
        let debug = format!("{:?}", secret);
        assert!(!debug.contains("supersecret"));
        assert!(debug.contains("len"));
    }
}
