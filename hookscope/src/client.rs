//! Signed webhook sender.
//!
//! Posts a body to a receiver with the three Standard Webhooks headers
//! attached. The message id should stay the same across retries so the
//! receiver can use it for deduplication.

use std::env;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use reqwest::StatusCode;
use serde_json::Value;
use tracing::info;

use crate::config::SECRET_ENV;
use crate::signature::{
    WebhookSecret, WebhookVerifier, HEADER_ID, HEADER_SIGNATURE, HEADER_TIMESTAMP,
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Receiver URL used when no target is named.
pub const TARGET_URL_ENV: &str = "WEBHOOK_TARGET_URL";

/// Receiver URL used when neither a target nor `WEBHOOK_TARGET_URL` is given.
pub const DEFAULT_TARGET_URL: &str = "http://localhost:8080/webhook";

/// Where to deliver and which secret to sign with.
#[derive(Debug, Clone)]
pub struct Target {
    pub url: String,
    pub secret: WebhookSecret,
}

impl Target {
    /// Resolve a delivery target from the environment.
    ///
    /// A named target `NAME` reads `WEBHOOK_TARGET_<NAME>_URL` and
    /// `WEBHOOK_TARGET_<NAME>_SECRET`, both required. Without a name the URL
    /// comes from `WEBHOOK_TARGET_URL` (or the local default) and the secret
    /// from `WEBHOOK_SECRET`. An explicit `url` wins over either.
    pub fn from_env(name: Option<&str>, url: Option<String>) -> Result<Self> {
        Self::resolve(name, url, |key| env::var(key).ok())
    }

    fn resolve(
        name: Option<&str>,
        url: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let (url, secret_env) = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => {
                let name = name.to_uppercase();
                let url_env = format!("WEBHOOK_TARGET_{}_URL", name);
                let url = url
                    .or_else(|| lookup(&url_env))
                    .ok_or_else(|| anyhow!("{} is not set", url_env))?;
                (url, format!("WEBHOOK_TARGET_{}_SECRET", name))
            }
            None => {
                let url = url
                    .or_else(|| lookup(TARGET_URL_ENV))
                    .unwrap_or_else(|| DEFAULT_TARGET_URL.to_string());
                (url, SECRET_ENV.to_string())
            }
        };

        let raw_secret =
            lookup(&secret_env).ok_or_else(|| anyhow!("{} is not set", secret_env))?;
        let secret = WebhookSecret::from_base64(&raw_secret)
            .with_context(|| format!("{} is invalid", secret_env))?;

        Ok(Self { url, secret })
    }
}

/// Result of a single delivery attempt.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    pub status: StatusCode,
    /// Response body as JSON, or `Value::Null` if it was not JSON.
    pub body: Value,
}

/// HTTP client that signs every delivery with a shared secret.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    target_url: String,
    signer: WebhookVerifier,
    http: reqwest::Client,
}

impl WebhookClient {
    /// Create a client for `target_url` with a default 30 second timeout.
    pub fn new(target_url: impl Into<String>, secret: &WebhookSecret) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_http_client(target_url, secret, http))
    }

    /// Create a client around a caller-supplied `reqwest::Client`.
    pub fn with_http_client(
        target_url: impl Into<String>,
        secret: &WebhookSecret,
        http: reqwest::Client,
    ) -> Self {
        Self {
            target_url: target_url.into(),
            signer: WebhookVerifier::new(secret),
            http,
        }
    }

    /// Sign `body` with the current time and POST it.
    pub async fn send(&self, msg_id: &str, body: &[u8]) -> Result<SendOutcome> {
        let timestamp = Utc::now().timestamp().to_string();
        let signature = self.signer.sign(msg_id, &timestamp, body);

        let response = self
            .http
            .post(&self.target_url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(HEADER_ID, msg_id)
            .header(HEADER_TIMESTAMP, &timestamp)
            .header(HEADER_SIGNATURE, signature)
            .body(body.to_vec())
            .send()
            .await
            .context("Failed to send webhook")?;

        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .context("Failed to read webhook response")?;
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        info!(
            target_url = %self.target_url,
            webhook_id = %msg_id,
            status = status.as_u16(),
            "webhook_sent"
        );

        Ok(SendOutcome { status, body })
    }
}
