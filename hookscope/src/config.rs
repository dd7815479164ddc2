//! Configuration module for environment variable parsing.
//!
//! The webhook secret is mandatory; everything else falls back to a default.

use std::env;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

use crate::signature::{SecretError, WebhookSecret};
use crate::store::DEFAULT_CAPACITY;

/// Environment variable holding the base64 (optionally `whsec_`-prefixed) secret.
pub const SECRET_ENV: &str = "WEBHOOK_SECRET";

/// Fatal startup configuration problems.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("WEBHOOK_SECRET is not set")]
    MissingSecret,

    #[error("WEBHOOK_SECRET is invalid: {0}")]
    InvalidSecret(#[from] SecretError),
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Shared secret used to authenticate deliveries
    pub secret: WebhookSecret,

    /// Port for the web server to listen on
    pub port: u16,

    /// Maximum number of deliveries kept in the event log
    pub event_log_capacity: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw_secret = env::var(SECRET_ENV).map_err(|_| ConfigError::MissingSecret)?;

        Ok(Config {
            secret: WebhookSecret::from_base64(&raw_secret)?,

            port: parse_or("PORT", 8080),

            event_log_capacity: match parse_or("EVENT_LOG_CAPACITY", DEFAULT_CAPACITY) {
                0 => {
                    warn!(env_var = "EVENT_LOG_CAPACITY", "Capacity must be positive, using default");
                    DEFAULT_CAPACITY
                }
                n => n,
            },
        })
    }
}

/// Parse an optional variable, warning and falling back on bad input.
fn parse_or<T: FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(env_var = name, value = %raw, "Invalid value, using default");
            default
        }
    }
}
