//! Upstream commerce API configuration parsed from environment variables.

use super::UpstreamError;

pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamConfig {
    /// Base URL of the commerce backend, without a trailing slash.
    pub base_url: String,
    /// Optional bearer token sent on every request.
    pub api_key: Option<String>,
    pub request_timeout_secs: u64,
    pub connect_timeout_secs: u64,
}

impl UpstreamConfig {
    /// Build typed upstream config from environment variables.
    ///
    /// Required:
    /// - `UPSTREAM_BASE_URL`
    ///
    /// Optional:
    /// - `UPSTREAM_API_KEY`: bearer token
    /// - `UPSTREAM_REQUEST_TIMEOUT_SECS`: default 30
    /// - `UPSTREAM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// `UpstreamError::Config` when `UPSTREAM_BASE_URL` is missing.
    pub fn from_env() -> Result<Self, UpstreamError> {
        let base_url = std::env::var("UPSTREAM_BASE_URL")
            .map_err(|_| UpstreamError::Config("UPSTREAM_BASE_URL is not set".into()))?
            .trim_end_matches('/')
            .to_string();
        let api_key = std::env::var("UPSTREAM_API_KEY").ok().filter(|k| !k.is_empty());

        Ok(Self {
            base_url,
            api_key,
            request_timeout_secs: env_parse_u64("UPSTREAM_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_timeout_secs: env_parse_u64("UPSTREAM_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        })
    }
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
