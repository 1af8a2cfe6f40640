//! Edit engine configuration loaded from environment variables.
//!
//! Every setting has a default so the engine runs with zero configuration
//! against a local development server.

use std::time::Duration;

use missive_shared::constants::{
    DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_SERVER_URL, DEFAULT_SYNC_WAIT_TIMEOUT_MS,
};

#[derive(Debug, Clone)]
pub struct EditConfig {
    /// Base URL of the messaging API.
    /// Env: `MISSIVE_SERVER_URL`
    pub server_url: String,

    /// Token sent with every API request, if any.
    /// Env: `MISSIVE_API_TOKEN`
    pub api_token: Option<String>,

    /// How long an edit request waits for its target message to be
    /// acknowledged.  Matches the send pipeline's own timeout.
    /// Env: `MISSIVE_SYNC_WAIT_TIMEOUT_MS`
    pub sync_wait_timeout: Duration,

    /// Timeout of a single HTTP request.
    /// Env: `MISSIVE_HTTP_TIMEOUT_MS`
    pub http_timeout: Duration,

    /// Number of recent messages read when refreshing a conversation's
    /// latest-message cache.  Never below 1.
    /// Env: `MISSIVE_RECENT_FETCH_LIMIT`
    pub recent_fetch_limit: u32,
}

impl Default for EditConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            api_token: None,
            sync_wait_timeout: Duration::from_millis(DEFAULT_SYNC_WAIT_TIMEOUT_MS),
            http_timeout: Duration::from_millis(DEFAULT_HTTP_TIMEOUT_MS),
            recent_fetch_limit: 1,
        }
    }
}

impl EditConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("MISSIVE_SERVER_URL") {
            if !url.trim().is_empty() {
                config.server_url = url.trim().trim_end_matches('/').to_string();
            }
        }

        if let Ok(token) = std::env::var("MISSIVE_API_TOKEN") {
            if !token.is_empty() {
                config.api_token = Some(token);
            }
        }

        if let Ok(val) = std::env::var("MISSIVE_SYNC_WAIT_TIMEOUT_MS") {
            match parse_millis(&val) {
                Some(d) => config.sync_wait_timeout = d,
                None => tracing::warn!(value = %val, "Invalid MISSIVE_SYNC_WAIT_TIMEOUT_MS, using default"),
            }
        }

        if let Ok(val) = std::env::var("MISSIVE_HTTP_TIMEOUT_MS") {
            match parse_millis(&val) {
                Some(d) => config.http_timeout = d,
                None => tracing::warn!(value = %val, "Invalid MISSIVE_HTTP_TIMEOUT_MS, using default"),
            }
        }

        if let Ok(val) = std::env::var("MISSIVE_RECENT_FETCH_LIMIT") {
            match val.trim().parse::<u32>() {
                Ok(n) if n >= 1 => config.recent_fetch_limit = n,
                _ => tracing::warn!(value = %val, "Invalid MISSIVE_RECENT_FETCH_LIMIT, using default"),
            }
        }

        config
    }
}

/// Parse a positive millisecond count.
fn parse_millis(raw: &str) -> Option<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(ms) => Some(Duration::from_millis(ms)),
    }
}
