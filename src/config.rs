// src/config.rs
// Environment-driven configuration. `.env` is loaded by the binary via
// dotenvy before this runs; credentials stay optional so a missing key
// degrades to a failure string in the response instead of a crash.

use std::env;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SOURCE_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Uniform per-source budget enforced by the aggregator.
    pub source_timeout_secs: u64,
    pub earthdata_token: Option<String>,
    pub gemini_api_key: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let source_timeout_secs = env::var("SOURCE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_SOURCE_TIMEOUT_SECS);

        Self {
            bind_addr: format!("0.0.0.0:{port}"),
            source_timeout_secs,
            earthdata_token: non_empty(env::var("NASA_EARTHDATA_TOKEN").ok()),
            gemini_api_key: non_empty(env::var("GEMINI_API_KEY").ok()),
        }
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}
