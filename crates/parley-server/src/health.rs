//! `/health` endpoint.

use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Health check response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the server is running.
    pub status: String,
    /// Seconds since the server started.
    pub uptime_secs: u64,
    /// Live subscriber count.
    pub subscribers: usize,
    /// Whether transliteration was available at startup.
    pub transliteration: bool,
}

/// Build a health response from live counters.
pub fn health_check(start_time: Instant, subscribers: usize, transliteration: bool) -> HealthResponse {
    HealthResponse {
        status: "ok".into(),
        uptime_secs: start_time.elapsed().as_secs(),
        subscribers,
        transliteration,
    }
}
