//! Shared blocking HTTP plumbing.

use std::time::Duration;

use parley_core::EngineError;
use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};

const USER_AGENT: &str = concat!("parley/", env!("CARGO_PKG_VERSION"));
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Build a blocking client whose requests give up after `timeout`.
///
/// Must not be called from inside an async context.
pub fn client(timeout: Duration) -> Result<Client, EngineError> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| EngineError::Unavailable(format!("http client init: {e}")))
}

/// Join a base URL and a path, tolerating a trailing slash on the base.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Whether a status means the service side is at fault or overloaded.
pub fn is_service_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Classify a transport error.
pub fn transport_error(err: &reqwest::Error) -> EngineError {
    if err.is_decode() {
        EngineError::InvalidResponse(err.to_string())
    } else {
        EngineError::Unavailable(err.to_string())
    }
}

/// Pass successful responses through; turn error statuses into [`EngineError`].
///
/// 429 and 5xx are [`EngineError::Unavailable`], every other failure status
/// is [`EngineError::Rejected`].
pub fn check_status(response: Response) -> Result<Response, EngineError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    let message = if body.is_empty() {
        format!("status {status}")
    } else {
        format!("status {status}: {}", truncate(&body, 200))
    };
    if is_service_status(status) {
        Err(EngineError::Unavailable(message))
    } else {
        Err(EngineError::Rejected(message))
    }
}

fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_cleanly() {
        assert_eq!(endpoint("http://a:1", "/transcribe"), "http://a:1/transcribe");
        assert_eq!(endpoint("http://a:1/", "transcribe"), "http://a:1/transcribe");
        assert_eq!(endpoint("http://a:1//", "/x/y"), "http://a:1/x/y");
    }

    #[test]
    fn service_statuses() {
        assert!(is_service_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(is_service_status(StatusCode::BAD_GATEWAY));
        assert!(is_service_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!is_service_status(StatusCode::BAD_REQUEST));
        assert!(!is_service_status(StatusCode::NOT_FOUND));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo", 2), "hé");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
