//! Network, pipeline and logging settings.

use serde::{Deserialize, Serialize};

/// HTTP/WebSocket listener settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Per-subscriber outbound queue depth. A full queue drops the subscriber.
    pub max_send_queue: usize,
    /// Largest decoded audio payload accepted by `/translate`, in bytes.
    pub max_audio_bytes: usize,
    /// Grace period for in-flight work on shutdown, in seconds.
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_send_queue: 64,
            max_audio_bytes: 26_214_400,
            shutdown_timeout_secs: 10,
        }
    }
}

/// Pipeline orchestration settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineSettings {
    /// Topic stamped on every broadcast.
    pub topic: String,
    /// Sender tag stamped on every broadcast.
    pub sender: String,
    /// Target language used when a request leaves it blank.
    pub default_target_language: String,
    /// Maximum engine calls in flight at once.
    pub worker_threads: usize,
    /// Per engine call deadline, in milliseconds.
    pub engine_timeout_ms: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            topic: "global_topic".to_string(),
            sender: "web".to_string(),
            default_target_language: "en".to_string(),
            worker_threads: 8,
            engine_timeout_ms: 30_000,
        }
    }
}

/// Log verbosity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace-level (most verbose).
    Trace,
    /// Debug-level.
    Debug,
    /// Info-level (default).
    #[default]
    Info,
    /// Warning-level.
    Warn,
    /// Error-level.
    Error,
}

impl LogLevel {
    /// Convert to a tracing filter string.
    pub fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable, colored when attached to a terminal.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Logging configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level. `RUST_LOG` takes precedence when set.
    pub level: LogLevel,
    /// Output format.
    pub format: LogFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_filter_strings() {
        assert_eq!(LogLevel::Trace.as_filter_str(), "trace");
        assert_eq!(LogLevel::Warn.as_filter_str(), "warn");
        assert_eq!(LogLevel::default().as_filter_str(), "info");
    }

    #[test]
    fn log_format_lowercase_wire() {
        let f: LogFormat = serde_json::from_str(r#""json""#).unwrap();
        assert_eq!(f, LogFormat::Json);
        assert!(serde_json::from_str::<LogFormat>(r#""xml""#).is_err());
    }

    #[test]
    fn server_camel_case_keys() {
        let json = serde_json::to_value(ServerSettings::default()).unwrap();
        assert_eq!(json["maxSendQueue"], 64);
        assert_eq!(json["shutdownTimeoutSecs"], 10);
    }

    #[test]
    fn pipeline_partial_json() {
        let p: PipelineSettings = serde_json::from_str(r#"{"workerThreads": 2}"#).unwrap();
        assert_eq!(p.worker_threads, 2);
        assert_eq!(p.topic, "global_topic");
        assert_eq!(p.sender, "web");
    }
}
