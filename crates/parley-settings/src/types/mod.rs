//! Settings type definitions.
//!
//! All types use `#[serde(rename_all = "camelCase")]` and implement
//! [`Default`] with production values. Sections marked `#[serde(default)]`
//! accept partial JSON.

mod engines;
mod server;

pub use engines::*;
pub use server::*;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Root settings type.
///
/// ```json
/// {
///   "server": { "port": 9000 },
///   "pipeline": { "workerThreads": 4 },
///   "engines": { "transliteration": { "enabled": false } }
/// }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParleySettings {
    /// Listener settings.
    pub server: ServerSettings,
    /// Orchestration settings.
    pub pipeline: PipelineSettings,
    /// Engine endpoints.
    pub engines: EngineSettings,
    /// Logging configuration.
    pub logging: LoggingSettings,
}

/// Upper bound on `pipeline.workerThreads`.
pub const MAX_WORKER_THREADS: usize = 1024;

impl ParleySettings {
    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.pipeline.worker_threads == 0 {
            return Err(SettingsError::InvalidValue(
                "pipeline.workerThreads must be greater than zero".into(),
            ));
        }
        if self.pipeline.worker_threads > MAX_WORKER_THREADS {
            return Err(SettingsError::InvalidValue(format!(
                "pipeline.workerThreads must be at most {MAX_WORKER_THREADS}"
            )));
        }
        if self.server.max_send_queue == 0 {
            return Err(SettingsError::InvalidValue(
                "server.maxSendQueue must be greater than zero".into(),
            ));
        }
        if self.pipeline.topic.trim().is_empty() {
            return Err(SettingsError::InvalidValue(
                "pipeline.topic must not be empty".into(),
            ));
        }
        if self.pipeline.engine_timeout_ms == 0 {
            return Err(SettingsError::InvalidValue(
                "pipeline.engineTimeoutMs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        assert!(ParleySettings::default().validate().is_ok());
    }

    #[test]
    fn zero_workers_rejected() {
        let mut s = ParleySettings::default();
        s.pipeline.worker_threads = 0;
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("workerThreads"));
    }

    #[test]
    fn oversized_worker_pool_rejected() {
        let mut s = ParleySettings::default();
        s.pipeline.worker_threads = MAX_WORKER_THREADS;
        assert!(s.validate().is_ok());

        s.pipeline.worker_threads = usize::MAX;
        let err = s.validate().unwrap_err();
        assert!(err.to_string().contains("at most"));
    }

    #[test]
    fn zero_queue_rejected() {
        let mut s = ParleySettings::default();
        s.server.max_send_queue = 0;
        assert!(s.validate().is_err());
    }

    #[test]
    fn blank_topic_rejected() {
        let mut s = ParleySettings::default();
        s.pipeline.topic = "  ".into();
        assert!(s.validate().is_err());
    }

    #[test]
    fn serde_roundtrip_keeps_sections() {
        let json = serde_json::to_value(ParleySettings::default()).unwrap();
        assert!(json["server"].is_object());
        assert!(json["pipeline"].is_object());
        assert!(json["engines"]["transliteration"].is_object());
        assert_eq!(json["logging"]["format"], "pretty");
    }
}
