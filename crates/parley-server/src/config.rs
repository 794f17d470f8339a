//! Server configuration.

use std::time::Duration;

use parley_settings::ParleySettings;

use crate::pipeline::PipelineConfig;

/// Runtime configuration for [`ParleyServer`](crate::server::ParleyServer).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on (0 = OS picks).
    pub port: u16,
    /// Outbound queue depth per subscriber.
    pub max_send_queue: usize,
    /// Concurrent engine calls.
    pub worker_threads: usize,
    /// Deadline for a single engine call.
    pub engine_timeout: Duration,
    /// Grace period for tasks on shutdown.
    pub shutdown_timeout: Duration,
    /// Values stamped on pipeline runs.
    pub pipeline: PipelineConfig,
}

impl ServerConfig {
    /// Derive the server configuration from loaded settings.
    pub fn from_settings(settings: &ParleySettings) -> Self {
        Self {
            host: settings.server.host.clone(),
            port: settings.server.port,
            max_send_queue: settings.server.max_send_queue,
            worker_threads: settings.pipeline.worker_threads,
            engine_timeout: Duration::from_millis(settings.pipeline.engine_timeout_ms),
            shutdown_timeout: Duration::from_secs(settings.server.shutdown_timeout_secs),
            pipeline: PipelineConfig {
                topic: settings.pipeline.topic.clone(),
                sender: settings.pipeline.sender.clone(),
                default_target_language: settings.pipeline.default_target_language.clone(),
                max_audio_bytes: settings.server.max_audio_bytes,
            },
        }
    }

    /// `host:port` for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Request body cap for `/translate`: base64 of the largest audio plus
    /// room for the JSON envelope.
    pub fn max_body_bytes(&self) -> usize {
        self.pipeline
            .max_audio_bytes
            .div_ceil(3)
            .saturating_mul(4)
            .saturating_add(64 * 1024)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_settings(&ParleySettings::default())
    }
}
