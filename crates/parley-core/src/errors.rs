//! Pipeline error taxonomy.
//!
//! Each variant is a terminating outcome reported to the caller with a stable
//! kind string and an HTTP-equivalent status. None is retried and none
//! triggers a broadcast. "No speech" is deliberately absent: it is a
//! successful outcome with empty fields.

/// Terminating pipeline failure.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// Missing or empty audio, unsupported container, malformed transport encoding.
    #[error("{message}")]
    InvalidRequest {
        /// Human-readable description.
        message: String,
        /// Optional remediation hint for the client.
        hint: Option<String>,
    },

    /// The recognition engine was reachable but reported a service error,
    /// or could not be reached in time.
    #[error("STT request failed: {0}")]
    RecognitionService(String),

    /// Any other recognition failure.
    #[error("STT processing error: {0}")]
    RecognitionInternal(String),

    /// The translation engine failed.
    #[error("Translation failed: {0}")]
    Translation(String),

    /// The synthesis engine failed.
    #[error("TTS failed: {0}")]
    Synthesis(String),
}

impl PipelineError {
    /// Invalid request without a hint.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            hint: None,
        }
    }

    /// Invalid request with a client hint.
    pub fn invalid_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    /// Short classification string for logging/metrics.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid_request",
            Self::RecognitionService(_) => "recognition_service",
            Self::RecognitionInternal(_) => "recognition_internal",
            Self::Translation(_) => "translation",
            Self::Synthesis(_) => "synthesis",
        }
    }

    /// HTTP-equivalent status code.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. } => 400,
            Self::RecognitionInternal(_) => 500,
            Self::RecognitionService(_) | Self::Translation(_) | Self::Synthesis(_) => 502,
        }
    }

    /// Client hint, if the variant carries one.
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::InvalidRequest { hint, .. } => hint.as_deref(),
            _ => None,
        }
    }

    /// Whether the caller is at fault.
    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}
