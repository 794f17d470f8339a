//! Pipeline outputs: the caller-facing result and the broadcast envelope.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};

use crate::audio;
use crate::errors::PipelineError;

/// Outcome of one pipeline run.
///
/// When `recognized_text` is empty every other field is empty too.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TranslationResult {
    /// Text recognized from the input audio, before any transliteration.
    pub recognized_text: String,
    /// Text in the target language.
    pub translated_text: String,
    /// Synthesized audio bytes.
    pub audio: Vec<u8>,
    /// MIME type of `audio`.
    pub audio_mime: String,
}

impl TranslationResult {
    /// The "no speech" result.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether nothing was recognized.
    pub fn is_empty(&self) -> bool {
        self.recognized_text.is_empty()
    }

    /// Wire body for the requesting caller.
    pub fn to_response(&self) -> TranslateResponseBody {
        TranslateResponseBody {
            recognized_text: self.recognized_text.clone(),
            translated_text: self.translated_text.clone(),
            audio_b64: audio::encode_base64(&self.audio),
            audio_mime: self.audio_mime.clone(),
        }
    }

    /// Envelope for subscribers, stamped now.
    pub fn to_broadcast(&self, topic: &str, sender: &str) -> BroadcastMessage {
        BroadcastMessage {
            topic: topic.to_string(),
            timestamp: Utc::now(),
            recognized_text: self.recognized_text.clone(),
            translated_text: self.translated_text.clone(),
            audio_b64: audio::encode_base64(&self.audio),
            audio_mime: self.audio_mime.clone(),
            sender: sender.to_string(),
        }
    }
}

/// `POST /translate` success body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslateResponseBody {
    /// Recognized text.
    pub recognized_text: String,
    /// Translated text.
    pub translated_text: String,
    /// Base64 synthesized audio.
    pub audio_b64: String,
    /// MIME type of the audio.
    pub audio_mime: String,
}

/// Failure body shared by the gateways.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Error message.
    pub error: String,
    /// Remediation hint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorBody {
    /// Plain error without a hint.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            hint: None,
        }
    }
}

impl From<&PipelineError> for ErrorBody {
    fn from(err: &PipelineError) -> Self {
        Self {
            error: err.to_string(),
            hint: err.hint().map(str::to_string),
        }
    }
}

fn serialize_timestamp<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Micros, true))
}

/// Message pushed to every subscriber after a successful run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BroadcastMessage {
    /// Fixed topic tag.
    pub topic: String,
    /// Creation time, ISO-8601 UTC with a `Z` suffix.
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    /// Recognized text.
    pub recognized_text: String,
    /// Translated text.
    pub translated_text: String,
    /// Base64 synthesized audio.
    pub audio_b64: String,
    /// MIME type of the audio.
    pub audio_mime: String,
    /// Sender tag.
    pub sender: String,
}
