//! Inbound translation requests.

use bytes::Bytes;
use serde::Deserialize;

use crate::audio::{self, AudioFormat};
use crate::errors::PipelineError;
use crate::language::{self, SourceLanguage};

const WAV_ONLY: &str = "Server accepts WAV only (audio_format='wav').";
const WAV_ONLY_HINT: &str = "Make sure the browser client encodes and sends WAV PCM16.";

fn default_input_language() -> String {
    language::AUTO.to_string()
}

fn default_target_language() -> String {
    language::DEFAULT_LANGUAGE.to_string()
}

/// `POST /translate` body as it arrives on the wire.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct TranslateRequestBody {
    /// Source-language hint, `"auto"` for detection.
    #[serde(default = "default_input_language")]
    pub input_language: String,
    /// Target language code.
    #[serde(default = "default_target_language")]
    pub target_language: String,
    /// Base64 audio, optionally wrapped in a data URI.
    pub audio_b64: String,
    /// Container tag; must be `wav`.
    pub audio_format: String,
    /// Request transliteration of the recognized text before translation.
    pub transliterate: bool,
}

/// Validated, decoded request. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslationRequest {
    /// Source-language hint.
    pub source: SourceLanguage,
    /// Target language code, never blank.
    pub target: String,
    /// Raw audio, never empty.
    pub audio: Bytes,
    /// Whether transliteration was requested.
    pub transliterate: bool,
}

impl TranslationRequest {
    /// Validate and decode a wire body.
    ///
    /// Checks run in order: audio present, format is WAV, base64 decodes,
    /// decoded payload is non-empty and at most `max_audio_bytes`.
    pub fn from_body(
        body: TranslateRequestBody,
        max_audio_bytes: usize,
    ) -> Result<Self, PipelineError> {
        if body.audio_b64.trim().is_empty() {
            return Err(PipelineError::invalid("audio_b64 missing"));
        }

        if AudioFormat::parse(&body.audio_format).is_none() {
            return Err(PipelineError::invalid_with_hint(WAV_ONLY, WAV_ONLY_HINT));
        }

        let decoded = audio::decode_base64(&body.audio_b64)
            .map_err(|e| PipelineError::invalid(format!("Invalid base64: {e}")))?;

        if decoded.is_empty() {
            return Err(PipelineError::invalid("audio payload is empty"));
        }
        if decoded.len() > max_audio_bytes {
            return Err(PipelineError::invalid(format!(
                "audio payload too large: {} bytes (max {max_audio_bytes})",
                decoded.len()
            )));
        }

        Ok(Self {
            source: SourceLanguage::parse(&body.input_language),
            target: language::target_or_default(&body.target_language),
            audio: Bytes::from(decoded),
            transliterate: body.transliterate,
        })
    }

    /// Whether transliteration applies to this request at all.
    ///
    /// Auto-detected input and the Latin-script baseline never transliterate.
    pub fn wants_transliteration(&self) -> bool {
        self.transliterate
            && self
                .source
                .code()
                .is_some_and(|code| !code.eq_ignore_ascii_case(language::DEFAULT_LANGUAGE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAX: usize = 1024;

    fn body(audio: &str, format: &str) -> TranslateRequestBody {
        TranslateRequestBody {
            input_language: "auto".into(),
            target_language: "en".into(),
            audio_b64: audio.into(),
            audio_format: format.into(),
            transliterate: false,
        }
    }

    #[test]
    fn defaults_from_empty_json() {
        let body: TranslateRequestBody = serde_json::from_str("{}").unwrap();
        assert_eq!(body.input_language, "auto");
        assert_eq!(body.target_language, "en");
        assert!(body.audio_b64.is_empty());
        assert!(body.audio_format.is_empty());
        assert!(!body.transliterate);
    }

    #[test]
    fn missing_audio_rejected_first() {
        // Format is also wrong, but the audio check wins.
        let err = TranslationRequest::from_body(body("", "mp3"), MAX).unwrap_err();
        assert_eq!(err.to_string(), "audio_b64 missing");
        assert!(err.hint().is_none());
    }

    #[test]
    fn non_wav_rejected_with_hint() {
        let err = TranslationRequest::from_body(body("SGVsbG8=", "webm"), MAX).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.to_string(), WAV_ONLY);
        assert_eq!(err.hint(), Some(WAV_ONLY_HINT));
    }

    #[test]
    fn empty_format_rejected() {
        let err = TranslationRequest::from_body(body("SGVsbG8=", ""), MAX).unwrap_err();
        assert_eq!(err.hint(), Some(WAV_ONLY_HINT));
    }

    #[test]
    fn bad_base64_rejected() {
        let err = TranslationRequest::from_body(body("@@@@", "wav"), MAX).unwrap_err();
        assert!(err.to_string().starts_with("Invalid base64:"));
        assert_eq!(err.error_kind(), "invalid_request");
    }

    #[test]
    fn decoded_empty_rejected() {
        let err =
            TranslationRequest::from_body(body("data:audio/wav;base64,", "wav"), MAX).unwrap_err();
        assert_eq!(err.error_kind(), "invalid_request");
    }

    #[test]
    fn oversized_payload_rejected() {
        let err = TranslationRequest::from_body(body("SGVsbG8=", "wav"), 4).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn valid_body_decoded() {
        let mut b = body("data:audio/wav;base64,SGVsbG8=", "WAV");
        b.input_language = "hi".into();
        b.target_language = String::new();
        b.transliterate = true;

        let req = TranslationRequest::from_body(b, MAX).unwrap();
        assert_eq!(req.audio.as_ref(), b"Hello");
        assert_eq!(req.source, SourceLanguage::Code("hi".into()));
        assert_eq!(req.target, "en");
        assert!(req.wants_transliteration());
    }

    #[test]
    fn transliteration_gate() {
        let mut b = body("SGVsbG8=", "wav");
        b.transliterate = true;

        let auto = TranslationRequest::from_body(b.clone(), MAX).unwrap();
        assert!(!auto.wants_transliteration());

        b.input_language = "EN".into();
        let english = TranslationRequest::from_body(b.clone(), MAX).unwrap();
        assert!(!english.wants_transliteration());

        b.input_language = "ta".into();
        b.transliterate = false;
        let not_requested = TranslationRequest::from_body(b, MAX).unwrap();
        assert!(!not_requested.wants_transliteration());
    }
}
