//! Engine contracts.
//!
//! Every engine is blocking and may take seconds. Callers must run them off
//! the async executor. Implementations are shared across concurrent worker
//! invocations, so they must be `Send + Sync`.

use std::fmt;
use std::sync::Arc;

use crate::audio::MPEG_MIME;
use crate::language::SourceLanguage;

/// Outcome of a successful recognition call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recognition {
    /// Speech was found.
    Speech(String),
    /// The audio contained no recognizable speech.
    NoSpeech,
}

impl Recognition {
    /// Collapse whitespace-only text into [`Recognition::NoSpeech`].
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.trim().is_empty() {
            Self::NoSpeech
        } else {
            Self::Speech(text)
        }
    }
}

/// Recognition failure, split by who is at fault.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RecognitionError {
    /// The recognition service was unreachable, throttled, timed out or
    /// failed on its side.
    #[error("{0}")]
    Service(String),
    /// Anything else: undecodable audio, malformed response.
    #[error("{0}")]
    Internal(String),
}

/// Failure from translation, synthesis or transliteration engines.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Transport failure or timeout.
    #[error("engine unavailable: {0}")]
    Unavailable(String),
    /// The engine answered with an error status or refused the input.
    #[error("engine rejected request: {0}")]
    Rejected(String),
    /// The engine answered with something we could not interpret.
    #[error("invalid engine response: {0}")]
    InvalidResponse(String),
}

/// Speech-to-text.
pub trait SpeechRecognizer: Send + Sync {
    /// Transcribe WAV audio.
    fn recognize(
        &self,
        audio: &[u8],
        language: &SourceLanguage,
    ) -> Result<Recognition, RecognitionError>;
}

/// Text-to-text translation.
pub trait Translator: Send + Sync {
    /// Translate `text` from `source` (or auto-detect) into `target`.
    fn translate(
        &self,
        text: &str,
        source: &SourceLanguage,
        target: &str,
    ) -> Result<String, EngineError>;
}

/// Text-to-speech.
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize `text` spoken in `language`.
    fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, EngineError>;

    /// MIME type of the produced audio.
    fn mime_type(&self) -> &str {
        MPEG_MIME
    }
}

/// Script conversion into the native script of a language.
pub trait Transliterator: Send + Sync {
    /// Rewrite `text` (for example romanized Hindi) in the script of `language`.
    fn transliterate(&self, text: &str, language: &str) -> Result<String, EngineError>;
}

/// The engines a pipeline runs with. Transliteration is optional and its
/// presence is decided once, at startup.
#[derive(Clone)]
pub struct EngineSet {
    /// Speech recognition.
    pub recognizer: Arc<dyn SpeechRecognizer>,
    /// Translation.
    pub translator: Arc<dyn Translator>,
    /// Speech synthesis.
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    /// Transliteration, when available.
    pub transliterator: Option<Arc<dyn Transliterator>>,
}

impl EngineSet {
    /// Build a set without transliteration.
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self {
            recognizer,
            translator,
            synthesizer,
            transliterator: None,
        }
    }

    /// Attach a transliterator.
    #[must_use]
    pub fn with_transliterator(mut self, transliterator: Arc<dyn Transliterator>) -> Self {
        self.transliterator = Some(transliterator);
        self
    }

    /// Whether transliteration is available.
    pub fn has_transliteration(&self) -> bool {
        self.transliterator.is_some()
    }
}

impl fmt::Debug for EngineSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineSet")
            .field("synthesizer_mime", &self.synthesizer.mime_type())
            .field("transliteration", &self.has_transliteration())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl SpeechRecognizer for Echo {
        fn recognize(&self, audio: &[u8], _: &SourceLanguage) -> Result<Recognition, RecognitionError> {
            Ok(Recognition::from_text(String::from_utf8_lossy(audio)))
        }
    }

    impl Translator for Echo {
        fn translate(&self, text: &str, _: &SourceLanguage, _: &str) -> Result<String, EngineError> {
            Ok(text.to_uppercase())
        }
    }

    impl SpeechSynthesizer for Echo {
        fn synthesize(&self, text: &str, _: &str) -> Result<Vec<u8>, EngineError> {
            Ok(text.as_bytes().to_vec())
        }
    }

    impl Transliterator for Echo {
        fn transliterate(&self, text: &str, _: &str) -> Result<String, EngineError> {
            Ok(text.to_string())
        }
    }

    #[test]
    fn whitespace_is_no_speech() {
        assert_eq!(Recognition::from_text("  \n"), Recognition::NoSpeech);
        assert_eq!(Recognition::from_text(""), Recognition::NoSpeech);
        assert_eq!(Recognition::from_text("hi"), Recognition::Speech("hi".into()));
    }

    #[test]
    fn default_mime_is_mpeg() {
        assert_eq!(Echo.mime_type(), "audio/mpeg");
    }

    #[test]
    fn engine_set_transliteration_optional() {
        let echo = Arc::new(Echo);
        let set = EngineSet::new(echo.clone(), echo.clone(), echo.clone());
        assert!(!set.has_transliteration());

        let set = set.with_transliterator(echo);
        assert!(set.has_transliteration());
        assert!(format!("{set:?}").contains("transliteration: true"));
    }

    #[test]
    fn engine_error_display() {
        let err = EngineError::Unavailable("connect refused".into());
        assert_eq!(err.to_string(), "engine unavailable: connect refused");
    }
}
