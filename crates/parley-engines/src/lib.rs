//! # parley-engines
//!
//! Blocking HTTP clients implementing the engine contracts from `parley-core`:
//!
//! - [`HttpRecognizer`]: multipart upload to a `/transcribe` service
//! - [`GoogleTranslator`]: `translate_a/single`
//! - [`GoogleSpeech`]: `translate_tts`, chunked, MP3 out
//! - [`InputToolsTransliterator`]: Input Tools `request`
//!
//! Every client uses `reqwest::blocking`. Build them outside any async
//! runtime and call them only from blocking worker threads.

#![deny(unsafe_code)]

pub mod http;
pub mod recognizer;
pub mod synthesizer;
pub mod translator;
pub mod transliterator;
pub mod wav;

use std::sync::Arc;
use std::time::Duration;

use parley_core::{EngineError, EngineSet};
use parley_settings::EngineSettings;
use tracing::{info, warn};

pub use recognizer::HttpRecognizer;
pub use synthesizer::GoogleSpeech;
pub use translator::GoogleTranslator;
pub use transliterator::InputToolsTransliterator;

/// Build the engine set described by `settings`.
///
/// Transliteration is attached only when `transliteration` is true. A
/// transliterator that cannot be constructed is logged and left out rather
/// than failing startup.
pub fn build_engines(
    settings: &EngineSettings,
    timeout: Duration,
    transliteration: bool,
) -> Result<EngineSet, EngineError> {
    let recognizer = HttpRecognizer::new(&settings.recognition.base_url, timeout)?;
    let translator = GoogleTranslator::new(&settings.translation.base_url, timeout)?;
    let synthesizer = GoogleSpeech::new(&settings.synthesis.base_url, timeout)?;

    let mut engines = EngineSet::new(
        Arc::new(recognizer),
        Arc::new(translator),
        Arc::new(synthesizer),
    );

    if transliteration {
        match InputToolsTransliterator::new(&settings.transliteration.base_url, timeout) {
            Ok(t) => engines = engines.with_transliterator(Arc::new(t)),
            Err(error) => warn!(%error, "transliteration unavailable, continuing without it"),
        }
    }

    info!(
        recognition = %settings.recognition.base_url,
        translation = %settings.translation.base_url,
        synthesis = %settings.synthesis.base_url,
        transliteration = engines.has_transliteration(),
        "engines ready"
    );
    Ok(engines)
}
