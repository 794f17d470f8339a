//! # parley-core
//!
//! Domain types shared by every Parley crate.
//!
//! - [`request`]: the validated, immutable [`TranslationRequest`] and its wire body
//! - [`result`]: [`TranslationResult`], the caller-facing response and the
//!   enriched [`BroadcastMessage`]
//! - [`engine`]: blocking contracts for the recognition, translation,
//!   synthesis and transliteration collaborators
//! - [`errors`]: the stable [`PipelineError`] taxonomy

#![deny(unsafe_code)]

pub mod audio;
pub mod engine;
pub mod errors;
pub mod language;
pub mod request;
pub mod result;

pub use audio::AudioFormat;
pub use engine::{
    EngineError, EngineSet, Recognition, RecognitionError, SpeechRecognizer, SpeechSynthesizer,
    Translator, Transliterator,
};
pub use errors::PipelineError;
pub use language::SourceLanguage;
pub use request::{TranslateRequestBody, TranslationRequest};
pub use result::{BroadcastMessage, ErrorBody, TranslateResponseBody, TranslationResult};
