//! Engine endpoint settings.

use serde::{Deserialize, Serialize};

/// A remote engine reachable over HTTP.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSettings {
    /// Base URL, without a trailing path.
    pub base_url: String,
}

impl EndpointSettings {
    fn at(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
        }
    }
}

/// Transliteration is optional; when disabled or unreachable the pipeline
/// skips that step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransliterationSettings {
    /// Whether to build a transliterator at startup.
    pub enabled: bool,
    /// Input tools base URL.
    pub base_url: String,
}

impl Default for TransliterationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://inputtools.google.com".to_string(),
        }
    }
}

/// All engine endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineSettings {
    /// Speech recognition service (`POST /transcribe`).
    pub recognition: EndpointSettings,
    /// Translation service.
    pub translation: EndpointSettings,
    /// Speech synthesis service.
    pub synthesis: EndpointSettings,
    /// Transliteration service.
    pub transliteration: TransliterationSettings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            recognition: EndpointSettings::at("http://127.0.0.1:8787"),
            translation: EndpointSettings::at("https://translate.googleapis.com"),
            synthesis: EndpointSettings::at("https://translate.google.com"),
            transliteration: TransliterationSettings::default(),
        }
    }
}
