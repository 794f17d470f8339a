//! Transliteration via the Input Tools `request` endpoint.

use std::time::Duration;

use parley_core::{EngineError, Transliterator};
use reqwest::blocking::Client;
use serde_json::Value;

use crate::http;

/// Google Input Tools client: romanized text in, native script out.
pub struct InputToolsTransliterator {
    client: Client,
    url: String,
}

impl InputToolsTransliterator {
    /// Create a transliterator for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        Ok(Self {
            client: http::client(timeout)?,
            url: http::endpoint(base_url, "request"),
        })
    }
}

/// Input method code for a language, e.g. `hi-t-i0-und`.
fn input_tool(language: &str) -> String {
    let primary = language.split(['-', '_']).next().unwrap_or(language);
    format!("{}-t-i0-und", primary.to_ascii_lowercase())
}

/// Pick the first candidate for every word.
///
/// The body looks like `["SUCCESS",[["namaste",["नमस्ते",..],..],..]]`. A word
/// without candidates keeps its input spelling.
fn parse_candidates(body: &Value) -> Result<String, EngineError> {
    let status = body.get(0).and_then(Value::as_str).unwrap_or_default();
    if status != "SUCCESS" {
        return Err(EngineError::Rejected(format!(
            "input tools status {}",
            if status.is_empty() { "missing" } else { status }
        )));
    }

    let words = body
        .get(1)
        .and_then(Value::as_array)
        .ok_or_else(|| EngineError::InvalidResponse("missing candidate list".into()))?;

    let picked: Vec<&str> = words
        .iter()
        .filter_map(|entry| {
            entry
                .get(1)
                .and_then(|c| c.get(0))
                .and_then(Value::as_str)
                .or_else(|| entry.get(0).and_then(Value::as_str))
        })
        .collect();

    if picked.is_empty() {
        return Err(EngineError::InvalidResponse("no candidates".into()));
    }
    Ok(picked.join(" "))
}

impl Transliterator for InputToolsTransliterator {
    fn transliterate(&self, text: &str, language: &str) -> Result<String, EngineError> {
        let itc = input_tool(language);
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("text", text),
                ("itc", itc.as_str()),
                ("num", "1"),
                ("cp", "0"),
                ("cs", "1"),
                ("ie", "utf-8"),
                ("oe", "utf-8"),
            ])
            .send()
            .map_err(|e| http::transport_error(&e))?;

        let body: Value = http::check_status(response)?
            .json()
            .map_err(|e| EngineError::InvalidResponse(format!("input tools body: {e}")))?;
        parse_candidates(&body)
    }
}
