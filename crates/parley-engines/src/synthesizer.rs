//! Speech synthesis via the public `translate_tts` endpoint.

use std::time::Duration;

use parley_core::language::DEFAULT_LANGUAGE;
use parley_core::{EngineError, SpeechSynthesizer};
use reqwest::blocking::Client;

use crate::http;

/// Longest text the endpoint accepts per request, in characters.
pub const MAX_CHUNK_CHARS: usize = 100;

/// Google web TTS client. Produces MP3.
pub struct GoogleSpeech {
    client: Client,
    url: String,
}

impl GoogleSpeech {
    /// Create a synthesizer for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        Ok(Self {
            client: http::client(timeout)?,
            url: http::endpoint(base_url, "translate_tts"),
        })
    }

    fn fetch_chunk(
        &self,
        chunk: &str,
        language: &str,
        idx: usize,
        total: usize,
    ) -> Result<Vec<u8>, EngineError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[
                ("ie", "UTF-8".to_string()),
                ("client", "tw-ob".to_string()),
                ("tl", language.to_string()),
                ("q", chunk.to_string()),
                ("total", total.to_string()),
                ("idx", idx.to_string()),
                ("textlen", chunk.chars().count().to_string()),
            ])
            .send()
            .map_err(|e| http::transport_error(&e))?;

        let bytes = http::check_status(response)?
            .bytes()
            .map_err(|e| http::transport_error(&e))?;
        if bytes.is_empty() {
            return Err(EngineError::InvalidResponse(format!(
                "empty audio for chunk {idx}"
            )));
        }
        Ok(bytes.to_vec())
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Words are packed greedily; a single word longer than the limit is cut at
/// character boundaries.
pub fn split_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            chunks.extend(chars.chunks(max_chars).map(|c| c.iter().collect::<String>()));
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

impl SpeechSynthesizer for GoogleSpeech {
    fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>, EngineError> {
        let language = if language.trim().is_empty() { DEFAULT_LANGUAGE } else { language };
        let chunks = split_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(EngineError::Rejected("no text to speak".into()));
        }

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            audio.extend(self.fetch_chunk(chunk, language, idx, chunks.len())?);
        }
        Ok(audio)
    }
}
