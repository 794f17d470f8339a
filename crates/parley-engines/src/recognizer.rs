//! Speech recognition over a `/transcribe` HTTP service.

use std::time::Duration;

use parley_core::{
    EngineError, Recognition, RecognitionError, SourceLanguage, SpeechRecognizer,
    audio::WAV_MIME,
};
use reqwest::blocking::{Client, multipart};
use serde::Deserialize;
use tracing::debug;

use crate::http;
use crate::wav;

#[derive(Debug, Default, Deserialize)]
struct TranscribeResponse {
    #[serde(default)]
    text: String,
}

/// Posts WAV audio as multipart field `audio` to `{base_url}/transcribe`.
pub struct HttpRecognizer {
    client: Client,
    url: String,
}

impl HttpRecognizer {
    /// Create a recognizer for the service at `base_url`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EngineError> {
        Ok(Self {
            client: http::client(timeout)?,
            url: http::endpoint(base_url, "transcribe"),
        })
    }

    fn post(&self, audio: &[u8], language: &SourceLanguage) -> Result<String, EngineError> {
        let part = multipart::Part::bytes(audio.to_vec())
            .file_name("audio.wav")
            .mime_str(WAV_MIME)
            .map_err(|e| EngineError::InvalidResponse(format!("multipart: {e}")))?;

        let mut form = multipart::Form::new().part("audio", part);
        if let Some(code) = language.code() {
            form = form.text("language", code.to_string());
        }

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .map_err(|e| http::transport_error(&e))?;

        let body: TranscribeResponse = http::check_status(response)?
            .json()
            .map_err(|e| EngineError::InvalidResponse(format!("transcription body: {e}")))?;
        Ok(body.text)
    }
}

fn classify(err: EngineError) -> RecognitionError {
    match err {
        EngineError::Unavailable(msg) | EngineError::Rejected(msg) => {
            RecognitionError::Service(msg)
        }
        EngineError::InvalidResponse(msg) => RecognitionError::Internal(msg),
    }
}

impl SpeechRecognizer for HttpRecognizer {
    fn recognize(
        &self,
        audio: &[u8],
        language: &SourceLanguage,
    ) -> Result<Recognition, RecognitionError> {
        let info = wav::inspect_wav(audio).map_err(RecognitionError::Internal)?;
        if info.is_silent_container() {
            return Ok(Recognition::NoSpeech);
        }
        debug!(
            sample_rate = info.sample_rate,
            channels = info.channels,
            %language,
            "sending audio for transcription"
        );

        let text = self.post(audio, language).map_err(classify)?;
        Ok(Recognition::from_text(text))
    }
}
