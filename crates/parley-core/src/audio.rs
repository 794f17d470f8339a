//! Audio container formats and transport encoding.

use base64::Engine;

/// MIME type of the synthesized audio the shipped synthesizer produces.
pub const MPEG_MIME: &str = "audio/mpeg";

/// MIME type of inbound request audio.
pub const WAV_MIME: &str = "audio/wav";

/// Container formats accepted on the request path. WAV is the only one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioFormat {
    /// RIFF/WAVE, typically PCM16.
    Wav,
}

impl AudioFormat {
    /// Parse a wire tag, case-insensitively. Unknown tags return `None`.
    pub fn parse(tag: &str) -> Option<Self> {
        if tag.trim().eq_ignore_ascii_case("wav") {
            Some(Self::Wav)
        } else {
            None
        }
    }
}

/// Strip a data URI prefix from base64 audio.
///
/// Browsers often send `data:audio/wav;base64,AAAA...`; plain base64 passes through.
pub fn normalize_base64(input: &str) -> &str {
    match input.find(";base64,") {
        Some(idx) => &input[idx + 8..],
        None => input,
    }
}

/// Decode transport base64 into raw bytes. ASCII whitespace is ignored.
pub fn decode_base64(input: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = normalize_base64(input.trim());
    if payload.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        base64::engine::general_purpose::STANDARD.decode(compact)
    } else {
        base64::engine::general_purpose::STANDARD.decode(payload)
    }
}

/// Encode raw bytes for transport.
pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
