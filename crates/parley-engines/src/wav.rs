//! WAV container inspection.

use std::io::Cursor;

use symphonia::core::codecs::CODEC_TYPE_NULL;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Stream parameters read from a WAV header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WavInfo {
    /// Samples per second.
    pub sample_rate: u32,
    /// Channel count.
    pub channels: usize,
    /// Frames in the stream, when the header declares them.
    pub frames: Option<u64>,
}

impl WavInfo {
    /// Whether the stream is known to carry no audio at all.
    pub fn is_silent_container(&self) -> bool {
        self.frames == Some(0)
    }
}

/// Probe `data` as a WAV stream without decoding samples.
pub fn inspect_wav(data: &[u8]) -> Result<WavInfo, String> {
    let cursor = Cursor::new(data.to_vec());
    let mss = MediaSourceStream::new(Box::new(cursor), Default::default());

    let mut hint = Hint::new();
    let _ = hint.with_extension("wav");

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| format!("unreadable WAV audio: {e}"))?;

    let track = probed
        .format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| "WAV contains no audio track".to_string())?;

    let params = &track.codec_params;
    Ok(WavInfo {
        sample_rate: params.sample_rate.unwrap_or(0),
        channels: params.channels.map_or(1, |c| c.count()),
        frames: params.n_frames,
    })
}
