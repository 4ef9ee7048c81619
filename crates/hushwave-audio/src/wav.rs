//! Canonical 16-bit mono PCM WAV encoding.
//!
//! The encoder writes exactly one `fmt ` and one `data` chunk after the RIFF
//! header, so an encoded asset is always `44 + 2 * samples` bytes. Output is
//! byte-for-byte deterministic for a given buffer.

use std::sync::Arc;

use crate::buffer::RawAudioBuffer;
use crate::error::AudioError;

/// MIME type of every encoded asset.
pub const MIME_TYPE: &str = "audio/wav";

/// Size of the canonical header in bytes.
pub const HEADER_LEN: usize = 44;

/// Most samples one file can hold: the RIFF size field is a `u32`
/// counting the 36 header bytes after it plus two bytes per sample.
pub const MAX_SAMPLES: usize = ((u32::MAX - 36) / 2) as usize;

const BITS_PER_SAMPLE: u16 = 16;
const PCM_FORMAT: u16 = 1;

/// An immutable, playable WAV file held in memory.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedAudioAsset {
    bytes: Arc<[u8]>,
    source_sample_rate: u32,
    duration_secs: f64,
}

impl EncodedAudioAsset {
    /// The complete WAV file.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the file bytes, for handing to the output device.
    #[must_use]
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    #[must_use]
    pub const fn mime_type(&self) -> &'static str {
        MIME_TYPE
    }

    #[must_use]
    pub const fn source_sample_rate(&self) -> u32 {
        self.source_sample_rate
    }

    #[must_use]
    pub const fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Write the file to disk.
    pub fn save(&self, path: &std::path::Path) -> Result<(), AudioError> {
        std::fs::write(path, &self.bytes)?;
        tracing::debug!(path = %path.display(), bytes = self.bytes.len(), "Saved WAV asset");
        Ok(())
    }
}

/// Encode a mono buffer as a 16-bit PCM WAV file.
#[must_use]
pub fn encode(buffer: &RawAudioBuffer) -> EncodedAudioAsset {
    let channels = buffer.channels().max(1);
    let sample_rate = buffer.sample_rate();
    let samples = capped(buffer.samples());

    let data_len = samples.len() * 2;
    let data_size = u32::try_from(data_len).unwrap_or(u32::MAX - 36);
    let block_align = channels * (BITS_PER_SAMPLE / 8);
    let byte_rate = sample_rate * u32::from(block_align);

    let mut out = Vec::with_capacity(HEADER_LEN + data_len);

    // RIFF header
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_size).to_le_bytes());
    out.extend_from_slice(b"WAVE");

    // fmt chunk
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&PCM_FORMAT.to_le_bytes());
    out.extend_from_slice(&channels.to_le_bytes());
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&BITS_PER_SAMPLE.to_le_bytes());

    // data chunk
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_size.to_le_bytes());
    for &sample in samples {
        out.extend_from_slice(&to_pcm16(sample).to_le_bytes());
    }

    tracing::trace!(sample_rate, samples = samples.len(), "Encoded WAV");

    EncodedAudioAsset {
        bytes: out.into(),
        source_sample_rate: sample_rate,
        duration_secs: (samples.len() / usize::from(channels)) as f64 / f64::from(sample_rate),
    }
}

/// The leading part of `samples` that fits in one file.
fn capped(samples: &[f32]) -> &[f32] {
    if samples.len() > MAX_SAMPLES {
        tracing::warn!(
            samples = samples.len(),
            kept = MAX_SAMPLES,
            "Buffer exceeds the WAV size limit, truncating"
        );
        &samples[..MAX_SAMPLES]
    } else {
        samples
    }
}

/// Convert one float sample to PCM16.
///
/// Negative values scale by 0x8000 and non-negative ones by 0x7FFF so both
/// rails are reachable; the result is truncated toward zero.
fn to_pcm16(sample: f32) -> i16 {
    let s = if sample.is_nan() { 0.0 } else { sample.clamp(-1.0, 1.0) };
    if s < 0.0 {
        (s * 32_768.0) as i16
    } else {
        (s * 32_767.0) as i16
    }
}

// ── Header probe ───────────────────────────────────────────────────

/// Stream parameters read back from a WAV header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// Length of the `data` chunk in bytes.
    pub data_len: u32,
}

impl WavInfo {
    /// Playback length in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        let frame_bytes = u32::from(self.channels) * u32::from(self.bits_per_sample / 8);
        if frame_bytes == 0 || self.sample_rate == 0 {
            return 0.0;
        }
        f64::from(self.data_len / frame_bytes) / f64::from(self.sample_rate)
    }
}

/// Parse the header of a PCM WAV file.
///
/// Walks the chunk list, so files with extra chunks before `data` are
/// accepted as long as a `fmt ` chunk comes first.
pub fn probe(bytes: &[u8]) -> Result<WavInfo, AudioError> {
    if bytes.len() < 12 || &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" {
        return Err(AudioError::InvalidWav("missing RIFF/WAVE header".into()));
    }

    let mut format: Option<(u16, u16, u32, u16)> = None;
    let mut offset = 12;

    while offset + 8 <= bytes.len() {
        let id = &bytes[offset..offset + 4];
        let size = read_u32(bytes, offset + 4)?;
        let body = offset + 8;

        match id {
            b"fmt " => {
                if size < 16 || body + 16 > bytes.len() {
                    return Err(AudioError::InvalidWav("truncated fmt chunk".into()));
                }
                let audio_format = read_u16(bytes, body)?;
                let channels = read_u16(bytes, body + 2)?;
                let sample_rate = read_u32(bytes, body + 4)?;
                let bits = read_u16(bytes, body + 14)?;
                format = Some((audio_format, channels, sample_rate, bits));
            }
            b"data" => {
                let Some((audio_format, channels, sample_rate, bits_per_sample)) = format else {
                    return Err(AudioError::InvalidWav("data chunk before fmt chunk".into()));
                };
                if audio_format != PCM_FORMAT {
                    return Err(AudioError::InvalidWav(format!(
                        "unsupported audio format {audio_format}"
                    )));
                }
                if channels == 0 || sample_rate == 0 {
                    return Err(AudioError::InvalidWav("zero channels or sample rate".into()));
                }
                let available = u32::try_from(bytes.len() - body).unwrap_or(u32::MAX);
                return Ok(WavInfo {
                    sample_rate,
                    channels,
                    bits_per_sample,
                    data_len: size.min(available),
                });
            }
            _ => {}
        }

        // Chunks are word aligned.
        offset = body + size as usize + (size as usize & 1);
    }

    Err(AudioError::InvalidWav("no data chunk".into()))
}

fn read_u16(bytes: &[u8], at: usize) -> Result<u16, AudioError> {
    bytes
        .get(at..at + 2)
        .and_then(|b| b.try_into().ok())
        .map(u16::from_le_bytes)
        .ok_or_else(|| AudioError::InvalidWav(format!("unexpected end of header at {at}")))
}

fn read_u32(bytes: &[u8], at: usize) -> Result<u32, AudioError> {
    bytes
        .get(at..at + 4)
        .and_then(|b| b.try_into().ok())
        .map(u32::from_le_bytes)
        .ok_or_else(|| AudioError::InvalidWav(format!("unexpected end of header at {at}")))
}
