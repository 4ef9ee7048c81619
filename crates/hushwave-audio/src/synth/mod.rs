//! Procedural ambient textures.
//!
//! Both synthesizers are pure functions of their inputs plus a random source.
//! The `generate` entry points draw from the thread RNG; the `generate_with`
//! variants accept any [`rand::Rng`] so tests and tools can seed them.

mod noise;
mod rhythmic;

pub use noise::PinkNoise;
pub use rhythmic::RhythmicTexture;

use serde::{Deserialize, Serialize};

use crate::buffer::RawAudioBuffer;
use crate::wav::MAX_SAMPLES;

/// Which synthesizer renders a catalog sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextureKind {
    /// Pink noise (rain).
    PinkNoise,
    /// Amplitude-modulated noise (brushing).
    Rhythmic,
}

impl TextureKind {
    /// Render `duration_secs` of this texture.
    #[must_use]
    pub fn render(self, duration_secs: f32, sample_rate: u32) -> RawAudioBuffer {
        match self {
            Self::PinkNoise => PinkNoise::generate(duration_secs, sample_rate),
            Self::Rhythmic => RhythmicTexture::generate(duration_secs, sample_rate),
        }
    }
}

/// Number of samples in `duration_secs` at `sample_rate`.
///
/// Negative or non-finite durations yield an empty buffer. The count never
/// exceeds what a single WAV file can hold.
pub(crate) fn sample_count(duration_secs: f32, sample_rate: u32) -> usize {
    let duration = f64::from(duration_secs);
    if !duration.is_finite() || duration <= 0.0 {
        return 0;
    }
    let count = (duration * f64::from(sample_rate)).round();
    if count >= MAX_SAMPLES as f64 {
        return MAX_SAMPLES;
    }
    count as usize
}
