//! Brushing texture: white noise shaped by the product of a slow stroke sine
//! and a faster bristle sine, fading out exponentially over the buffer.

use std::f64::consts::TAU;

use rand::Rng;

use crate::buffer::RawAudioBuffer;

use super::sample_count;

/// Stroke rate in Hz.
const STROKE_HZ: f64 = 1.0;

/// Bristle rate in Hz.
const BRISTLE_HZ: f64 = 4.0;

/// Scale applied to the raw white noise.
const NOISE_SCALE: f32 = 0.3;

/// Exponential decay rate per second.
const DECAY_PER_SEC: f64 = 0.5;

/// Final output gain, keeps the texture well clear of clipping in the mix.
const OUTPUT_GAIN: f32 = 0.4;

/// Amplitude-modulated noise synthesizer.
pub struct RhythmicTexture;

impl RhythmicTexture {
    /// Generate `duration_secs` of brushing texture using the thread RNG.
    #[must_use]
    pub fn generate(duration_secs: f32, sample_rate: u32) -> RawAudioBuffer {
        Self::generate_with(&mut rand::thread_rng(), duration_secs, sample_rate)
    }

    /// Generate the texture drawing white noise from `rng`.
    pub fn generate_with<R: Rng + ?Sized>(
        rng: &mut R,
        duration_secs: f32,
        sample_rate: u32,
    ) -> RawAudioBuffer {
        let len = sample_count(duration_secs, sample_rate);
        let rate = f64::from(sample_rate.max(1));

        let samples = (0..len)
            .map(|i| {
                let t = i as f64 / rate;
                let pattern = (t * TAU * STROKE_HZ).sin() * (t * TAU * BRISTLE_HZ).sin();
                let envelope = (-t * DECAY_PER_SEC).exp();
                let noise = rng.gen_range(-1.0f32..1.0) * NOISE_SCALE;
                noise * (pattern * envelope) as f32 * OUTPUT_GAIN
            })
            .collect();

        tracing::trace!(len, sample_rate, "Generated rhythmic texture");
        RawAudioBuffer::mono(samples, sample_rate)
    }
}
