//! Pink noise via a six-pole filter bank on white noise (Paul Kellet's
//! refined method). The coefficients set the perceived character of the
//! rain texture and must not be retuned.

use rand::Rng;

use crate::buffer::RawAudioBuffer;

use super::sample_count;

/// Output scale applied to the summed filter taps.
const OUTPUT_GAIN: f32 = 0.11;

/// Pink noise synthesizer.
pub struct PinkNoise;

impl PinkNoise {
    /// Generate `duration_secs` of pink noise using the thread RNG.
    #[must_use]
    pub fn generate(duration_secs: f32, sample_rate: u32) -> RawAudioBuffer {
        Self::generate_with(&mut rand::thread_rng(), duration_secs, sample_rate)
    }

    /// Generate pink noise drawing white noise from `rng`.
    pub fn generate_with<R: Rng + ?Sized>(
        rng: &mut R,
        duration_secs: f32,
        sample_rate: u32,
    ) -> RawAudioBuffer {
        let len = sample_count(duration_secs, sample_rate);
        let mut filter = KelletFilter::default();
        let samples = (0..len)
            .map(|_| filter.next(rng.gen_range(-1.0f32..1.0)))
            .collect();

        tracing::trace!(len, sample_rate, "Generated pink noise");
        RawAudioBuffer::mono(samples, sample_rate)
    }
}

/// Filter state carried across samples.
#[derive(Debug, Default)]
struct KelletFilter {
    b: [f32; 7],
}

impl KelletFilter {
    fn next(&mut self, white: f32) -> f32 {
        let b = &mut self.b;
        b[0] = 0.99886 * b[0] + white * 0.055_517_9;
        b[1] = 0.99332 * b[1] + white * 0.075_075_9;
        b[2] = 0.96900 * b[2] + white * 0.153_852;
        b[3] = 0.86650 * b[3] + white * 0.310_485_6;
        b[4] = 0.55000 * b[4] + white * 0.532_952_2;
        b[5] = -0.7616 * b[5] - white * 0.016_898;
        let out = (b[0] + b[1] + b[2] + b[3] + b[4] + b[5] + b[6] + white * 0.5362) * OUTPUT_GAIN;
        // b6 feeds the next sample, not this one.
        b[6] = white * 0.115_926;
        out.clamp(-1.0, 1.0)
    }
}
