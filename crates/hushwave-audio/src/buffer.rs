//! Raw sample buffers passed between synthesizers, the speech model and the
//! encoder.

use std::sync::Arc;
use std::time::Duration;

/// Sample rate assumed when a producer does not report one.
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// Immutable mono `f32` sample buffer tagged with its sample rate.
///
/// Samples are shared behind an `Arc`, so cloning a buffer to hand it to the
/// output device does not copy audio.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAudioBuffer {
    samples: Arc<[f32]>,
    sample_rate: u32,
    channels: u16,
}

impl RawAudioBuffer {
    /// Wrap mono samples. A sample rate of 0 is replaced by
    /// [`DEFAULT_SAMPLE_RATE`].
    #[must_use]
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        let sample_rate = if sample_rate == 0 {
            DEFAULT_SAMPLE_RATE
        } else {
            sample_rate
        };
        Self {
            samples: samples.into(),
            sample_rate,
            channels: 1,
        }
    }

    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    #[must_use]
    pub const fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of samples (across all channels).
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Playback length in seconds.
    #[must_use]
    pub fn duration_secs(&self) -> f64 {
        let frames = self.samples.len() / usize::from(self.channels.max(1));
        frames as f64 / f64::from(self.sample_rate)
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_secs())
    }
}
