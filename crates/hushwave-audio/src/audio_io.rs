//! `AudioOutput` trait abstraction over the shared output sink.
//!
//! The mixer and the playback controller never talk to `rodio` directly. They
//! open *channels* on an [`AudioOutput`] and drive them by id:
//!
//! | Implementor | Where used |
//! |---|---|
//! | [`AudioThreadHandle`](crate::audio_thread::AudioThreadHandle) | CLI, real hardware via the device actor |
//! | hand-written mocks | integration tests, no hardware |
//!
//! The trait is **object-safe** and every method takes `&self`, so a single
//! `Arc<dyn AudioOutput>` can be shared between the mixer and any number of
//! controllers.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::buffer::RawAudioBuffer;
use crate::error::AudioError;
use crate::wav::EncodedAudioAsset;

/// Handle to one open channel on the output sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelId(pub u64);

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch{}", self.0)
    }
}

/// Audio that a channel plays.
#[derive(Debug, Clone)]
pub enum Clip {
    /// Raw float samples (synthesized textures).
    Pcm(RawAudioBuffer),
    /// An encoded WAV file (generated speech).
    Wav(Arc<EncodedAudioAsset>),
}

/// How a channel is opened.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelOptions {
    /// Initial gain (clamped by the implementation).
    pub volume: f32,
    /// Loop the clip forever.
    pub looped: bool,
    /// Open the channel paused at position 0.
    pub start_paused: bool,
}

impl Default for ChannelOptions {
    fn default() -> Self {
        Self {
            volume: 1.0,
            looped: false,
            start_paused: false,
        }
    }
}

/// Snapshot of a channel's progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChannelStatus {
    /// Current playback position.
    pub position: Duration,
    /// The clip has been played to the end (never true for looped channels).
    pub finished: bool,
}

/// The process-wide output sink.
///
/// # Implementations
/// - [`AudioThreadHandle`](crate::audio_thread::AudioThreadHandle) - one
///   `rodio::Sink` per channel, all owned by the audio thread
pub trait AudioOutput: Send + Sync {
    /// Open a channel that plays `clip` through its own gain stage.
    fn open(&self, clip: Clip, options: ChannelOptions) -> Result<ChannelId, AudioError>;

    /// Change the gain of an open channel in place.
    fn set_volume(&self, channel: ChannelId, volume: f32) -> Result<(), AudioError>;

    fn pause(&self, channel: ChannelId) -> Result<(), AudioError>;

    fn resume(&self, channel: ChannelId) -> Result<(), AudioError>;

    /// Move the playhead of an open channel.
    fn seek(&self, channel: ChannelId, position: Duration) -> Result<(), AudioError>;

    fn status(&self, channel: ChannelId) -> Result<ChannelStatus, AudioError>;

    /// Stop the channel and release its resources.
    ///
    /// Closing an unknown or already closed channel is not an error.
    fn close(&self, channel: ChannelId);
}
