//! Playback transport for an encoded speech asset.
//!
//! ```text
//! Stopped ──play──► Playing ──pause──► Paused ──play──► Playing
//!                      │
//!                      └──(clip drained, seen by tick)──► Ended ──play──► Playing (from 0)
//! ```
//!
//! The controller owns one channel on the shared output. Loading a new asset
//! releases the previous channel first. Position is reported by polling
//! [`PlaybackController::tick`].

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::audio_io::{AudioOutput, ChannelId, ChannelOptions, Clip};
use crate::error::AudioError;
use crate::wav::{self, EncodedAudioAsset};

/// Transport state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportState {
    Stopped,
    Playing,
    Paused,
    /// Played to the end; `play` restarts from the beginning.
    Ended,
}

/// Notifications emitted by the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// The loaded asset's header has been read; `duration` is now valid.
    MetadataReady { duration_secs: f64 },
    StateChanged(TransportState),
}

/// Listener-visible transport state.
#[derive(Debug, Clone, Default)]
pub struct PlaybackSession {
    pub asset: Option<Arc<EncodedAudioAsset>>,
    pub is_playing: bool,
    /// Seconds, always within `[0, duration]`.
    pub current_time: f64,
    /// Seconds, 0 until metadata is ready.
    pub duration: f64,
    /// Gain in [0, 1].
    pub volume: f32,
}

/// Play/pause/seek/volume around one encoded asset.
pub struct PlaybackController {
    output: Arc<dyn AudioOutput>,
    session: PlaybackSession,
    state: TransportState,
    channel: Option<ChannelId>,
    metadata_ready: bool,
    event_tx: mpsc::UnboundedSender<PlaybackEvent>,
}

impl PlaybackController {
    /// Create an empty controller and the receiver for its events.
    pub fn new(
        output: Arc<dyn AudioOutput>,
        volume: f32,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let controller = Self {
            output,
            session: PlaybackSession {
                volume: clamp_unit(volume),
                ..PlaybackSession::default()
            },
            state: TransportState::Stopped,
            channel: None,
            metadata_ready: false,
            event_tx,
        };
        (controller, event_rx)
    }

    // ── Accessors ──────────────────────────────────────────────────

    #[must_use]
    pub const fn session(&self) -> &PlaybackSession {
        &self.session
    }

    #[must_use]
    pub const fn state(&self) -> TransportState {
        self.state
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.session.is_playing
    }

    #[must_use]
    pub const fn current_time(&self) -> f64 {
        self.session.current_time
    }

    #[must_use]
    pub const fn duration(&self) -> f64 {
        self.session.duration
    }

    #[must_use]
    pub const fn volume(&self) -> f32 {
        self.session.volume
    }

    /// Whether the loaded asset's duration is known.
    #[must_use]
    pub const fn metadata_ready(&self) -> bool {
        self.metadata_ready
    }

    #[must_use]
    pub fn asset(&self) -> Option<&Arc<EncodedAudioAsset>> {
        self.session.asset.as_ref()
    }

    // ── Transport ──────────────────────────────────────────────────

    /// Replace the loaded asset.
    ///
    /// The previous channel is released and the position reset to 0, paused.
    /// If the asset's header cannot be read or its channel cannot be opened,
    /// the previous asset, channel and position stay exactly as they were.
    pub fn load(&mut self, asset: Arc<EncodedAudioAsset>) -> Result<(), AudioError> {
        let info = wav::probe(asset.bytes())?;
        let channel = self.open_channel(Arc::clone(&asset), 0.0)?;

        self.release_channel();
        self.channel = Some(channel);
        self.session.asset = Some(asset);
        self.session.is_playing = false;
        self.session.current_time = 0.0;
        self.session.duration = info.duration_secs();
        self.metadata_ready = true;
        self.set_state(TransportState::Stopped);
        self.emit(PlaybackEvent::MetadataReady {
            duration_secs: self.session.duration,
        });

        tracing::info!(
            duration_secs = self.session.duration,
            sample_rate = info.sample_rate,
            "Loaded speech asset"
        );
        Ok(())
    }

    /// Start or resume playback. Does nothing without an asset.
    pub fn play(&mut self) -> Result<(), AudioError> {
        if self.session.asset.is_none() || self.session.is_playing {
            return Ok(());
        }
        let channel = self.ensure_channel()?;

        if self.state == TransportState::Ended {
            self.session.current_time = 0.0;
            if let Err(err) = self.output.seek(channel, Duration::ZERO) {
                return Err(self.device_failed(err));
            }
        }
        if let Err(err) = self.output.resume(channel) {
            return Err(self.device_failed(err));
        }

        self.session.is_playing = true;
        self.set_state(TransportState::Playing);
        Ok(())
    }

    /// Pause playback. Does nothing without an asset.
    pub fn pause(&mut self) -> Result<(), AudioError> {
        if self.session.asset.is_none() || !self.session.is_playing {
            return Ok(());
        }
        if let Some(channel) = self.channel {
            if let Err(err) = self.output.pause(channel) {
                return Err(self.device_failed(err));
            }
        }
        self.session.is_playing = false;
        self.set_state(TransportState::Paused);
        Ok(())
    }

    /// Move to `fraction` of the duration; `fraction` is clamped to [0, 1].
    pub fn seek(&mut self, fraction: f64) -> Result<(), AudioError> {
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        self.session.current_time = fraction * self.session.duration;

        if self.state == TransportState::Ended {
            self.set_state(TransportState::Paused);
        }

        if let Some(channel) = self.channel {
            let position = Duration::from_secs_f64(self.session.current_time);
            if let Err(err) = self.output.seek(channel, position) {
                return Err(self.device_failed(err));
            }
            // Seeking a drained channel queues the clip again; hold it unless
            // the transport is playing.
            if !self.session.is_playing {
                if let Err(err) = self.output.pause(channel) {
                    return Err(self.device_failed(err));
                }
            }
        }
        tracing::debug!(current_time = self.session.current_time, "Seeked");
        Ok(())
    }

    /// Set the gain, clamped into [0, 1]. Applies immediately in any state.
    pub fn set_volume(&mut self, volume: f32) -> Result<f32, AudioError> {
        let volume = clamp_unit(volume);
        self.session.volume = volume;
        if let Some(channel) = self.channel {
            if let Err(err) = self.output.set_volume(channel, volume) {
                return Err(self.device_failed(err));
            }
        }
        Ok(volume)
    }

    /// Poll the output for the playhead position.
    ///
    /// While playing, `current_time` only moves forward. When the clip has
    /// drained the transport ends with `current_time == duration`.
    pub fn tick(&mut self) -> Result<f64, AudioError> {
        if !self.session.is_playing {
            return Ok(self.session.current_time);
        }
        let Some(channel) = self.channel else {
            return Ok(self.session.current_time);
        };

        let status = match self.output.status(channel) {
            Ok(status) => status,
            Err(err) => return Err(self.device_failed(err)),
        };

        if status.finished {
            self.session.is_playing = false;
            self.session.current_time = self.session.duration;
            self.set_state(TransportState::Ended);
            tracing::debug!("Playback ended");
        } else {
            let position = status.position.as_secs_f64().min(self.session.duration);
            self.session.current_time = self.session.current_time.max(position);
        }
        Ok(self.session.current_time)
    }

    /// Release the channel and forget the asset.
    pub fn unload(&mut self) {
        self.release_channel();
        self.session = PlaybackSession {
            volume: self.session.volume,
            ..PlaybackSession::default()
        };
        self.metadata_ready = false;
        self.set_state(TransportState::Stopped);
    }

    // ── Internals ──────────────────────────────────────────────────

    fn ensure_channel(&mut self) -> Result<ChannelId, AudioError> {
        if let Some(channel) = self.channel {
            return Ok(channel);
        }
        let Some(asset) = self.session.asset.clone() else {
            return Err(AudioError::Device("no asset loaded".into()));
        };
        let channel = self.open_channel(asset, self.session.current_time)?;
        self.channel = Some(channel);
        Ok(channel)
    }

    /// Open a paused, non-looping channel for `asset` positioned at `start`
    /// seconds. Nothing is left open on failure.
    fn open_channel(
        &self,
        asset: Arc<EncodedAudioAsset>,
        start: f64,
    ) -> Result<ChannelId, AudioError> {
        let channel = self.output.open(
            Clip::Wav(asset),
            ChannelOptions {
                volume: self.session.volume,
                looped: false,
                start_paused: true,
            },
        )?;
        if start > 0.0 {
            if let Err(err) = self.output.seek(channel, Duration::from_secs_f64(start)) {
                self.output.close(channel);
                return Err(err);
            }
        }
        Ok(channel)
    }

    fn release_channel(&mut self) {
        if let Some(channel) = self.channel.take() {
            self.output.close(channel);
        }
    }

    /// A device error drops the channel; the asset and position survive so a
    /// later `play` can reopen it.
    fn device_failed(&mut self, err: AudioError) -> AudioError {
        if err.is_device_failure() {
            tracing::warn!(error = %err, "Output device failed during playback");
            self.release_channel();
            self.session.is_playing = false;
            if self.state == TransportState::Playing {
                self.set_state(TransportState::Paused);
            }
        }
        err
    }

    fn set_state(&mut self, state: TransportState) {
        if self.state != state {
            self.state = state;
            self.emit(PlaybackEvent::StateChanged(state));
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        let _ = self.event_tx.send(event);
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.release_channel();
    }
}

fn clamp_unit(v: f32) -> f32 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}
