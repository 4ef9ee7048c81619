//! Ambient texture mixer.
//!
//! Each catalog sound gets its own looping channel (its gain stage) on the
//! shared output. A source is rendered and opened on the first toggle and
//! released on the next; at most one live channel exists per id.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use crate::audio_io::{AudioOutput, ChannelId, ChannelOptions, Clip};
use crate::catalog::{SoundCatalog, TEXTURE_SAMPLE_RATE};
use crate::error::AudioError;

/// Listener-visible state of one ambient sound.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundSource {
    pub id: String,
    pub display_name: String,
    pub is_playing: bool,
    /// Gain in [0, 1].
    pub volume: f32,
}

/// Owns the ambient sound sources and their live channels.
pub struct AudioMixer {
    output: Arc<dyn AudioOutput>,
    catalog: SoundCatalog,
    sources: Vec<SoundSource>,
    live: HashMap<String, ChannelId>,
    last_error: Option<String>,
}

impl AudioMixer {
    /// Create a mixer over `output` with one stopped source per catalog entry.
    pub fn new(output: Arc<dyn AudioOutput>, catalog: SoundCatalog) -> Self {
        let sources = catalog
            .iter()
            .map(|spec| SoundSource {
                id: spec.id.clone(),
                display_name: spec.display_name.clone(),
                is_playing: false,
                volume: spec.default_volume,
            })
            .collect();

        Self {
            output,
            catalog,
            sources,
            live: HashMap::new(),
            last_error: None,
        }
    }

    /// Start the sound if it is stopped, stop it if it is playing.
    ///
    /// Returns whether the sound is playing afterwards. A device failure
    /// releases every live channel and marks all sources stopped.
    pub fn toggle(&mut self, id: &str) -> Result<bool, AudioError> {
        self.last_error = None;
        let Some(index) = self.sources.iter().position(|s| s.id == id) else {
            let err = AudioError::UnknownSound(id.to_string());
            self.last_error = Some(err.to_string());
            return Err(err);
        };

        if let Some(channel) = self.live.remove(id) {
            self.output.close(channel);
            self.sources[index].is_playing = false;
            tracing::info!(sound = %id, "Stopped ambient sound");
            return Ok(false);
        }

        match self.start(index) {
            Ok(channel) => {
                self.live.insert(id.to_string(), channel);
                self.sources[index].is_playing = true;
                tracing::info!(sound = %id, volume = self.sources[index].volume, "Started ambient sound");
                Ok(true)
            }
            Err(err) => Err(self.fail(err)),
        }
    }

    fn start(&self, index: usize) -> Result<ChannelId, AudioError> {
        let source = &self.sources[index];
        let spec = self
            .catalog
            .get(&source.id)
            .ok_or_else(|| AudioError::UnknownSound(source.id.clone()))?;

        let buffer = spec.kind.render(spec.loop_secs, TEXTURE_SAMPLE_RATE);
        self.output.open(
            Clip::Pcm(buffer),
            ChannelOptions {
                volume: source.volume,
                looped: true,
                start_paused: false,
            },
        )
    }

    /// Set a source's gain, clamped into [0, 1]. A live channel is updated
    /// in place.
    pub fn set_volume(&mut self, id: &str, volume: f32) -> Result<f32, AudioError> {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        let Some(source) = self.sources.iter_mut().find(|s| s.id == id) else {
            let err = AudioError::UnknownSound(id.to_string());
            self.last_error = Some(err.to_string());
            return Err(err);
        };
        source.volume = volume;

        if let Some(&channel) = self.live.get(id) {
            if let Err(err) = self.output.set_volume(channel, volume) {
                return Err(self.fail(err));
            }
        }
        tracing::debug!(sound = %id, volume, "Ambient volume changed");
        Ok(volume)
    }

    /// Stop and release every live source. Calling it again does nothing.
    pub fn stop_all(&mut self) {
        for (id, channel) in self.live.drain() {
            self.output.close(channel);
            tracing::debug!(sound = %id, "Released ambient channel");
        }
        for source in &mut self.sources {
            source.is_playing = false;
        }
    }

    /// Record an error; device failures tear every source down.
    fn fail(&mut self, err: AudioError) -> AudioError {
        if err.is_device_failure() {
            tracing::warn!(error = %err, "Output device failed, stopping all ambient sounds");
            self.stop_all();
        }
        self.last_error = Some(err.to_string());
        err
    }

    #[must_use]
    pub fn sources(&self) -> &[SoundSource] {
        &self.sources
    }

    #[must_use]
    pub fn source(&self, id: &str) -> Option<&SoundSource> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Number of sources holding a live channel.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Message of the most recent failed operation, cleared by the next toggle.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

impl Drop for AudioMixer {
    fn drop(&mut self) {
        self.stop_all();
    }
}
