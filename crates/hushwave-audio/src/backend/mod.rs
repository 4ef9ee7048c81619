//! Speech engine backend traits.
//!
//! The [`SpeechOrchestrator`](crate::speech::SpeechOrchestrator) only sees
//! trait objects: a [`ModelLoader`] that produces a ready [`TtsBackend`]
//! once, and the backend itself for every request. Tests inject mocks here;
//! the `sherpa` feature provides the real Kokoro engine.
//!
//! ## Backend implementations
//!
//! | Feature  | Module          | Engine |
//! |----------|-----------------|--------|
//! | `sherpa` | [`sherpa_tts`]  | Kokoro v0.19 via sherpa-onnx |

#[cfg(feature = "sherpa")]
pub mod sherpa_tts;

use std::time::Duration;

use crate::error::AudioError;

// ── Shared types ───────────────────────────────────────────────────

/// Audio produced by one synthesis call.
#[derive(Debug, Clone)]
pub struct TtsAudio {
    /// PCM f32 samples, mono.
    pub samples: Vec<f32>,

    /// Sample rate of the audio; 0 means "not reported".
    pub sample_rate: u32,

    pub duration: Duration,
}

/// Information about an available TTS voice.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    /// Voice identifier passed to [`TtsBackend::synthesize`].
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    /// Language/accent category.
    pub category: String,

    pub gender: VoiceGender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VoiceGender {
    Female,
    Male,
}

/// Progress callback: `(bytes_done, bytes_total)`.
pub type ProgressFn<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

// ── TTS Backend Trait ──────────────────────────────────────────────

/// Backend-agnostic text-to-speech engine.
///
/// Implementations must be `Send + Sync`; the orchestrator shares one loaded
/// backend behind an `Arc` across requests.
#[async_trait::async_trait]
pub trait TtsBackend: Send + Sync {
    /// Synthesize one chunk of text (a sentence or short paragraph) with the
    /// given voice. Chunking is the caller's job.
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<TtsAudio, AudioError>;

    /// Output sample rate (Hz), 0 if the engine does not know.
    fn sample_rate(&self) -> u32;

    fn available_voices(&self) -> Vec<VoiceInfo>;
}

// ── Model loader ───────────────────────────────────────────────────

/// Produces a ready backend, fetching model files first if needed.
///
/// Called at most once per successful initialization; a failed load may be
/// retried by calling it again.
#[async_trait::async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self, on_progress: ProgressFn<'_>) -> Result<Box<dyn TtsBackend>, AudioError>;
}

// ── Voice catalogue ────────────────────────────────────────────────

/// Convenience constructor for [`VoiceInfo`].
pub(crate) fn voice_info(id: &str, name: &str, category: &str, gender: VoiceGender) -> VoiceInfo {
    VoiceInfo {
        id: id.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        gender,
    }
}

/// The 11 voices of the `kokoro-en-v0_19` model.
///
/// Free function so voices can be listed before the model is downloaded.
#[must_use]
pub fn kokoro_voices() -> Vec<VoiceInfo> {
    const US: &str = "American English";
    const UK: &str = "British English";
    vec![
        voice_info("af", "Default", US, VoiceGender::Female),
        voice_info("af_bella", "Bella", US, VoiceGender::Female),
        voice_info("af_nicole", "Nicole", US, VoiceGender::Female),
        voice_info("af_sarah", "Sarah", US, VoiceGender::Female),
        voice_info("af_sky", "Sky", US, VoiceGender::Female),
        voice_info("am_adam", "Adam", US, VoiceGender::Male),
        voice_info("am_michael", "Michael", US, VoiceGender::Male),
        voice_info("bf_emma", "Emma", UK, VoiceGender::Female),
        voice_info("bf_isabella", "Isabella", UK, VoiceGender::Female),
        voice_info("bm_george", "George", UK, VoiceGender::Male),
        voice_info("bm_lewis", "Lewis", UK, VoiceGender::Male),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_contains_every_mapped_voice() {
        let ids: Vec<String> = kokoro_voices().into_iter().map(|v| v.id).collect();
        for id in ["af_bella", "am_adam", "af_sarah"] {
            assert!(ids.iter().any(|v| v == id), "{id} missing");
        }
        assert_eq!(ids.len(), 11);
    }

    #[test]
    fn voice_info_serializes_camel_case() {
        let json = serde_json::to_value(voice_info("am_adam", "Adam", "US", VoiceGender::Male))
            .unwrap();
        assert_eq!(json["gender"], "male");
        assert_eq!(json["id"], "am_adam");
    }
}
