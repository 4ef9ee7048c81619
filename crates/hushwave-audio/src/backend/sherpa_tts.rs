//! Sherpa-ONNX Kokoro backend, via `sherpa-rs`.
//!
//! `KokoroTts::create` takes `&mut self`, so the engine sits behind an
//! `Arc<Mutex<…>>` and every synthesis runs on a blocking thread.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sherpa_rs::tts::{KokoroTts, KokoroTtsConfig};

use crate::backend::{ModelLoader, ProgressFn, TtsAudio, TtsBackend, VoiceInfo, kokoro_voices};
use crate::error::AudioError;
use crate::models;

/// Kokoro output sample rate.
pub const SHERPA_TTS_SAMPLE_RATE: u32 = 24_000;

/// Sherpa-ONNX Kokoro TTS backend.
pub struct SherpaTtsBackend {
    engine: Arc<Mutex<KokoroTts>>,
    speed: f32,
}

impl SherpaTtsBackend {
    /// Load the model from an extracted `kokoro-en-v0_19` directory.
    ///
    /// The directory must contain `model.onnx`, `voices.bin`, `tokens.txt`
    /// and `espeak-ng-data/`.
    pub fn load(model_dir: &Path, speed: f32) -> Result<Self, AudioError> {
        if !model_dir.exists() {
            return Err(AudioError::ModelNotFound(model_dir.to_path_buf()));
        }

        let model_path = model_dir.join("model.onnx");
        let voices_path = model_dir.join("voices.bin");
        let tokens_path = model_dir.join("tokens.txt");
        let data_dir = model_dir.join("espeak-ng-data");

        for path in [&model_path, &voices_path, &tokens_path] {
            if !path.exists() {
                return Err(AudioError::ModelNotFound(path.clone()));
            }
        }

        tracing::info!(dir = %model_dir.display(), speed, "Loading Kokoro TTS model");

        let config = KokoroTtsConfig {
            model: path_to_string(&model_path)?,
            voices: path_to_string(&voices_path)?,
            tokens: path_to_string(&tokens_path)?,
            data_dir: path_to_string(&data_dir)?,
            length_scale: speed,
            ..Default::default()
        };

        let engine = KokoroTts::new(config);
        tracing::info!("Kokoro TTS model loaded");

        Ok(Self {
            engine: Arc::new(Mutex::new(engine)),
            speed,
        })
    }
}

#[async_trait::async_trait]
impl TtsBackend for SherpaTtsBackend {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<TtsAudio, AudioError> {
        if text.trim().is_empty() {
            return Ok(TtsAudio {
                samples: Vec::new(),
                sample_rate: SHERPA_TTS_SAMPLE_RATE,
                duration: Duration::ZERO,
            });
        }

        let sid = voice_id_to_speaker_id(voice_id);
        tracing::debug!(text_len = text.len(), voice = %voice_id, sid, "Synthesizing chunk");

        let engine = Arc::clone(&self.engine);
        let speed = self.speed;
        let text = text.to_string();

        let audio = tokio::task::spawn_blocking(move || {
            engine
                .lock()
                .map_err(|e| AudioError::Generation(format!("TTS engine lock poisoned: {e}")))
                .and_then(|mut guard| {
                    guard
                        .create(&text, sid, speed)
                        .map_err(|e| AudioError::Generation(e.to_string()))
                })
        })
        .await
        .map_err(|e| AudioError::Generation(format!("spawn_blocking join error: {e}")))??;

        let sample_rate = audio.sample_rate;
        let duration = if sample_rate > 0 {
            Duration::from_secs_f64(audio.samples.len() as f64 / f64::from(sample_rate))
        } else {
            Duration::ZERO
        };

        Ok(TtsAudio {
            samples: audio.samples,
            sample_rate,
            duration,
        })
    }

    fn sample_rate(&self) -> u32 {
        SHERPA_TTS_SAMPLE_RATE
    }

    fn available_voices(&self) -> Vec<VoiceInfo> {
        kokoro_voices()
    }
}

/// Map a voice id to the speaker index in the model's `voices.bin`.
///
/// Unknown ids fall back to speaker 0.
fn voice_id_to_speaker_id(voice_id: &str) -> i32 {
    match voice_id {
        "af" => 0,
        "af_bella" => 1,
        "af_nicole" => 2,
        "af_sarah" => 3,
        "af_sky" => 4,
        "am_adam" => 5,
        "am_michael" => 6,
        "bf_emma" => 7,
        "bf_isabella" => 8,
        "bm_george" => 9,
        "bm_lewis" => 10,
        _ => {
            tracing::warn!(voice = %voice_id, "Unknown Kokoro voice, using speaker 0");
            0
        }
    }
}

fn path_to_string(path: &Path) -> Result<String, AudioError> {
    path.to_str()
        .map(ToString::to_string)
        .ok_or_else(|| AudioError::ModelLoad(format!("Invalid path: {}", path.display())))
}

// ── Loader ─────────────────────────────────────────────────────────

/// Downloads the Kokoro model into `models_dir` if needed, then loads it.
pub struct SherpaModelLoader {
    models_dir: PathBuf,
    speed: f32,
}

impl SherpaModelLoader {
    #[must_use]
    pub const fn new(models_dir: PathBuf) -> Self {
        Self {
            models_dir,
            speed: 1.0,
        }
    }
}

#[async_trait::async_trait]
impl ModelLoader for SherpaModelLoader {
    async fn load(&self, on_progress: ProgressFn<'_>) -> Result<Box<dyn TtsBackend>, AudioError> {
        let dir = models::ensure_tts_model(&self.models_dir, on_progress).await?;
        let speed = self.speed;
        let backend = tokio::task::spawn_blocking(move || SherpaTtsBackend::load(&dir, speed))
            .await
            .map_err(|e| AudioError::ModelLoad(format!("spawn_blocking join error: {e}")))??;
        Ok(Box::new(backend))
    }
}
