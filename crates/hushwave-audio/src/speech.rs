//! Speech synthesis orchestration.
//!
//! ```text
//! Uninitialized ──initialize──► Loading ──ok──► Ready ──generate──► Generating
//!       ▲                          │               ▲                    │
//!       └──────────failed──────────┘               └────────────────────┘
//! ```
//!
//! Initialization is single-flight: concurrent callers await the same shared
//! load future and all observe its outcome, success or failure. A failed load
//! leaves the orchestrator `Uninitialized`, so the next call retries.
//!
//! Generations are queued: one runs at a time, in the order they acquired the
//! queue lock. Every request is tagged with a monotonically increasing id so
//! callers can tell stale results apart.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU8, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use hushwave_core::{Preferences, VoiceStyle};
use tokio::sync::mpsc;

use crate::backend::{ModelLoader, TtsBackend, VoiceInfo, kokoro_voices};
use crate::buffer::RawAudioBuffer;
use crate::error::AudioError;
use crate::text_utils;

/// Voice used when the style is missing or unknown.
pub const DEFAULT_VOICE: &str = "af_bella";

/// Map a voice style to a Kokoro voice id.
#[must_use]
pub const fn voice_for_style(style: Option<VoiceStyle>) -> &'static str {
    match style {
        Some(VoiceStyle::FemaleWhisper) | None => DEFAULT_VOICE,
        Some(VoiceStyle::MaleSoft) => "am_adam",
        Some(VoiceStyle::NonbinaryGentle) => "af_sarah",
    }
}

// ── Request / output ───────────────────────────────────────────────

/// Text plus the hints that shape how it is spoken.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpeechRequest {
    pub text: String,
    pub voice_style: Option<VoiceStyle>,
    pub triggers: BTreeSet<String>,
}

impl SpeechRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_voice_style(mut self, style: Option<VoiceStyle>) -> Self {
        self.voice_style = style;
        self
    }

    #[must_use]
    pub fn with_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.triggers.insert(trigger.into());
        self
    }

    /// Build a request for `text` carrying the listener's voice and triggers.
    pub fn from_preferences(prefs: &Preferences, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_style: prefs.voice_style(),
            triggers: prefs.triggers.iter().cloned().collect(),
        }
    }

    /// Kokoro voice id for this request.
    #[must_use]
    pub const fn voice_id(&self) -> &'static str {
        voice_for_style(self.voice_style)
    }

    #[must_use]
    pub fn wants_whisper(&self) -> bool {
        text_utils::wants_whisper(self.voice_style, &self.triggers)
    }

    /// The text as it is sent to the model.
    #[must_use]
    pub fn prepared_text(&self) -> String {
        if self.wants_whisper() {
            text_utils::apply_whisper_effect(&self.text)
        } else {
            self.text.trim().to_string()
        }
    }
}

/// Result of one generation.
#[derive(Debug, Clone)]
pub struct SpeechOutput {
    /// Id assigned when the request was issued.
    pub request_id: u64,
    pub voice_id: &'static str,
    pub buffer: RawAudioBuffer,
}

// ── State & events ─────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeechState {
    Uninitialized,
    Loading,
    Ready,
    Generating,
}

/// Notifications emitted by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEvent {
    StateChanged(SpeechState),
    /// Model load progress, 0-100.
    LoadProgress(u8),
    Error(String),
}

// ── Orchestrator ───────────────────────────────────────────────────

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<dyn TtsBackend>, String>>>;

enum LoadSlot {
    Empty,
    Loading { generation: u64, fut: SharedLoad },
    Ready(Arc<dyn TtsBackend>),
}

/// Lazily loads the speech model and turns requests into sample buffers.
pub struct SpeechOrchestrator {
    loader: Arc<dyn ModelLoader>,
    /// Never held across an `.await`.
    slot: Mutex<LoadSlot>,
    state: Mutex<SpeechState>,
    load_generation: AtomicU64,
    next_request_id: AtomicU64,
    /// Serializes generations.
    generate_lock: tokio::sync::Mutex<()>,
    event_tx: mpsc::UnboundedSender<SpeechEvent>,
}

impl SpeechOrchestrator {
    /// Create an uninitialized orchestrator and the receiver for its events.
    pub fn new(loader: Arc<dyn ModelLoader>) -> (Self, mpsc::UnboundedReceiver<SpeechEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let orchestrator = Self {
            loader,
            slot: Mutex::new(LoadSlot::Empty),
            state: Mutex::new(SpeechState::Uninitialized),
            load_generation: AtomicU64::new(0),
            next_request_id: AtomicU64::new(0),
            generate_lock: tokio::sync::Mutex::new(()),
            event_tx,
        };
        (orchestrator, event_rx)
    }

    #[must_use]
    pub fn state(&self) -> SpeechState {
        *lock(&self.state)
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(*lock(&self.slot), LoadSlot::Ready(_))
    }

    /// Voices of the loaded model, or the stock Kokoro list before loading.
    #[must_use]
    pub fn available_voices(&self) -> Vec<VoiceInfo> {
        match &*lock(&self.slot) {
            LoadSlot::Ready(backend) => backend.available_voices(),
            _ => kokoro_voices(),
        }
    }

    /// Load the model if it is not loaded yet.
    ///
    /// Concurrent callers share a single in-flight load.
    pub async fn initialize(&self) -> Result<(), AudioError> {
        let (generation, fut) = {
            let mut slot = lock(&self.slot);
            match &*slot {
                LoadSlot::Ready(_) => return Ok(()),
                LoadSlot::Loading { generation, fut } => (*generation, fut.clone()),
                LoadSlot::Empty => {
                    let generation = self.load_generation.fetch_add(1, Ordering::SeqCst) + 1;
                    let fut = load_future(Arc::clone(&self.loader), self.event_tx.clone())
                        .boxed()
                        .shared();
                    *slot = LoadSlot::Loading {
                        generation,
                        fut: fut.clone(),
                    };
                    tracing::info!(generation, "Loading speech model");
                    self.set_state(SpeechState::Loading);
                    (generation, fut)
                }
            }
        };

        let result = fut.await;

        let mut slot = lock(&self.slot);
        let owns_slot =
            matches!(&*slot, LoadSlot::Loading { generation: g, .. } if *g == generation);

        match result {
            Ok(backend) => {
                if owns_slot {
                    *slot = LoadSlot::Ready(backend);
                    tracing::info!("Speech model ready");
                    self.set_state(SpeechState::Ready);
                }
                Ok(())
            }
            Err(message) => {
                if owns_slot {
                    *slot = LoadSlot::Empty;
                    tracing::warn!(error = %message, "Speech model load failed");
                    self.set_state(SpeechState::Uninitialized);
                    self.emit(SpeechEvent::Error(message.clone()));
                }
                Err(AudioError::ModelLoad(message))
            }
        }
    }

    /// Synthesize a request, loading the model first if needed.
    ///
    /// Requests queue behind each other; the returned id reflects issue order.
    pub async fn generate_speech(&self, request: &SpeechRequest) -> Result<SpeechOutput, AudioError> {
        let request_id = self.next_request_id.fetch_add(1, Ordering::SeqCst) + 1;
        let _queue = self.generate_lock.lock().await;

        self.initialize().await?;
        let backend = match &*lock(&self.slot) {
            LoadSlot::Ready(backend) => Arc::clone(backend),
            _ => return Err(AudioError::ModelLoad("speech model is not loaded".into())),
        };

        let voice_id = request.voice_id();
        tracing::info!(request_id, voice = %voice_id, whisper = request.wants_whisper(), "Generating speech");

        self.set_state(SpeechState::Generating);
        let result = synthesize(backend.as_ref(), &request.prepared_text(), voice_id).await;
        self.set_state(SpeechState::Ready);

        match result {
            Ok(buffer) => {
                tracing::info!(
                    request_id,
                    samples = buffer.len(),
                    sample_rate = buffer.sample_rate(),
                    "Speech generated"
                );
                Ok(SpeechOutput {
                    request_id,
                    voice_id,
                    buffer,
                })
            }
            Err(err) => {
                tracing::warn!(request_id, error = %err, "Speech generation failed");
                self.emit(SpeechEvent::Error(err.to_string()));
                Err(err)
            }
        }
    }

    fn set_state(&self, new_state: SpeechState) {
        let mut state = lock(&self.state);
        if *state != new_state {
            tracing::debug!(old = ?*state, new = ?new_state, "Speech state transition");
            *state = new_state;
            self.emit(SpeechEvent::StateChanged(new_state));
        }
    }

    fn emit(&self, event: SpeechEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("Speech event receiver dropped");
        }
    }
}

/// Build the shared load future. It owns everything it needs so it can be
/// polled by whichever caller gets there first.
fn load_future(
    loader: Arc<dyn ModelLoader>,
    events: mpsc::UnboundedSender<SpeechEvent>,
) -> BoxFuture<'static, Result<Arc<dyn TtsBackend>, String>> {
    async move {
        let on_progress = progress_reporter(events);
        let backend = loader
            .load(&on_progress)
            .await
            .map_err(|e| e.to_string())?;
        on_progress(1, 1);
        Ok(Arc::from(backend))
    }
    .boxed()
}

/// `(done, total)` callback that emits `LoadProgress` whenever the whole
/// percentage changes.
fn progress_reporter(
    events: mpsc::UnboundedSender<SpeechEvent>,
) -> impl Fn(u64, u64) + Send + Sync + 'static {
    let last = AtomicU8::new(u8::MAX);
    move |done, total| {
        let pct = percent(done, total);
        if last.swap(pct, Ordering::SeqCst) != pct {
            let _ = events.send(SpeechEvent::LoadProgress(pct));
        }
    }
}

/// Whole percentage of `done` out of `total`, capped at 100.
pub(crate) fn percent(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    ((u128::from(done) * 100 / u128::from(total)).min(100)) as u8
}

/// Chunk the text, synthesize each chunk and concatenate the audio.
async fn synthesize(
    backend: &dyn TtsBackend,
    text: &str,
    voice_id: &str,
) -> Result<RawAudioBuffer, AudioError> {
    let mut samples = Vec::new();
    let mut sample_rate = 0;

    for chunk in text_utils::split_into_chunks(text) {
        let audio = backend
            .synthesize(&chunk, voice_id)
            .await
            .map_err(|e| match e {
                AudioError::Generation(_) => e,
                other => AudioError::Generation(other.to_string()),
            })?;
        if sample_rate == 0 {
            sample_rate = audio.sample_rate;
        }
        samples.extend(audio.samples.iter().map(|s| s.clamp(-1.0, 1.0)));
    }

    if sample_rate == 0 {
        sample_rate = backend.sample_rate();
    }
    Ok(RawAudioBuffer::mono(samples, sample_rate))
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_table() {
        assert_eq!(voice_for_style(Some(VoiceStyle::FemaleWhisper)), "af_bella");
        assert_eq!(voice_for_style(Some(VoiceStyle::MaleSoft)), "am_adam");
        assert_eq!(voice_for_style(Some(VoiceStyle::NonbinaryGentle)), "af_sarah");
        assert_eq!(voice_for_style(None), "af_bella");
    }

    #[test]
    fn percent_is_capped_and_safe() {
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(50, 200), 25);
        assert_eq!(percent(300, 200), 100);
        assert_eq!(percent(u64::MAX, u64::MAX), 100);
    }

    #[test]
    fn progress_reporter_deduplicates() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let report = progress_reporter(tx);
        report(1, 1000);
        report(2, 1000);
        report(10, 1000);
        report(1000, 1000);
        report(1000, 1000);
        let mut seen = Vec::new();
        while let Ok(event) = rx.try_recv() {
            seen.push(event);
        }
        assert_eq!(
            seen,
            vec![
                SpeechEvent::LoadProgress(0),
                SpeechEvent::LoadProgress(1),
                SpeechEvent::LoadProgress(100),
            ]
        );
    }

    #[test]
    fn whisper_preparation_depends_on_hints() {
        let plain = SpeechRequest::new("Rest now. Breathe, slowly.")
            .with_voice_style(Some(VoiceStyle::MaleSoft));
        assert_eq!(plain.prepared_text(), "Rest now. Breathe, slowly.");

        let whisper = plain.clone().with_trigger("WHISPERING");
        assert_eq!(whisper.prepared_text(), "Rest now... Breathe, slowly...");
        assert_eq!(whisper.voice_id(), "am_adam");
    }

    #[test]
    fn request_from_preferences_copies_hints() {
        let prefs = Preferences {
            name: None,
            mood: "calm".into(),
            triggers: vec!["rain".into(), "whispering".into()],
            voice: "nonbinary-gentle".into(),
            background: "rain".into(),
            intensity: None,
        };
        let req = SpeechRequest::from_preferences(&prefs, "Hi.");
        assert_eq!(req.voice_style, Some(VoiceStyle::NonbinaryGentle));
        assert!(req.triggers.contains("whispering"));
        assert!(req.wants_whisper());
        assert_eq!(req.voice_id(), "af_sarah");
    }
}
