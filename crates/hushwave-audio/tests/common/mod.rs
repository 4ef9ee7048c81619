//! Shared test doubles: an in-memory output sink and scriptable speech
//! backends. No audio hardware, model files or network access.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use hushwave_audio::backend::ProgressFn;
use hushwave_audio::{
    AudioError, AudioOutput, ChannelId, ChannelOptions, ChannelStatus, Clip, ModelLoader,
    TtsAudio, TtsBackend, VoiceInfo,
};

// ── Mock output ────────────────────────────────────────────────────

/// Recorded state of one channel on the mock sink.
#[derive(Debug, Clone)]
pub struct MockChannel {
    pub volume: f32,
    pub looped: bool,
    pub paused: bool,
    pub position: Duration,
    pub finished: bool,
    /// Sample count for PCM clips, byte count for WAV clips.
    pub clip_len: usize,
    pub is_wav: bool,
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    channels: BTreeMap<ChannelId, MockChannel>,
    opened: usize,
    closed: usize,
    unplugged: bool,
}

/// In-memory [`AudioOutput`] that records every call.
#[derive(Default)]
pub struct MockOutput {
    state: Mutex<MockState>,
}

impl MockOutput {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every fallible call fail with a device error.
    pub fn unplug(&self) {
        self.state.lock().unwrap().unplugged = true;
    }

    pub fn live(&self) -> usize {
        self.state.lock().unwrap().channels.len()
    }

    pub fn opened(&self) -> usize {
        self.state.lock().unwrap().opened
    }

    pub fn closed(&self) -> usize {
        self.state.lock().unwrap().closed
    }

    pub fn channel(&self, id: ChannelId) -> Option<MockChannel> {
        self.state.lock().unwrap().channels.get(&id).cloned()
    }

    /// The only open channel. Panics if there is not exactly one.
    pub fn sole_channel(&self) -> (ChannelId, MockChannel) {
        let state = self.state.lock().unwrap();
        assert_eq!(state.channels.len(), 1, "expected exactly one open channel");
        let (id, ch) = state.channels.iter().next().unwrap();
        (*id, ch.clone())
    }

    /// Pretend the playhead of `id` is at `position`.
    pub fn set_position(&self, id: ChannelId, position: Duration) {
        let mut state = self.state.lock().unwrap();
        state.channels.get_mut(&id).unwrap().position = position;
    }

    /// Pretend the clip on `id` has drained.
    pub fn finish(&self, id: ChannelId) {
        let mut state = self.state.lock().unwrap();
        let ch = state.channels.get_mut(&id).unwrap();
        ch.finished = true;
        ch.position = Duration::ZERO;
    }

    fn with<T>(
        &self,
        id: ChannelId,
        f: impl FnOnce(&mut MockChannel) -> T,
    ) -> Result<T, AudioError> {
        let mut state = self.state.lock().unwrap();
        if state.unplugged {
            return Err(AudioError::Device("mock device unplugged".into()));
        }
        state
            .channels
            .get_mut(&id)
            .map(f)
            .ok_or_else(|| AudioError::Device(format!("channel {id} is not open")))
    }
}

impl AudioOutput for MockOutput {
    fn open(&self, clip: Clip, options: ChannelOptions) -> Result<ChannelId, AudioError> {
        let mut state = self.state.lock().unwrap();
        if state.unplugged {
            return Err(AudioError::Device("mock device unplugged".into()));
        }
        state.next_id += 1;
        state.opened += 1;
        let id = ChannelId(state.next_id);
        let (clip_len, is_wav) = match &clip {
            Clip::Pcm(buffer) => (buffer.len(), false),
            Clip::Wav(asset) => (asset.bytes().len(), true),
        };
        state.channels.insert(
            id,
            MockChannel {
                volume: options.volume.clamp(0.0, 1.0),
                looped: options.looped,
                paused: options.start_paused,
                position: Duration::ZERO,
                finished: false,
                clip_len,
                is_wav,
            },
        );
        Ok(id)
    }

    fn set_volume(&self, channel: ChannelId, volume: f32) -> Result<(), AudioError> {
        self.with(channel, |ch| ch.volume = volume)
    }

    fn pause(&self, channel: ChannelId) -> Result<(), AudioError> {
        self.with(channel, |ch| ch.paused = true)
    }

    fn resume(&self, channel: ChannelId) -> Result<(), AudioError> {
        self.with(channel, |ch| ch.paused = false)
    }

    /// Seeking a drained channel queues its clip again. Like a real sink it
    /// keeps its pause flag, so an unpaused drained channel starts sounding.
    fn seek(&self, channel: ChannelId, position: Duration) -> Result<(), AudioError> {
        self.with(channel, |ch| {
            ch.position = position;
            ch.finished = false;
        })
    }

    fn status(&self, channel: ChannelId) -> Result<ChannelStatus, AudioError> {
        self.with(channel, |ch| ChannelStatus {
            position: ch.position,
            finished: ch.finished,
        })
    }

    fn close(&self, channel: ChannelId) {
        let mut state = self.state.lock().unwrap();
        if state.channels.remove(&channel).is_some() {
            state.closed += 1;
        }
    }
}

// ── Mock speech backend ────────────────────────────────────────────

/// Records every synthesized chunk and returns `samples_per_chunk` samples.
pub struct MockTts {
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
    pub samples_per_chunk: usize,
    /// Sample rate reported in each `TtsAudio`.
    pub chunk_rate: u32,
    /// Sample rate reported by `sample_rate()`.
    pub engine_rate: u32,
    pub fail: Arc<AtomicBool>,
    in_flight: Arc<AtomicUsize>,
    pub max_in_flight: Arc<AtomicUsize>,
}

impl MockTts {
    pub fn new(chunk_rate: u32) -> Self {
        Self {
            calls: Arc::default(),
            samples_per_chunk: 100,
            chunk_rate,
            engine_rate: chunk_rate,
            fail: Arc::default(),
            in_flight: Arc::default(),
            max_in_flight: Arc::default(),
        }
    }
}

#[async_trait]
impl TtsBackend for MockTts {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<TtsAudio, AudioError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail.load(Ordering::SeqCst) {
            return Err(AudioError::Generation("mock synthesis failure".into()));
        }
        self.calls
            .lock()
            .unwrap()
            .push((text.to_string(), voice_id.to_string()));
        Ok(TtsAudio {
            samples: vec![0.5; self.samples_per_chunk],
            sample_rate: self.chunk_rate,
            duration: Duration::from_millis(10),
        })
    }

    fn sample_rate(&self) -> u32 {
        self.engine_rate
    }

    fn available_voices(&self) -> Vec<VoiceInfo> {
        Vec::new()
    }
}

// ── Mock loader ────────────────────────────────────────────────────

type BackendFactory = Box<dyn Fn() -> MockTts + Send + Sync>;

/// Counts loads, replays scripted progress and fails the first
/// `failures` attempts.
pub struct MockLoader {
    pub loads: Arc<AtomicUsize>,
    failures: usize,
    progress: Vec<(u64, u64)>,
    factory: BackendFactory,
}

impl MockLoader {
    pub fn new(factory: impl Fn() -> MockTts + Send + Sync + 'static) -> Self {
        Self {
            loads: Arc::default(),
            failures: 0,
            progress: Vec::new(),
            factory: Box::new(factory),
        }
    }

    pub fn failing_first(mut self, failures: usize) -> Self {
        self.failures = failures;
        self
    }

    pub fn with_progress(mut self, steps: &[(u64, u64)]) -> Self {
        self.progress = steps.to_vec();
        self
    }
}

#[async_trait]
impl ModelLoader for MockLoader {
    async fn load(&self, on_progress: ProgressFn<'_>) -> Result<Box<dyn TtsBackend>, AudioError> {
        let attempt = self.loads.fetch_add(1, Ordering::SeqCst);
        for &(done, total) in &self.progress {
            on_progress(done, total);
            tokio::task::yield_now().await;
        }
        // Give concurrent callers a chance to join the in-flight load.
        for _ in 0..3 {
            tokio::task::yield_now().await;
        }
        if attempt < self.failures {
            return Err(AudioError::ModelLoad("mock download failed".into()));
        }
        Ok(Box::new((self.factory)()))
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Drain all pending events from a receiver.
pub fn drain<T>(rx: &mut tokio::sync::mpsc::UnboundedReceiver<T>) -> Vec<T> {
    let mut events = Vec::new();
    while let Ok(e) = rx.try_recv() {
        events.push(e);
    }
    events
}
