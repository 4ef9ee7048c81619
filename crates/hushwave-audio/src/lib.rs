//! # hushwave-audio
//!
//! The audio core of hushwave:
//!
//! - [`synth`] - procedural ambient textures (pink-noise rain, brushing)
//! - [`mixer`] - per-source gain stages over the shared output
//! - [`speech`] - lazy speech model loading and text-to-samples generation
//! - [`wav`] - canonical 16-bit PCM WAV encoding and header probing
//! - [`playback`] - play/pause/seek/volume transport around an encoded asset
//! - [`session`] - one listening context with stale-result protection
//! - [`device`] - the process-wide output device (dedicated audio thread)
//! - [`models`] - speech model catalog and download

pub mod audio_io;
pub mod audio_thread;
pub mod backend;
pub mod buffer;
pub mod catalog;
pub mod device;
pub mod error;
pub mod mixer;
pub mod models;
pub mod playback;
pub mod session;
pub mod speech;
pub mod synth;
pub mod text_utils;
pub mod wav;

pub use audio_io::{AudioOutput, ChannelId, ChannelOptions, ChannelStatus, Clip};
pub use backend::{ModelLoader, TtsAudio, TtsBackend, VoiceGender, VoiceInfo, kokoro_voices};
pub use buffer::RawAudioBuffer;
pub use catalog::{SoundCatalog, SoundSpec};
pub use error::AudioError;
pub use mixer::{AudioMixer, SoundSource};
pub use models::{ModelCatalog, TtsModelInfo};
pub use playback::{PlaybackController, PlaybackEvent, PlaybackSession, TransportState};
pub use session::{GenerationOutcome, GenerationTicket, ListeningSession};
pub use speech::{SpeechEvent, SpeechOrchestrator, SpeechOutput, SpeechRequest, SpeechState};
pub use synth::{PinkNoise, RhythmicTexture, TextureKind};
pub use wav::{EncodedAudioAsset, WavInfo};
