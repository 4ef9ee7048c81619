//! One listening context: the playback controller for the current speech
//! asset plus the bookkeeping that keeps late generations from clobbering
//! newer ones.
//!
//! Generation is split in two so the session is not borrowed while the
//! model runs: [`ListeningSession::begin_generation`] hands out a ticket,
//! and [`ListeningSession::complete_generation`] applies a result only if
//! its ticket is still the latest one issued. Transport commands issued in
//! between act on the previous asset as usual.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::audio_io::AudioOutput;
use crate::buffer::RawAudioBuffer;
use crate::error::AudioError;
use crate::playback::{PlaybackController, PlaybackEvent};
use crate::speech::{SpeechOrchestrator, SpeechRequest};
use crate::wav;

/// Proof that a generation was started; redeemed by `complete_generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GenerationTicket(u64);

impl GenerationTicket {
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// What happened to a completed generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// The result was encoded and loaded into the controller.
    Applied,
    /// A newer generation was started meanwhile; the result was dropped.
    Stale,
}

pub struct ListeningSession {
    controller: PlaybackController,
    issued: u64,
    pending: Option<GenerationTicket>,
    autoplay: bool,
    last_error: Option<String>,
}

impl ListeningSession {
    /// Create a session playing through `output` at `volume`.
    pub fn new(
        output: Arc<dyn AudioOutput>,
        volume: f32,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (controller, events) = PlaybackController::new(output, volume);
        let session = Self {
            controller,
            issued: 0,
            pending: None,
            autoplay: true,
            last_error: None,
        };
        (session, events)
    }

    /// Whether a freshly applied asset starts playing right away (default on).
    #[must_use]
    pub fn with_autoplay(mut self, autoplay: bool) -> Self {
        self.autoplay = autoplay;
        self
    }

    #[must_use]
    pub const fn controller(&self) -> &PlaybackController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut PlaybackController {
        &mut self.controller
    }

    /// Whether the latest generation is still outstanding.
    #[must_use]
    pub const fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    /// Error of the most recent failed generation, cleared by the next
    /// applied one.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Start a generation. Any earlier outstanding ticket becomes stale.
    pub fn begin_generation(&mut self) -> GenerationTicket {
        self.issued += 1;
        let ticket = GenerationTicket(self.issued);
        if let Some(previous) = self.pending.replace(ticket) {
            tracing::debug!(superseded = previous.0, ticket = ticket.0, "Generation superseded");
        }
        ticket
    }

    /// Apply the result of the generation identified by `ticket`.
    ///
    /// Stale tickets are ignored whatever their result. A failed latest
    /// generation records the error and leaves the loaded asset and the
    /// transport exactly as they were.
    pub fn complete_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<RawAudioBuffer, AudioError>,
    ) -> Result<GenerationOutcome, AudioError> {
        if self.pending != Some(ticket) {
            tracing::debug!(ticket = ticket.0, latest = self.issued, "Dropping stale generation result");
            return Ok(GenerationOutcome::Stale);
        }
        self.pending = None;

        let buffer = match result {
            Ok(buffer) => buffer,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return Err(err);
            }
        };

        let asset = Arc::new(wav::encode(&buffer));
        if let Err(err) = self.apply(asset) {
            self.last_error = Some(err.to_string());
            return Err(err);
        }

        self.last_error = None;
        tracing::info!(ticket = ticket.0, duration_secs = buffer.duration_secs(), "Applied new speech asset");
        Ok(GenerationOutcome::Applied)
    }

    fn apply(&mut self, asset: Arc<wav::EncodedAudioAsset>) -> Result<(), AudioError> {
        self.controller.load(asset)?;
        if self.autoplay {
            self.controller.play()?;
        }
        Ok(())
    }

    /// Generate speech for `request` and load it.
    pub async fn generate_new(
        &mut self,
        orchestrator: &SpeechOrchestrator,
        request: &SpeechRequest,
    ) -> Result<GenerationOutcome, AudioError> {
        let ticket = self.begin_generation();
        let result = orchestrator
            .generate_speech(request)
            .await
            .map(|output| output.buffer);
        self.complete_generation(ticket, result)
    }
}
