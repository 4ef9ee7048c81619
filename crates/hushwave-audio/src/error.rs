//! Audio core error types.

use std::path::PathBuf;

/// Errors that can occur in the audio core.
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// Speech model initialisation failed. The orchestrator is back to
    /// `Uninitialized` and the caller may retry.
    #[error("Failed to load speech model: {0}")]
    ModelLoad(String),

    /// Speech synthesis failed for one request.
    #[error("Speech generation failed: {0}")]
    Generation(String),

    /// The output sink is unavailable or rejected a command.
    #[error("Audio output device error: {0}")]
    Device(String),

    /// The dedicated audio thread is gone (panicked or torn down).
    #[error("Audio thread is not running")]
    AudioThreadDied,

    /// A sound id that is not in the catalog.
    #[error("Unknown sound source: {0}")]
    UnknownSound(String),

    /// A render length outside the range the command accepts.
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    /// Encoded audio could not be parsed.
    #[error("Invalid WAV data: {0}")]
    InvalidWav(String),

    /// Model file not found at the expected path.
    #[error("Speech model not found at {0}")]
    ModelNotFound(PathBuf),

    /// Failed to download the speech model.
    #[error("Failed to download speech model '{name}': {source}")]
    DownloadError { name: String, source: anyhow::Error },

    /// IO error (model files, output files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AudioError {
    /// Whether this error means the output sink itself is unusable.
    #[must_use]
    pub const fn is_device_failure(&self) -> bool {
        matches!(self, Self::Device(_) | Self::AudioThreadDied)
    }
}
