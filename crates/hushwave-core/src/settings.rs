//! Settings domain types and validation.
//!
//! All fields are optional so a partially written settings file still loads;
//! the `effective_*` accessors supply the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::paths;
use crate::preferences::VoiceStyle;

/// Default gain for every ambient texture.
pub const DEFAULT_AMBIENT_VOLUME: f32 = 0.3;

/// Default speech playback volume.
pub const DEFAULT_SPEECH_VOLUME: f32 = 0.75;

/// Default loop length of the rain texture.
pub const DEFAULT_RAIN_LOOP_SECS: f32 = 2.0;

/// Default loop length of the brushing texture.
pub const DEFAULT_BRUSHING_LOOP_SECS: f32 = 3.0;

/// Longest loop a texture may be configured with.
const MAX_LOOP_SECS: f32 = 60.0;

/// Application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    /// Initial gain for ambient textures (0.0-1.0).
    pub ambient_volume: Option<f32>,

    /// Initial speech playback volume (0.0-1.0).
    pub speech_volume: Option<f32>,

    /// Where speech models are downloaded to.
    pub models_dir: Option<String>,

    /// Voice style used when the preference record does not name a known one.
    pub default_voice_style: Option<VoiceStyle>,

    /// Loop length of the rain texture in seconds.
    pub rain_loop_secs: Option<f32>,

    /// Loop length of the brushing texture in seconds.
    pub brushing_loop_secs: Option<f32>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            ambient_volume: Some(DEFAULT_AMBIENT_VOLUME),
            speech_volume: Some(DEFAULT_SPEECH_VOLUME),
            models_dir: None,
            default_voice_style: None,
            rain_loop_secs: Some(DEFAULT_RAIN_LOOP_SECS),
            brushing_loop_secs: Some(DEFAULT_BRUSHING_LOOP_SECS),
        }
    }

    /// Load settings from `path`; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, CoreError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No settings file, using defaults");
            return Ok(Self::with_defaults());
        }
        let raw = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Self = serde_json::from_str(&raw).map_err(|source| CoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the default location under the data root.
    pub fn load() -> Result<Self, CoreError> {
        Self::load_from(&paths::settings_path()?)
    }

    /// Write settings to `path` as pretty JSON.
    pub fn save_to(&self, path: &Path) -> Result<(), CoreError> {
        self.validate()?;
        if let Some(parent) = path.parent() {
            paths::ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| CoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Reject values that can never be applied.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (label, value) in [
            ("ambientVolume", self.ambient_volume),
            ("speechVolume", self.speech_volume),
        ] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(CoreError::InvalidSetting(format!("{label} must be a number")));
                }
            }
        }
        for (label, value) in [
            ("rainLoopSecs", self.rain_loop_secs),
            ("brushingLoopSecs", self.brushing_loop_secs),
        ] {
            if let Some(v) = value {
                if !(v > 0.0 && v <= MAX_LOOP_SECS) {
                    return Err(CoreError::InvalidSetting(format!(
                        "{label} must be in (0, {MAX_LOOP_SECS}], got {v}"
                    )));
                }
            }
        }
        Ok(())
    }

    /// Effective ambient gain, clamped into [0, 1].
    #[must_use]
    pub fn effective_ambient_volume(&self) -> f32 {
        self.ambient_volume
            .unwrap_or(DEFAULT_AMBIENT_VOLUME)
            .clamp(0.0, 1.0)
    }

    /// Effective speech volume, clamped into [0, 1].
    #[must_use]
    pub fn effective_speech_volume(&self) -> f32 {
        self.speech_volume
            .unwrap_or(DEFAULT_SPEECH_VOLUME)
            .clamp(0.0, 1.0)
    }

    #[must_use]
    pub fn effective_rain_loop_secs(&self) -> f32 {
        self.rain_loop_secs.unwrap_or(DEFAULT_RAIN_LOOP_SECS)
    }

    #[must_use]
    pub fn effective_brushing_loop_secs(&self) -> f32 {
        self.brushing_loop_secs
            .unwrap_or(DEFAULT_BRUSHING_LOOP_SECS)
    }

    /// Effective model directory: the configured one or `{data_root}/models`.
    pub fn effective_models_dir(&self) -> Result<PathBuf, CoreError> {
        match self.models_dir.as_deref().map(str::trim) {
            Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
            _ => Ok(paths::default_models_dir()?),
        }
    }

    /// Merge an update into these settings, only touching fields that are `Some`.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(v) = other.ambient_volume {
            self.ambient_volume = v;
        }
        if let Some(v) = other.speech_volume {
            self.speech_volume = v;
        }
        if let Some(ref dir) = other.models_dir {
            self.models_dir.clone_from(dir);
        }
        if let Some(style) = other.default_voice_style {
            self.default_voice_style = style;
        }
        if let Some(v) = other.rain_loop_secs {
            self.rain_loop_secs = v;
        }
        if let Some(v) = other.brushing_loop_secs {
            self.brushing_loop_secs = v;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = reset the field to its default
/// - `Some(Some(value))` = set the field
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub ambient_volume: Option<Option<f32>>,
    pub speech_volume: Option<Option<f32>>,
    pub models_dir: Option<Option<String>>,
    pub default_voice_style: Option<Option<VoiceStyle>>,
    pub rain_loop_secs: Option<Option<f32>>,
    pub brushing_loop_secs: Option<Option<f32>>,
}
