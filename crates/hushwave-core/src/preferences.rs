//! Listener preference record.
//!
//! The UI layer collects these during onboarding and hands them over as a
//! JSON document. Keys are camelCase and used verbatim by the voice mapping
//! and whisper-effect logic.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Preferences collected from the listener.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    /// Optional name used in the greeting and the sign-off.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Current mood key (`relaxed`, `sleepy`, ...).
    pub mood: String,

    /// Trigger keys in order of preference (`whispering`, `rain`, ...).
    #[serde(default)]
    pub triggers: Vec<String>,

    /// Voice style key (`female-whisper`, `male-soft`, `nonbinary-gentle`).
    pub voice: String,

    /// Background key (`rain`, `forest`, `ocean`, `silence`, `fireplace`).
    pub background: String,

    /// Optional intensity hint. Carried through, not interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intensity: Option<String>,
}

impl Preferences {
    /// Load a preference record from a JSON file.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| CoreError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parsed voice style, `None` when the key is not one of the known styles.
    #[must_use]
    pub fn voice_style(&self) -> Option<VoiceStyle> {
        VoiceStyle::from_key(&self.voice)
    }

    /// Whether the listener asked for a given trigger (case-insensitive).
    #[must_use]
    pub fn has_trigger(&self, trigger: &str) -> bool {
        self.triggers.iter().any(|t| t.eq_ignore_ascii_case(trigger))
    }
}

/// Voice styles offered to the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VoiceStyle {
    FemaleWhisper,
    MaleSoft,
    NonbinaryGentle,
}

impl VoiceStyle {
    /// All styles, in display order.
    pub const ALL: [Self; 3] = [Self::FemaleWhisper, Self::MaleSoft, Self::NonbinaryGentle];

    /// Parse the preference key for a style.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key.trim() {
            "female-whisper" => Some(Self::FemaleWhisper),
            "male-soft" => Some(Self::MaleSoft),
            "nonbinary-gentle" => Some(Self::NonbinaryGentle),
            _ => None,
        }
    }

    /// The preference key for this style.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::FemaleWhisper => "female-whisper",
            Self::MaleSoft => "male-soft",
            Self::NonbinaryGentle => "nonbinary-gentle",
        }
    }

    /// Whether this style implies the whisper effect on its own.
    #[must_use]
    pub const fn is_whisper(self) -> bool {
        matches!(self, Self::FemaleWhisper)
    }
}

impl std::fmt::Display for VoiceStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
