//! Ambient sound catalog.
//!
//! The mixer only plays what is listed here. Each entry names the
//! synthesizer that renders it, the loop length and its starting gain.

use hushwave_core::Settings;
use hushwave_core::settings::{
    DEFAULT_AMBIENT_VOLUME, DEFAULT_BRUSHING_LOOP_SECS, DEFAULT_RAIN_LOOP_SECS,
};
use serde::Serialize;

use crate::synth::TextureKind;

/// Sample rate the mixer renders textures at.
pub const TEXTURE_SAMPLE_RATE: u32 = 44_100;

/// Catalog id of the rain texture.
pub const RAIN: &str = "rain";

/// Catalog id of the brushing texture.
pub const BRUSHING: &str = "brushing";

/// One playable ambient texture.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SoundSpec {
    pub id: String,
    pub display_name: String,
    pub kind: TextureKind,
    /// Length of the rendered buffer that is looped.
    pub loop_secs: f32,
    /// Gain the source starts with before the listener touches it.
    pub default_volume: f32,
}

/// The set of textures the mixer knows about, in display order.
#[derive(Debug, Clone)]
pub struct SoundCatalog {
    sounds: Vec<SoundSpec>,
}

impl SoundCatalog {
    /// Rain and brushing with their stock loop lengths and gain.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::build(
            DEFAULT_AMBIENT_VOLUME,
            DEFAULT_RAIN_LOOP_SECS,
            DEFAULT_BRUSHING_LOOP_SECS,
        )
    }

    /// Catalog with gain and loop lengths taken from settings.
    #[must_use]
    pub fn from_settings(settings: &Settings) -> Self {
        Self::build(
            settings.effective_ambient_volume(),
            settings.effective_rain_loop_secs(),
            settings.effective_brushing_loop_secs(),
        )
    }

    fn build(volume: f32, rain_secs: f32, brushing_secs: f32) -> Self {
        let volume = volume.clamp(0.0, 1.0);
        Self {
            sounds: vec![
                SoundSpec {
                    id: RAIN.to_string(),
                    display_name: "Rain".to_string(),
                    kind: TextureKind::PinkNoise,
                    loop_secs: rain_secs,
                    default_volume: volume,
                },
                SoundSpec {
                    id: BRUSHING.to_string(),
                    display_name: "Brushing".to_string(),
                    kind: TextureKind::Rhythmic,
                    loop_secs: brushing_secs,
                    default_volume: volume,
                },
            ],
        }
    }

    /// Look up a sound by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&SoundSpec> {
        self.sounds.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SoundSpec> {
        self.sounds.iter()
    }

    /// Catalog ids in display order.
    #[must_use]
    pub fn ids(&self) -> Vec<&str> {
        self.sounds.iter().map(|s| s.id.as_str()).collect()
    }
}

impl Default for SoundCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stock_catalog_has_rain_and_brushing() {
        let catalog = SoundCatalog::with_defaults();
        assert_eq!(catalog.ids(), vec![RAIN, BRUSHING]);

        let rain = catalog.get(RAIN).unwrap();
        assert_eq!(rain.kind, TextureKind::PinkNoise);
        assert!((rain.loop_secs - 2.0).abs() < f32::EPSILON);
        assert!((rain.default_volume - 0.3).abs() < f32::EPSILON);

        let brushing = catalog.get(BRUSHING).unwrap();
        assert_eq!(brushing.kind, TextureKind::Rhythmic);
        assert!((brushing.loop_secs - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn settings_override_gain_and_loops() {
        let settings = Settings {
            ambient_volume: Some(0.6),
            rain_loop_secs: Some(5.0),
            ..Settings::default()
        };
        let catalog = SoundCatalog::from_settings(&settings);
        let rain = catalog.get(RAIN).unwrap();
        assert!((rain.default_volume - 0.6).abs() < f32::EPSILON);
        assert!((rain.loop_secs - 5.0).abs() < f32::EPSILON);
        assert!((catalog.get(BRUSHING).unwrap().loop_secs - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn unknown_id_is_absent() {
        assert!(SoundCatalog::default().get("thunder").is_none());
    }
}
