//! Render command handler: write one texture to a WAV file.

use std::path::Path;

use anyhow::Result;
use hushwave_audio::catalog::TEXTURE_SAMPLE_RATE;
use hushwave_audio::{AudioError, SoundCatalog, wav};

use crate::bootstrap::CliContext;

/// Longest texture the command will render in one file.
const MAX_RENDER_SECS: f32 = 3_600.0;

pub fn execute(ctx: &CliContext, sound: &str, seconds: Option<f32>, out: &Path) -> Result<()> {
    let catalog = SoundCatalog::from_settings(&ctx.settings);
    render_to(&catalog, sound, seconds, out)?;
    println!("Wrote {}", out.display());
    Ok(())
}

fn render_to(
    catalog: &SoundCatalog,
    sound: &str,
    seconds: Option<f32>,
    out: &Path,
) -> Result<(), AudioError> {
    let spec = catalog
        .get(sound)
        .ok_or_else(|| AudioError::UnknownSound(sound.to_string()))?;
    let seconds = seconds.unwrap_or(spec.loop_secs);
    if !seconds.is_finite() || seconds <= 0.0 || seconds > MAX_RENDER_SECS {
        return Err(AudioError::InvalidDuration(format!(
            "{seconds} s is outside 0 to {MAX_RENDER_SECS} s"
        )));
    }
    let buffer = spec.kind.render(seconds, TEXTURE_SAMPLE_RATE);
    let asset = wav::encode(&buffer);
    asset.save(out)?;
    tracing::info!(
        sound = %spec.id,
        seconds,
        bytes = asset.bytes().len(),
        "Rendered texture"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rain_renders_to_a_valid_wav() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("rain.wav");
        render_to(&SoundCatalog::with_defaults(), "rain", Some(0.5), &out).unwrap();

        let bytes = std::fs::read(&out).unwrap();
        let info = wav::probe(&bytes).unwrap();
        assert_eq!(info.sample_rate, TEXTURE_SAMPLE_RATE);
        assert_eq!(info.data_len, 22_050 * 2);
    }

    #[test]
    fn default_length_is_the_loop_length() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("brushing.wav");
        render_to(&SoundCatalog::with_defaults(), "brushing", None, &out).unwrap();
        let info = wav::probe(&std::fs::read(&out).unwrap()).unwrap();
        assert!((info.duration_secs() - 3.0).abs() < 1e-6);
    }

    #[test]
    fn unknown_sound_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let err = render_to(
            &SoundCatalog::with_defaults(),
            "thunder",
            None,
            &tmp.path().join("x.wav"),
        )
        .unwrap_err();
        assert!(matches!(err, AudioError::UnknownSound(_)));
    }

    #[test]
    fn out_of_range_lengths_are_rejected_before_rendering() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("rain.wav");
        for seconds in [1e30, f32::INFINITY, f32::NAN, 0.0, -2.0, 3_600.5] {
            let err =
                render_to(&SoundCatalog::with_defaults(), "rain", Some(seconds), &out).unwrap_err();
            assert!(matches!(err, AudioError::InvalidDuration(_)), "{seconds}");
        }
        assert!(!out.exists());
    }
}
