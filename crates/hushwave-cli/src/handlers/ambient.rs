//! Ambient command handler: loop textures through the mixer.

use std::time::Duration;

use anyhow::Result;
use hushwave_audio::catalog::RAIN;
use hushwave_audio::{AudioMixer, SoundCatalog, device};

use crate::bootstrap::CliContext;
use crate::progress;

pub async fn execute(
    ctx: &CliContext,
    sounds: Vec<String>,
    seconds: u64,
    volume: Option<f32>,
) -> Result<()> {
    let sounds = if sounds.is_empty() {
        vec![RAIN.to_string()]
    } else {
        sounds
    };

    let output = device::init()?;
    let mut mixer = AudioMixer::new(output, SoundCatalog::from_settings(&ctx.settings));

    let started = start_sounds(&mut mixer, &sounds, volume);
    let result = match started {
        Ok(()) => {
            let names: Vec<&str> = mixer
                .sources()
                .iter()
                .filter(|s| s.is_playing)
                .map(|s| s.display_name.as_str())
                .collect();
            let spinner = progress::spinner(&format!(
                "Playing {} for {seconds}s (Ctrl+C to stop)",
                names.join(" + ")
            ));
            tokio::select! {
                () = tokio::time::sleep(Duration::from_secs(seconds)) => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::debug!("Interrupted");
                }
            }
            spinner.finish_and_clear();
            mixer.last_error().map_or(Ok(()), |e| Err(anyhow::anyhow!(e.to_string())))
        }
        Err(e) => Err(e),
    };

    mixer.stop_all();
    drop(mixer);
    device::teardown();
    result
}

fn start_sounds(mixer: &mut AudioMixer, sounds: &[String], volume: Option<f32>) -> Result<()> {
    for id in sounds {
        if mixer.source(id).is_some_and(|s| s.is_playing) {
            continue;
        }
        if let Some(v) = volume {
            mixer.set_volume(id, v)?;
        }
        mixer.toggle(id)?;
    }
    Ok(())
}
