//! Speak command handler: compose, synthesize, encode, then save and/or play.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use hushwave_audio::{
    EncodedAudioAsset, GenerationOutcome, ListeningSession, SpeechEvent, SpeechOrchestrator,
    SpeechRequest, TransportState, device, wav,
};
use hushwave_core::{Preferences, ScriptComposer};
use indicatif::ProgressBar;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::bootstrap::{self, CliContext};
use crate::progress;

/// Arguments for the speak command.
pub struct SpeakArgs {
    pub prefs: PathBuf,
    pub text: Option<String>,
    pub out: Option<PathBuf>,
    pub play: bool,
}

pub async fn execute(ctx: &CliContext, args: SpeakArgs) -> Result<()> {
    let prefs = Preferences::load(&args.prefs)?;
    let text = match args.text {
        Some(text) => text,
        None => ScriptComposer::compose(&prefs, &mut rand::thread_rng()),
    };
    let mut request = SpeechRequest::from_preferences(&prefs, text);
    if request.voice_style.is_none() {
        request = request.with_voice_style(ctx.settings.default_voice_style);
    }

    let loader = bootstrap::speech_loader(&ctx.models_dir)?;
    let (orchestrator, events) = SpeechOrchestrator::new(loader);
    let watcher = tokio::spawn(watch_load(events, progress::load_bar()));

    let play = args.play || args.out.is_none();
    let result = if play {
        speak_and_play(ctx, &orchestrator, &request, args.out.as_deref()).await
    } else {
        speak_to_file(&orchestrator, &request, args.out.as_deref()).await
    };

    drop(orchestrator);
    if let Err(e) = watcher.await {
        tracing::debug!(error = %e, "Progress watcher ended abnormally");
    }
    result
}

/// Synthesize and encode without touching the output device.
async fn speak_to_file(
    orchestrator: &SpeechOrchestrator,
    request: &SpeechRequest,
    out: Option<&Path>,
) -> Result<()> {
    let output = orchestrator.generate_speech(request).await?;
    let asset = wav::encode(&output.buffer);
    if let Some(path) = out {
        save(&asset, path)?;
    }
    Ok(())
}

/// Run the request through a listening session and play it to the end.
async fn speak_and_play(
    ctx: &CliContext,
    orchestrator: &SpeechOrchestrator,
    request: &SpeechRequest,
    out: Option<&Path>,
) -> Result<()> {
    let output = device::init()?;
    let (mut session, _events) =
        ListeningSession::new(output, ctx.settings.effective_speech_volume());

    let result: Result<()> = async {
        let outcome = session.generate_new(orchestrator, request).await?;
        if outcome == GenerationOutcome::Stale {
            return Ok(());
        }
        let asset = session
            .controller()
            .asset()
            .map(Arc::clone)
            .context("generated audio was not loaded")?;
        if let Some(path) = out {
            save(&asset, path)?;
        }
        play_to_end(&mut session).await
    }
    .await;

    drop(session);
    device::teardown();
    result
}

async fn play_to_end(session: &mut ListeningSession) -> Result<()> {
    let duration = session.controller().duration();
    let bar = progress::spinner("Playing");
    let mut ticker = tokio::time::interval(Duration::from_millis(250));

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                session.controller_mut().pause()?;
                break;
            }
        }
        let position = session.controller_mut().tick()?;
        bar.set_message(format!(
            "Playing {} / {}",
            progress::clock(position),
            progress::clock(duration)
        ));
        if session.controller().state() == TransportState::Ended {
            break;
        }
    }
    bar.finish_and_clear();
    Ok(())
}

fn save(asset: &EncodedAudioAsset, path: &Path) -> Result<()> {
    asset
        .save(path)
        .with_context(|| format!("writing {}", path.display()))?;
    println!(
        "Wrote {} ({} at {} Hz)",
        path.display(),
        progress::clock(asset.duration_secs()),
        asset.source_sample_rate()
    );
    Ok(())
}

/// Mirror orchestrator events onto the load bar until the orchestrator is
/// dropped.
async fn watch_load(mut events: UnboundedReceiver<SpeechEvent>, bar: ProgressBar) {
    while let Some(event) = events.recv().await {
        match event {
            SpeechEvent::LoadProgress(pct) => {
                bar.set_position(u64::from(pct));
                if pct >= 100 {
                    bar.finish_and_clear();
                }
            }
            SpeechEvent::StateChanged(state) => {
                tracing::debug!(state = ?state, "Speech state");
            }
            SpeechEvent::Error(message) => {
                bar.abandon_with_message(message);
            }
        }
    }
    if !bar.is_finished() {
        bar.finish_and_clear();
    }
}
