//! Integration tests for `ListeningSession`: stale-result protection and
//! error handling around speech generation.

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;

use common::{MockLoader, MockOutput, MockTts};
use hushwave_audio::{
    AudioError, AudioOutput, GenerationOutcome, ListeningSession, RawAudioBuffer,
    SpeechOrchestrator, SpeechRequest, TransportState,
};
use hushwave_core::VoiceStyle;

fn seconds(n: u32) -> RawAudioBuffer {
    RawAudioBuffer::mono(vec![0.1; (n * 8_000) as usize], 8_000)
}

fn session() -> (ListeningSession, Arc<MockOutput>) {
    let output = MockOutput::new();
    let (session, _events) = ListeningSession::new(Arc::clone(&output) as Arc<dyn AudioOutput>, 0.75);
    (session, output)
}

#[test]
fn later_ticket_wins_over_earlier_slow_result() {
    let (mut session, output) = session();

    let first = session.begin_generation();
    let second = session.begin_generation();
    assert!(second > first);

    assert_eq!(
        session.complete_generation(second, Ok(seconds(2))).unwrap(),
        GenerationOutcome::Applied
    );
    assert_eq!(
        session.complete_generation(first, Ok(seconds(5))).unwrap(),
        GenerationOutcome::Stale
    );

    assert!((session.controller().duration() - 2.0).abs() < 1e-9);
    assert_eq!(output.opened(), 1);
    assert!(!session.is_generating());
}

#[test]
fn stale_failure_is_ignored() {
    let (mut session, _output) = session();
    let first = session.begin_generation();
    let _second = session.begin_generation();

    let outcome = session
        .complete_generation(first, Err(AudioError::Generation("late".into())))
        .unwrap();
    assert_eq!(outcome, GenerationOutcome::Stale);
    assert!(session.last_error().is_none());
    assert!(session.is_generating());
}

#[test]
fn applied_asset_starts_playing_from_zero() {
    let (mut session, output) = session();
    let ticket = session.begin_generation();
    session.complete_generation(ticket, Ok(seconds(3))).unwrap();

    let controller = session.controller();
    assert!(controller.is_playing());
    assert_eq!(controller.state(), TransportState::Playing);
    assert!(controller.current_time().abs() < f64::EPSILON);
    assert_eq!(controller.asset().unwrap().mime_type(), "audio/wav");
    let (_, channel) = output.sole_channel();
    assert!(!channel.paused);
}

#[test]
fn autoplay_can_be_disabled() {
    let output = MockOutput::new();
    let (session, _events) = ListeningSession::new(Arc::clone(&output) as Arc<dyn AudioOutput>, 0.5);
    let mut session = session.with_autoplay(false);

    let ticket = session.begin_generation();
    session.complete_generation(ticket, Ok(seconds(1))).unwrap();
    assert!(!session.controller().is_playing());
    assert!(session.controller().metadata_ready());
}

#[test]
fn generation_error_keeps_previous_asset_and_transport() {
    let (mut session, _output) = session();
    let ticket = session.begin_generation();
    session.complete_generation(ticket, Ok(seconds(4))).unwrap();
    let previous = Arc::clone(session.controller().asset().unwrap());
    assert!(session.controller().is_playing());

    let ticket = session.begin_generation();
    let err = session
        .complete_generation(ticket, Err(AudioError::Generation("model crashed".into())))
        .unwrap_err();

    assert!(matches!(err, AudioError::Generation(_)));
    assert!(Arc::ptr_eq(session.controller().asset().unwrap(), &previous));
    assert!(session.controller().is_playing());
    assert!(session.last_error().unwrap().contains("model crashed"));
}

#[test]
fn device_loss_while_applying_keeps_previous_asset() {
    let (mut session, output) = session();
    let ticket = session.begin_generation();
    session.complete_generation(ticket, Ok(seconds(4))).unwrap();
    let previous = Arc::clone(session.controller().asset().unwrap());

    output.unplug();
    let ticket = session.begin_generation();
    let err = session.complete_generation(ticket, Ok(seconds(2))).unwrap_err();

    assert!(err.is_device_failure());
    assert!(Arc::ptr_eq(session.controller().asset().unwrap(), &previous));
    assert!((session.controller().duration() - 4.0).abs() < 1e-9);
    assert!(session.last_error().is_some());
    assert_eq!(output.opened(), 1);
}

#[test]
fn transport_keeps_working_while_generation_is_pending() {
    let (mut session, output) = session();
    let ticket = session.begin_generation();
    session.complete_generation(ticket, Ok(seconds(4))).unwrap();

    let _pending = session.begin_generation();
    session.controller_mut().pause().unwrap();
    session.controller_mut().seek(0.25).unwrap();

    assert!(!session.controller().is_playing());
    assert!((session.controller().current_time() - 1.0).abs() < 1e-9);
    let (_, channel) = output.sole_channel();
    assert!(channel.paused);
}

#[test]
fn successful_apply_clears_last_error() {
    let (mut session, _output) = session();
    let ticket = session.begin_generation();
    let _ = session.complete_generation(ticket, Err(AudioError::Generation("boom".into())));
    assert!(session.last_error().is_some());

    let ticket = session.begin_generation();
    session.complete_generation(ticket, Ok(seconds(1))).unwrap();
    assert!(session.last_error().is_none());
}

#[tokio::test]
async fn generate_new_runs_the_whole_pipeline() {
    let loader = MockLoader::new(|| MockTts::new(24_000));
    let (orchestrator, _events) = SpeechOrchestrator::new(Arc::new(loader));
    let (mut session, output) = session();

    let request = SpeechRequest::new("Close your eyes. Breathe slowly.")
        .with_voice_style(Some(VoiceStyle::MaleSoft));
    let outcome = session.generate_new(&orchestrator, &request).await.unwrap();

    assert_eq!(outcome, GenerationOutcome::Applied);
    assert!(session.controller().is_playing());
    assert_eq!(session.controller().asset().unwrap().source_sample_rate(), 24_000);
    assert_eq!(output.live(), 1);
}

#[tokio::test]
async fn generate_new_failure_is_recorded() {
    let tts = MockTts::new(24_000);
    let fail = Arc::clone(&tts.fail);
    fail.store(true, Ordering::SeqCst);
    let tts = std::sync::Mutex::new(Some(tts));
    let loader = MockLoader::new(move || tts.lock().unwrap().take().unwrap_or_else(|| MockTts::new(24_000)));
    let (orchestrator, _events) = SpeechOrchestrator::new(Arc::new(loader));
    let (mut session, _output) = session();

    let err = session
        .generate_new(&orchestrator, &SpeechRequest::new("Hello."))
        .await
        .unwrap_err();
    assert!(matches!(err, AudioError::Generation(_)));
    assert!(session.controller().asset().is_none());
    assert!(session.last_error().is_some());
}
