//! Integration tests for the `PlaybackController` transport.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{MockOutput, drain};
use hushwave_audio::{
    AudioOutput, EncodedAudioAsset, PlaybackController, PlaybackEvent, RawAudioBuffer,
    TransportState, wav,
};
use tokio::sync::mpsc::UnboundedReceiver;

const RATE: u32 = 8_000;

fn asset(seconds: u32) -> Arc<EncodedAudioAsset> {
    let samples = vec![0.0; (seconds * RATE) as usize];
    Arc::new(wav::encode(&RawAudioBuffer::mono(samples, RATE)))
}

fn controller() -> (PlaybackController, UnboundedReceiver<PlaybackEvent>, Arc<MockOutput>) {
    let output = MockOutput::new();
    let (controller, events) =
        PlaybackController::new(Arc::clone(&output) as Arc<dyn AudioOutput>, 0.75);
    (controller, events, output)
}

#[test]
fn transport_is_inert_without_an_asset() {
    let (mut c, _events, output) = controller();
    c.play().unwrap();
    c.pause().unwrap();
    assert!(!c.is_playing());
    assert_eq!(c.state(), TransportState::Stopped);
    assert_eq!(output.opened(), 0);
    assert!(!c.metadata_ready());
}

#[test]
fn load_publishes_metadata_and_opens_a_paused_channel() {
    let (mut c, mut events, output) = controller();
    c.load(asset(20)).unwrap();

    assert!(c.metadata_ready());
    assert!((c.duration() - 20.0).abs() < 1e-9);
    assert!(c.current_time().abs() < f64::EPSILON);
    assert!(!c.is_playing());

    let (_, channel) = output.sole_channel();
    assert!(channel.is_wav);
    assert!(channel.paused);
    assert!(!channel.looped);
    assert!((channel.volume - 0.75).abs() < f32::EPSILON);

    let events = drain(&mut events);
    assert!(events.contains(&PlaybackEvent::MetadataReady { duration_secs: 20.0 }));
}

#[test]
fn play_and_pause_drive_the_channel() {
    let (mut c, mut events, output) = controller();
    c.load(asset(5)).unwrap();
    drain(&mut events);

    c.play().unwrap();
    let (id, channel) = output.sole_channel();
    assert!(!channel.paused);
    assert!(c.is_playing());
    assert_eq!(c.state(), TransportState::Playing);

    c.pause().unwrap();
    assert!(output.channel(id).unwrap().paused);
    assert!(!c.is_playing());
    assert_eq!(c.state(), TransportState::Paused);

    assert_eq!(
        drain(&mut events),
        vec![
            PlaybackEvent::StateChanged(TransportState::Playing),
            PlaybackEvent::StateChanged(TransportState::Paused),
        ]
    );
}

#[test]
fn seek_is_a_clamped_fraction_of_duration() {
    let (mut c, _events, output) = controller();
    c.load(asset(20)).unwrap();
    let (id, _) = output.sole_channel();

    c.seek(0.5).unwrap();
    assert!((c.current_time() - 10.0).abs() < 1e-9);
    assert_eq!(output.channel(id).unwrap().position, Duration::from_secs(10));

    c.seek(1.5).unwrap();
    assert!((c.current_time() - 20.0).abs() < 1e-9);

    c.seek(-0.3).unwrap();
    assert!(c.current_time().abs() < f64::EPSILON);
}

#[test]
fn set_volume_clamps_in_any_state() {
    let (mut c, _events, output) = controller();
    assert!((c.set_volume(4.0).unwrap() - 1.0).abs() < f32::EPSILON);

    c.load(asset(2)).unwrap();
    let (id, channel) = output.sole_channel();
    assert!((channel.volume - 1.0).abs() < f32::EPSILON);

    c.play().unwrap();
    assert!(c.set_volume(-1.0).unwrap().abs() < f32::EPSILON);
    assert!(output.channel(id).unwrap().volume.abs() < f32::EPSILON);
    assert!(c.volume().abs() < f32::EPSILON);
}

#[test]
fn tick_is_monotonic_and_ends_at_duration() {
    let (mut c, _events, output) = controller();
    c.load(asset(10)).unwrap();
    c.play().unwrap();
    let (id, _) = output.sole_channel();

    output.set_position(id, Duration::from_secs(3));
    assert!((c.tick().unwrap() - 3.0).abs() < 1e-9);

    // A backend that briefly reports an earlier position does not rewind.
    output.set_position(id, Duration::from_secs(2));
    assert!((c.tick().unwrap() - 3.0).abs() < 1e-9);

    output.set_position(id, Duration::from_secs(60));
    assert!((c.tick().unwrap() - 10.0).abs() < 1e-9);

    output.finish(id);
    c.tick().unwrap();
    assert_eq!(c.state(), TransportState::Ended);
    assert!(!c.is_playing());
    assert!((c.current_time() - c.duration()).abs() < 1e-9);
}

#[test]
fn play_after_end_restarts_from_zero() {
    let (mut c, _events, output) = controller();
    c.load(asset(4)).unwrap();
    c.play().unwrap();
    let (id, _) = output.sole_channel();
    output.set_position(id, Duration::from_secs(3));
    c.tick().unwrap();
    output.finish(id);
    c.tick().unwrap();
    assert_eq!(c.state(), TransportState::Ended);

    c.play().unwrap();
    assert!(c.is_playing());
    assert!(c.current_time().abs() < f64::EPSILON);
    let channel = output.channel(id).unwrap();
    assert_eq!(channel.position, Duration::ZERO);
    assert!(!channel.finished);
}

#[test]
fn seek_after_end_holds_the_channel_paused() {
    let (mut c, _events, output) = controller();
    c.load(asset(4)).unwrap();
    c.play().unwrap();
    let (id, _) = output.sole_channel();
    output.finish(id);
    c.tick().unwrap();
    assert_eq!(c.state(), TransportState::Ended);
    assert!(!output.channel(id).unwrap().paused);

    c.seek(0.5).unwrap();
    assert_eq!(c.state(), TransportState::Paused);
    assert!(!c.is_playing());
    assert!((c.current_time() - 2.0).abs() < 1e-9);
    let channel = output.channel(id).unwrap();
    assert!(channel.paused);
    assert!(!channel.finished);
    assert_eq!(channel.position, Duration::from_secs(2));

    c.play().unwrap();
    assert_eq!(c.state(), TransportState::Playing);
    assert!(!output.channel(id).unwrap().paused);
    assert_eq!(output.channel(id).unwrap().position, Duration::from_secs(2));
    assert!((c.current_time() - 2.0).abs() < 1e-9);

    c.pause().unwrap();
    assert!(output.channel(id).unwrap().paused);
}

#[test]
fn seek_while_playing_keeps_playing() {
    let (mut c, _events, output) = controller();
    c.load(asset(10)).unwrap();
    c.play().unwrap();
    c.seek(0.5).unwrap();
    assert!(c.is_playing());
    let (_, channel) = output.sole_channel();
    assert!(!channel.paused);
    assert_eq!(channel.position, Duration::from_secs(5));
}

#[test]
fn failed_load_keeps_the_previous_asset_and_channel() {
    let (mut c, mut events, output) = controller();
    let first = asset(3);
    c.load(Arc::clone(&first)).unwrap();
    c.seek(0.5).unwrap();
    let (id, _) = output.sole_channel();
    drain(&mut events);

    output.unplug();
    assert!(c.load(asset(8)).unwrap_err().is_device_failure());

    assert!(Arc::ptr_eq(c.asset().unwrap(), &first));
    assert!((c.duration() - 3.0).abs() < 1e-9);
    assert!((c.current_time() - 1.5).abs() < 1e-9);
    assert_eq!(output.sole_channel().0, id);
    assert_eq!(output.opened(), 1);
    assert!(drain(&mut events).is_empty());
}

#[test]
fn loading_a_new_asset_releases_the_previous_channel() {
    let (mut c, _events, output) = controller();
    c.load(asset(6)).unwrap();
    c.play().unwrap();
    c.seek(0.5).unwrap();

    c.load(asset(2)).unwrap();
    assert_eq!(output.live(), 1);
    assert_eq!(output.closed(), 1);
    assert!(!c.is_playing());
    assert!(c.current_time().abs() < f64::EPSILON);
    assert!((c.duration() - 2.0).abs() < 1e-9);
}

#[test]
fn device_loss_keeps_the_asset_for_a_later_retry() {
    let (mut c, _events, output) = controller();
    let loaded = asset(3);
    c.load(Arc::clone(&loaded)).unwrap();
    output.unplug();

    assert!(c.play().unwrap_err().is_device_failure());
    assert!(!c.is_playing());
    assert!(Arc::ptr_eq(c.asset().unwrap(), &loaded));
    assert_eq!(output.live(), 0);
}

#[test]
fn unload_and_drop_release_the_channel() {
    let (mut c, _events, output) = controller();
    c.load(asset(1)).unwrap();
    c.unload();
    assert_eq!(output.live(), 0);
    assert!(c.asset().is_none());

    c.load(asset(1)).unwrap();
    drop(c);
    assert_eq!(output.live(), 0);
}
