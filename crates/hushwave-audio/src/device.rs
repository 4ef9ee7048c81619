//! Process-wide output device.
//!
//! There is exactly one audio thread per process. [`init`] starts it on first
//! use and hands out the same sink to every later caller; [`teardown`] stops
//! all channels and joins the thread. After a teardown the next `init` opens
//! the device again.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use cpal::traits::{DeviceTrait, HostTrait};
use serde::Serialize;

use crate::audio_io::AudioOutput;
use crate::audio_thread::AudioThreadHandle;
use crate::error::AudioError;

static DEVICE: Mutex<Option<Arc<AudioThreadHandle>>> = Mutex::new(None);

fn slot() -> MutexGuard<'static, Option<Arc<AudioThreadHandle>>> {
    DEVICE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Open the default output device, or return the one already open.
pub fn init() -> Result<Arc<dyn AudioOutput>, AudioError> {
    let mut guard = slot();
    if let Some(handle) = guard.as_ref() {
        return Ok(Arc::clone(handle) as Arc<dyn AudioOutput>);
    }
    let handle = Arc::new(AudioThreadHandle::spawn()?);
    *guard = Some(Arc::clone(&handle));
    Ok(handle as Arc<dyn AudioOutput>)
}

/// Whether the output device is currently open.
pub fn is_initialized() -> bool {
    slot().is_some()
}

/// Stop every channel and close the output device.
///
/// Outstanding `Arc<dyn AudioOutput>` clones stay valid as values, but every
/// call on them fails with [`AudioError::AudioThreadDied`].
pub fn teardown() {
    let handle = slot().take();
    if let Some(handle) = handle {
        handle.shutdown();
        tracing::info!("Audio output torn down");
    }
}

/// Information about an available audio output device.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputDeviceInfo {
    /// Human-readable device name.
    pub name: String,
    /// Whether this is the system default output device.
    pub is_default: bool,
}

/// List available audio output devices.
pub fn list_output_devices() -> Result<Vec<OutputDeviceInfo>, AudioError> {
    let host = cpal::default_host();
    let default_name = host
        .default_output_device()
        .and_then(|d| d.name().ok())
        .unwrap_or_default();

    let devices = host
        .output_devices()
        .map_err(|e| AudioError::Device(e.to_string()))?;

    Ok(devices
        .filter_map(|device| device.name().ok())
        .map(|name| OutputDeviceInfo {
            is_default: name == default_name,
            name,
        })
        .collect())
}
