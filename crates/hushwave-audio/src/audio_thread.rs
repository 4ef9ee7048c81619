//! Dedicated audio output thread.
//!
//! `rodio::OutputStream` is `!Send` on some platforms, so the stream and every
//! `Sink` created from it live on one OS thread for their entire lifetime.
//! [`AudioThreadHandle`] is the `Send + Sync` proxy: each [`AudioOutput`]
//! call becomes an [`AudioCommand`] sent to the thread, with a one-shot reply
//! channel where the caller needs an answer.

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::{Mutex, mpsc};
use std::thread;
use std::time::Duration;

use rodio::buffer::SamplesBuffer;
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

use crate::audio_io::{AudioOutput, ChannelId, ChannelOptions, ChannelStatus, Clip};
use crate::error::AudioError;

// ── Commands ───────────────────────────────────────────────────────

type Reply<T> = mpsc::Sender<Result<T, AudioError>>;

/// A command sent to the audio thread.
enum AudioCommand {
    /// Create a sink for `clip` and register it under a fresh id.
    Open {
        clip: Clip,
        options: ChannelOptions,
        reply: Reply<ChannelId>,
    },

    SetVolume {
        channel: ChannelId,
        volume: f32,
        reply: Reply<()>,
    },

    Pause {
        channel: ChannelId,
        reply: Reply<()>,
    },

    Resume {
        channel: ChannelId,
        reply: Reply<()>,
    },

    Seek {
        channel: ChannelId,
        position: Duration,
        reply: Reply<()>,
    },

    Status {
        channel: ChannelId,
        reply: Reply<ChannelStatus>,
    },

    /// Stop and drop a sink (fire-and-forget).
    Close { channel: ChannelId },

    /// Stop every sink, drop the stream and exit the thread.
    Shutdown,
}

// ── Handle (Send + Sync proxy) ─────────────────────────────────────

/// `Send + Sync` handle to the dedicated audio output thread.
///
/// Request/reply methods block the caller until the thread answers, which is
/// local channel latency plus the sink operation itself.
pub struct AudioThreadHandle {
    cmd_tx: mpsc::Sender<AudioCommand>,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
}

impl AudioThreadHandle {
    /// Spawn the audio thread, open the default output device and return the
    /// handle.
    ///
    /// Device errors are propagated back through a one-shot init channel.
    pub fn spawn() -> Result<Self, AudioError> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<AudioCommand>();
        let (init_tx, init_rx) = mpsc::channel::<Result<(), AudioError>>();

        let thread = thread::Builder::new()
            .name("hushwave-audio".into())
            .spawn(move || Self::run(&cmd_rx, &init_tx))
            .map_err(|e| AudioError::Device(format!("failed to spawn audio thread: {e}")))?;

        init_rx.recv().map_err(|_| AudioError::AudioThreadDied)??;

        Ok(Self {
            cmd_tx,
            thread: Mutex::new(Some(thread)),
        })
    }

    /// Stop every channel, close the device and join the thread.
    ///
    /// Safe to call more than once; later calls do nothing.
    pub fn shutdown(&self) {
        let handle = match self.thread.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            let _ = self.cmd_tx.send(AudioCommand::Shutdown);
            if handle.join().is_err() {
                tracing::warn!("Audio thread panicked during shutdown");
            }
        }
    }

    // ── Internal helpers ───────────────────────────────────────────

    /// Send a command and block on its reply. Channel failures map to
    /// [`AudioError::AudioThreadDied`].
    fn send_and_recv<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> AudioCommand,
    ) -> Result<T, AudioError> {
        let (tx, rx) = mpsc::channel();
        self.cmd_tx
            .send(build(tx))
            .map_err(|_| AudioError::AudioThreadDied)?;
        rx.recv().map_err(|_| AudioError::AudioThreadDied)?
    }

    // ── Audio thread event loop ────────────────────────────────────

    fn run(cmd_rx: &mpsc::Receiver<AudioCommand>, init_tx: &mpsc::Sender<Result<(), AudioError>>) {
        let (stream, stream_handle) = match OutputStream::try_default() {
            Ok(pair) => pair,
            Err(e) => {
                let _ = init_tx.send(Err(AudioError::Device(e.to_string())));
                return;
            }
        };

        if init_tx.send(Ok(())).is_err() {
            return;
        }
        tracing::info!("Audio output initialized on default device");

        let mut bank = ChannelBank::new(stream_handle);

        while let Ok(cmd) = cmd_rx.recv() {
            match cmd {
                AudioCommand::Open {
                    clip,
                    options,
                    reply,
                } => {
                    let _ = reply.send(bank.open(clip, options));
                }

                AudioCommand::SetVolume {
                    channel,
                    volume,
                    reply,
                } => {
                    let _ = reply.send(bank.with(channel, |entry| {
                        entry.sink.set_volume(volume.clamp(0.0, 1.0));
                        Ok(())
                    }));
                }

                AudioCommand::Pause { channel, reply } => {
                    let _ = reply.send(bank.with(channel, |entry| {
                        entry.sink.pause();
                        Ok(())
                    }));
                }

                AudioCommand::Resume { channel, reply } => {
                    let _ = reply.send(bank.with(channel, |entry| {
                        entry.rearm()?;
                        entry.sink.play();
                        Ok(())
                    }));
                }

                AudioCommand::Seek {
                    channel,
                    position,
                    reply,
                } => {
                    let _ = reply.send(bank.with(channel, |entry| entry.seek(position)));
                }

                AudioCommand::Status { channel, reply } => {
                    let _ = reply.send(bank.with(channel, |entry| Ok(entry.status())));
                }

                AudioCommand::Close { channel } => bank.close(channel),

                AudioCommand::Shutdown => break,
            }
        }

        bank.clear();
        drop(stream);
        tracing::debug!("Audio thread shutting down");
    }
}

impl AudioOutput for AudioThreadHandle {
    fn open(&self, clip: Clip, options: ChannelOptions) -> Result<ChannelId, AudioError> {
        self.send_and_recv(|reply| AudioCommand::Open {
            clip,
            options,
            reply,
        })
    }

    fn set_volume(&self, channel: ChannelId, volume: f32) -> Result<(), AudioError> {
        self.send_and_recv(|reply| AudioCommand::SetVolume {
            channel,
            volume,
            reply,
        })
    }

    fn pause(&self, channel: ChannelId) -> Result<(), AudioError> {
        self.send_and_recv(|reply| AudioCommand::Pause { channel, reply })
    }

    fn resume(&self, channel: ChannelId) -> Result<(), AudioError> {
        self.send_and_recv(|reply| AudioCommand::Resume { channel, reply })
    }

    fn seek(&self, channel: ChannelId, position: Duration) -> Result<(), AudioError> {
        self.send_and_recv(|reply| AudioCommand::Seek {
            channel,
            position,
            reply,
        })
    }

    fn status(&self, channel: ChannelId) -> Result<ChannelStatus, AudioError> {
        self.send_and_recv(|reply| AudioCommand::Status { channel, reply })
    }

    fn close(&self, channel: ChannelId) {
        let _ = self.cmd_tx.send(AudioCommand::Close { channel });
    }
}

impl Drop for AudioThreadHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ── Thread-local channel state ─────────────────────────────────────

/// All sinks owned by the audio thread.
struct ChannelBank {
    stream_handle: OutputStreamHandle,
    channels: HashMap<ChannelId, ChannelEntry>,
    next_id: u64,
}

struct ChannelEntry {
    sink: Sink,
    clip: Clip,
    looped: bool,
}

impl ChannelBank {
    fn new(stream_handle: OutputStreamHandle) -> Self {
        Self {
            stream_handle,
            channels: HashMap::new(),
            next_id: 1,
        }
    }

    fn open(&mut self, clip: Clip, options: ChannelOptions) -> Result<ChannelId, AudioError> {
        let sink =
            Sink::try_new(&self.stream_handle).map_err(|e| AudioError::Device(e.to_string()))?;
        sink.set_volume(options.volume.clamp(0.0, 1.0));
        if options.start_paused {
            sink.pause();
        }

        let entry = ChannelEntry {
            sink,
            clip,
            looped: options.looped,
        };
        entry.append_clip()?;

        let id = ChannelId(self.next_id);
        self.next_id += 1;
        self.channels.insert(id, entry);

        tracing::debug!(channel = %id, looped = options.looped, "Opened output channel");
        Ok(id)
    }

    fn with<T>(
        &mut self,
        channel: ChannelId,
        f: impl FnOnce(&mut ChannelEntry) -> Result<T, AudioError>,
    ) -> Result<T, AudioError> {
        let entry = self
            .channels
            .get_mut(&channel)
            .ok_or_else(|| AudioError::Device(format!("channel {channel} is not open")))?;
        f(entry)
    }

    fn close(&mut self, channel: ChannelId) {
        if let Some(entry) = self.channels.remove(&channel) {
            entry.sink.stop();
            tracing::debug!(channel = %channel, "Closed output channel");
        }
    }

    fn clear(&mut self) {
        for (_, entry) in self.channels.drain() {
            entry.sink.stop();
        }
    }
}

impl ChannelEntry {
    /// Queue the clip on the sink.
    fn append_clip(&self) -> Result<(), AudioError> {
        match &self.clip {
            Clip::Pcm(buffer) => {
                let source = SamplesBuffer::new(
                    buffer.channels(),
                    buffer.sample_rate(),
                    buffer.samples().to_vec(),
                );
                if self.looped {
                    self.sink.append(source.repeat_infinite());
                } else {
                    self.sink.append(source);
                }
            }
            Clip::Wav(asset) => {
                let decoder = Decoder::new_wav(Cursor::new(asset.shared_bytes()))
                    .map_err(|e| AudioError::InvalidWav(e.to_string()))?;
                if self.looped {
                    self.sink.append(decoder.repeat_infinite());
                } else {
                    self.sink.append(decoder);
                }
            }
        }
        Ok(())
    }

    /// A drained one-shot sink has dropped its source; queue it again so the
    /// channel can be replayed or seeked.
    ///
    /// The re-queued clip starts paused. Only an explicit resume plays it.
    fn rearm(&self) -> Result<(), AudioError> {
        if self.sink.empty() {
            self.sink.pause();
            self.append_clip()?;
        }
        Ok(())
    }

    fn seek(&self, position: Duration) -> Result<(), AudioError> {
        self.rearm()?;
        self.sink
            .try_seek(position)
            .map_err(|e| AudioError::Device(format!("seek failed: {e}")))
    }

    fn status(&self) -> ChannelStatus {
        ChannelStatus {
            position: self.sink.get_pos(),
            finished: !self.looped && self.sink.empty(),
        }
    }
}
