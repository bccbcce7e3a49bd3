use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use cpal::Sample;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use reqwest::Url;
use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{CODEC_TYPE_NULL, Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::Time;
use thiserror::Error;

use crate::events::types::{AppEvent, EngineEvent};
use crate::player::commands::{EngineCommand, TimeControl};
use crate::player::engine::MediaEngine;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("download failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unreadable media: {0}")]
    Media(#[from] SymphoniaError),
    #[error("media has no playable audio track")]
    NoAudioTrack,
    #[error("no audio output device available")]
    NoOutputDevice,
    #[error("could not open output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("could not start output stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
}

/// State shared between the handle and the engine thread.
///
/// The handle writes the parts a command changes immediately so the facade
/// reads its own writes; the thread fills in what only decoding can know.
#[derive(Debug)]
struct Shared {
    generation: u64,
    time_control: TimeControl,
    position: Duration,
    duration: Option<Duration>,
    loaded: bool,
    wants_play: bool,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            generation: 0,
            time_control: TimeControl::Waiting,
            position: Duration::ZERO,
            duration: None,
            loaded: false,
            wants_play: false,
        }
    }
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// The UI-side end of the engine thread.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    shared: Arc<Mutex<Shared>>,
}

impl EngineHandle {
    fn send(&self, cmd: EngineCommand) {
        if self.cmd_tx.send(cmd).is_err() {
            log::error!("Engine thread has exited, command dropped");
        }
    }
}

impl MediaEngine for EngineHandle {
    fn load(&mut self, url: &Url) {
        {
            let mut s = lock(&self.shared);
            *s = Shared {
                generation: s.generation + 1,
                ..Shared::default()
            };
        }
        self.send(EngineCommand::Load(url.clone()));
    }

    fn play(&mut self) {
        {
            let mut s = lock(&self.shared);
            s.wants_play = true;
            if s.loaded {
                s.time_control = TimeControl::Playing;
            }
        }
        self.send(EngineCommand::Play);
    }

    fn pause(&mut self) {
        {
            let mut s = lock(&self.shared);
            s.wants_play = false;
            if s.loaded {
                s.time_control = TimeControl::Paused;
            }
        }
        self.send(EngineCommand::Pause);
    }

    fn seek(&mut self, to: Duration) {
        {
            let mut s = lock(&self.shared);
            s.position = match s.duration {
                Some(total) => to.min(total),
                None => to,
            };
        }
        self.send(EngineCommand::Seek(to));
    }

    fn time_control(&self) -> TimeControl {
        lock(&self.shared).time_control
    }

    fn position(&self) -> Duration {
        lock(&self.shared).position
    }

    fn duration(&self) -> Option<Duration> {
        lock(&self.shared).duration
    }
}

struct AudioOutput {
    ring_buffer: Arc<Mutex<VecDeque<f32>>>,
    spec: SignalSpec,
    _stream: cpal::Stream,
    paused: Arc<AtomicBool>,
}

impl AudioOutput {
    fn new(spec: SignalSpec) -> Result<Self, EngineError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(EngineError::NoOutputDevice)?;

        let config = cpal::StreamConfig {
            channels: spec.channels.count() as u16,
            sample_rate: cpal::SampleRate(spec.rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let buffer_capacity = spec.rate as usize * spec.channels.count() * 5;
        let ring_buffer = Arc::new(Mutex::new(VecDeque::with_capacity(buffer_capacity)));
        let ring_buffer_clone = ring_buffer.clone();
        let paused = Arc::new(AtomicBool::new(true));
        let paused_clone = paused.clone();

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let mut buffer = ring_buffer_clone
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                let paused = paused_clone.load(Ordering::Relaxed);
                for sample in data.iter_mut() {
                    *sample = if paused {
                        Sample::EQUILIBRIUM
                    } else {
                        buffer.pop_front().unwrap_or(Sample::EQUILIBRIUM)
                    };
                }
            },
            |err| log::error!("Audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        Ok(AudioOutput {
            ring_buffer,
            spec,
            _stream: stream,
            paused,
        })
    }

    fn buffer(&self) -> MutexGuard<'_, VecDeque<f32>> {
        self.ring_buffer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_samples(&self, samples: &[f32]) {
        self.buffer().extend(samples.iter().copied());
    }

    fn buffer_len(&self) -> usize {
        self.buffer().len()
    }

    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    fn clear_buffer(&self) {
        self.buffer().clear();
    }

    fn channels(&self) -> usize {
        self.spec.channels.count().max(1)
    }
}

struct PlaybackContext {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    audio_output: AudioOutput,
    sample_buf: SampleBuffer<f32>,
    total_frames_decoded: u64,
    total_duration: Option<Duration>,
    at_end: bool,
    end_reported: bool,
}

impl PlaybackContext {
    /// Position of the sample currently leaving the speaker, not the decoder.
    fn played_position(&self) -> Duration {
        let rate = self.audio_output.spec.rate.max(1) as f64;
        let buffered = (self.audio_output.buffer_len() / self.audio_output.channels()) as u64;
        let frames = self.total_frames_decoded.saturating_sub(buffered);
        let position = Duration::from_secs_f64(frames as f64 / rate);
        match self.total_duration {
            Some(total) => position.min(total),
            None => position,
        }
    }
}

pub fn spawn(event_tx: mpsc::Sender<AppEvent>) -> (EngineHandle, JoinHandle<()>) {
    let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
    let shared = Arc::new(Mutex::new(Shared::default()));
    let handle = EngineHandle {
        cmd_tx,
        shared: shared.clone(),
    };

    let join = std::thread::spawn(move || run(cmd_rx, shared, event_tx));
    (handle, join)
}

fn run(
    cmd_rx: mpsc::Receiver<EngineCommand>,
    shared: Arc<Mutex<Shared>>,
    event_tx: mpsc::Sender<AppEvent>,
) {
    let mut ctx: Option<PlaybackContext> = None;
    let mut is_paused = true;
    let mut generation = 0u64;

    let emit = |event: EngineEvent| {
        let _ = event_tx.send(AppEvent::Engine(event));
    };

    loop {
        match cmd_rx.try_recv() {
            Ok(cmd) => match cmd {
                EngineCommand::Load(url) => {
                    if let Some(ref c) = ctx {
                        c.audio_output.clear_buffer();
                    }
                    ctx = None;
                    is_paused = true;
                    generation += 1;

                    match load_media(&url) {
                        Ok(new_ctx) => {
                            let mut s = lock(&shared);
                            if s.generation != generation {
                                // Superseded by a newer load still in the queue.
                                continue;
                            }
                            s.loaded = true;
                            s.duration = new_ctx.total_duration;
                            s.time_control = if s.wants_play {
                                TimeControl::Playing
                            } else {
                                TimeControl::Paused
                            };
                            is_paused = !s.wants_play;
                            new_ctx.audio_output.set_paused(is_paused);
                            let status = s.time_control;
                            drop(s);

                            log::info!(
                                "Loaded {} ({:?})",
                                url,
                                new_ctx.total_duration.map(|d| d.as_secs_f64())
                            );
                            if let Some(dur) = new_ctx.total_duration {
                                emit(EngineEvent::DurationLoaded(dur));
                            }
                            emit(EngineEvent::StatusChanged(status));
                            ctx = Some(new_ctx);
                        }
                        Err(e) => {
                            log::error!("Failed to load {}: {}", url, e);
                            emit(EngineEvent::Error(e.to_string()));
                        }
                    }
                }

                EngineCommand::Play => {
                    if let Some(ref c) = ctx {
                        c.audio_output.set_paused(false);
                        is_paused = false;
                    }
                }

                EngineCommand::Pause => {
                    if let Some(ref c) = ctx {
                        c.audio_output.set_paused(true);
                        is_paused = true;
                    }
                }

                EngineCommand::Seek(position) => {
                    if let Some(ref mut c) = ctx {
                        c.audio_output.clear_buffer();

                        let seek_to = SeekTo::Time {
                            time: Time::from(position.as_secs_f64()),
                            track_id: Some(c.track_id),
                        };

                        match c.format.seek(SeekMode::Accurate, seek_to) {
                            Ok(_seeked_to) => {
                                c.decoder.reset();
                                c.total_frames_decoded = (position.as_secs_f64()
                                    * c.audio_output.spec.rate as f64)
                                    as u64;
                                c.at_end = false;
                                c.end_reported = false;
                                lock(&shared).position = c.played_position();
                            }
                            Err(e) => {
                                log::warn!("Seek to {:.2}s failed: {}", position.as_secs_f64(), e);
                                emit(EngineEvent::Error(format!("Seek error: {}", e)));
                            }
                        }
                    }
                }
            },

            Err(TryRecvError::Empty) => {}

            Err(TryRecvError::Disconnected) => {
                log::debug!("Engine handle dropped, stopping engine thread");
                break;
            }
        }

        let Some(ref mut c) = ctx else {
            std::thread::sleep(Duration::from_millis(50));
            continue;
        };

        if is_paused {
            std::thread::sleep(Duration::from_millis(20));
            continue;
        }

        if c.at_end {
            if c.audio_output.buffer_len() == 0 && !c.end_reported {
                c.end_reported = true;
                c.audio_output.set_paused(true);
                is_paused = true;
                {
                    let mut s = lock(&shared);
                    s.time_control = TimeControl::Paused;
                    s.wants_play = false;
                    if let Some(total) = c.total_duration {
                        s.position = total;
                    }
                }
                emit(EngineEvent::Ended);
            } else {
                lock(&shared).position = c.played_position();
                std::thread::sleep(Duration::from_millis(20));
            }
            continue;
        }

        // Throttle if buffer is full
        let max_buffer = c.audio_output.spec.rate as usize * c.audio_output.channels() * 3;
        if c.audio_output.buffer_len() > max_buffer {
            lock(&shared).position = c.played_position();
            std::thread::sleep(Duration::from_millis(10));
            continue;
        }

        match c.format.next_packet() {
            Ok(packet) => {
                if packet.track_id() != c.track_id {
                    continue;
                }

                match c.decoder.decode(&packet) {
                    Ok(decoded) => {
                        let needed = decoded.capacity() * decoded.spec().channels.count();
                        if c.sample_buf.capacity() < needed {
                            c.sample_buf =
                                SampleBuffer::new(decoded.capacity() as u64, *decoded.spec());
                        }
                        c.sample_buf.copy_interleaved_ref(decoded);
                        c.total_frames_decoded +=
                            c.sample_buf.len() as u64 / c.audio_output.channels() as u64;
                        c.audio_output.write_samples(c.sample_buf.samples());
                        lock(&shared).position = c.played_position();
                    }
                    Err(SymphoniaError::DecodeError(e)) => {
                        log::debug!("Skipping undecodable packet: {}", e);
                    }
                    Err(e) => {
                        log::error!("Decode error: {}", e);
                        emit(EngineEvent::Error(format!("Decode error: {}", e)));
                    }
                }
            }

            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                log::debug!("Reached end of stream, draining output");
                c.at_end = true;
            }

            Err(e) => {
                log::error!("Read error: {}", e);
                emit(EngineEvent::Error(format!("Read error: {}", e)));
                c.at_end = true;
            }
        }
    }
}

fn fetch(url: &Url) -> Result<Vec<u8>, EngineError> {
    log::info!("Fetching {}", url);
    let bytes = reqwest::blocking::Client::new()
        .get(url.clone())
        .send()?
        .error_for_status()?
        .bytes()?;
    log::debug!("Fetched {} bytes", bytes.len());
    Ok(bytes.to_vec())
}

fn load_media(url: &Url) -> Result<PlaybackContext, EngineError> {
    let data = fetch(url)?;

    let codecs = symphonia::default::get_codecs();
    let probe = symphonia::default::get_probe();

    let mss = MediaSourceStream::new(Box::new(Cursor::new(data)), Default::default());

    let mut hint = Hint::new();
    let extension = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .and_then(|name| name.rsplit_once('.'))
        .map(|(_, ext)| ext.to_string());
    if let Some(ref ext) = extension {
        hint.with_extension(ext);
    }

    let probed = probe.format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL && t.codec_params.sample_rate.is_some())
        .ok_or(EngineError::NoAudioTrack)?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let total_duration = codec_params.time_base.and_then(|tb| {
        codec_params.n_frames.map(|frames| {
            let time = tb.calc_time(frames);
            Duration::from_secs_f64(time.seconds as f64 + time.frac)
        })
    });

    let mut decoder = codecs.make(&codec_params, &DecoderOptions::default())?;

    // Decode packets until we get valid audio (handles decoder warm-up)
    let (spec, first_samples) = loop {
        let packet = format.next_packet()?;

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let mut sample_buf = SampleBuffer::new(decoded.capacity() as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);
                break (spec, sample_buf);
            }
            Err(SymphoniaError::DecodeError(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    };

    let audio_output = AudioOutput::new(spec)?;
    audio_output.write_samples(first_samples.samples());

    let initial_frames = first_samples.len() as u64 / audio_output.channels() as u64;
    let sample_buf = SampleBuffer::new(first_samples.capacity() as u64, spec);

    Ok(PlaybackContext {
        format,
        decoder,
        track_id,
        audio_output,
        sample_buf,
        total_frames_decoded: initial_frames,
        total_duration,
        at_end: false,
        end_reported: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "https://example.com/movie.mp4";

    fn handle() -> (
        EngineHandle,
        Arc<Mutex<Shared>>,
        mpsc::Receiver<EngineCommand>,
    ) {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let shared = Arc::new(Mutex::new(Shared::default()));
        let handle = EngineHandle {
            cmd_tx,
            shared: shared.clone(),
        };
        (handle, shared, cmd_rx)
    }

    fn url() -> Url {
        Url::parse(URL).unwrap()
    }

    #[test]
    fn test_play_before_load_completes_keeps_waiting() {
        let (mut engine, shared, cmd_rx) = handle();
        engine.play();

        assert_eq!(engine.time_control(), TimeControl::Waiting);
        assert!(lock(&shared).wants_play);

        engine.pause();
        assert_eq!(engine.time_control(), TimeControl::Waiting);
        assert!(!lock(&shared).wants_play);

        let sent: Vec<_> = cmd_rx.try_iter().collect();
        assert!(matches!(
            sent.as_slice(),
            [EngineCommand::Play, EngineCommand::Pause]
        ));
    }

    #[test]
    fn test_loaded_engine_reads_its_own_writes() {
        let (mut engine, shared, _cmd_rx) = handle();
        lock(&shared).loaded = true;

        engine.play();
        assert_eq!(engine.time_control(), TimeControl::Playing);

        engine.pause();
        assert_eq!(engine.time_control(), TimeControl::Paused);
    }

    #[test]
    fn test_load_resets_snapshot_and_bumps_generation() {
        let (mut engine, shared, cmd_rx) = handle();
        {
            let mut s = lock(&shared);
            s.generation = 3;
            s.loaded = true;
            s.wants_play = true;
            s.time_control = TimeControl::Playing;
            s.position = Duration::from_secs(42);
            s.duration = Some(Duration::from_secs(120));
        }

        engine.load(&url());

        let s = lock(&shared);
        assert_eq!(s.generation, 4);
        assert!(!s.loaded);
        assert!(!s.wants_play);
        assert_eq!(s.time_control, TimeControl::Waiting);
        assert_eq!(s.position, Duration::ZERO);
        assert_eq!(s.duration, None);
        drop(s);

        match cmd_rx.try_recv() {
            Ok(EngineCommand::Load(sent)) => assert_eq!(sent.as_str(), URL),
            other => panic!("expected a load command, got {:?}", other),
        }
    }

    #[test]
    fn test_seek_clamps_snapshot_but_sends_request() {
        let (mut engine, shared, cmd_rx) = handle();
        lock(&shared).duration = Some(Duration::from_secs_f64(120.9));

        engine.seek(Duration::from_secs(500));

        assert_eq!(engine.position(), Duration::from_secs_f64(120.9));
        assert!(matches!(
            cmd_rx.try_recv(),
            Ok(EngineCommand::Seek(to)) if to == Duration::from_secs(500)
        ));
    }

    #[test]
    fn test_seek_without_duration_is_unclamped() {
        let (mut engine, _shared, cmd_rx) = handle();
        engine.seek(Duration::from_secs(30));

        assert_eq!(engine.position(), Duration::from_secs(30));
        assert_eq!(engine.duration(), None);
        assert!(matches!(cmd_rx.try_recv(), Ok(EngineCommand::Seek(_))));
    }

    #[test]
    fn test_commands_after_thread_exit_are_dropped() {
        let (mut engine, shared, cmd_rx) = handle();
        drop(cmd_rx);
        lock(&shared).loaded = true;

        engine.load(&url());
        engine.play();
        engine.seek(Duration::from_secs(1));

        assert_eq!(lock(&shared).generation, 1);
        assert_eq!(engine.position(), Duration::from_secs(1));
    }

    #[test]
    fn test_failed_load_reports_error_and_stays_waiting() {
        let (event_tx, event_rx) = mpsc::channel();
        let (mut engine, join) = spawn(event_tx);

        // Rejected by the HTTP client before any connection is made
        engine.load(&Url::parse("ftp://example.com/movie.mp4").unwrap());
        engine.play();

        match event_rx.recv_timeout(Duration::from_secs(10)) {
            Ok(AppEvent::Engine(EngineEvent::Error(_))) => {}
            other => panic!("expected an engine error, got {:?}", other),
        }
        assert_eq!(engine.time_control(), TimeControl::Waiting);
        assert_eq!(engine.duration(), None);

        drop(engine);
        join.join().unwrap();
    }
}
