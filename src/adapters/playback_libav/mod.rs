//! Real-time playback capture using libav
//!
//! A capture session plays the source from a position while a recorder
//! writes what is played into a streamable container. Packets are released
//! at the pace of the wall clock and the recorder hands over whatever bytes
//! it has produced every timeslice, so the recorded length follows elapsed
//! time the same way a screen or element recorder would.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use ffmpeg_next::{codec, encoder, format, media, Dictionary, Rational};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

/// Longest single sleep while waiting for a packet to become due
const PACING_STEP: Duration = Duration::from_millis(10);

/// Chunks buffered between the playback thread and the session
const CHUNK_BUFFER: usize = 16;

type ChunkResult = Result<CaptureChunk, DomainError>;

fn libav(context: &'static str) -> impl Fn(ffmpeg_next::Error) -> DomainError {
    move |e| DomainError::MediaDecode(format!("Failed to {}: {}", context, e))
}

/// LibAV-based playback and recording adapter
pub struct LibavPlaybackAdapter;

impl LibavPlaybackAdapter {
    /// Create new LibAV playback adapter
    pub fn new() -> Result<Self, DomainError> {
        ffmpeg_next::init()
            .map_err(|e| DomainError::MediaDecode(format!("FFmpeg initialization failed: {}", e)))?;
        Ok(Self)
    }
}

#[async_trait]
impl PlaybackPort for LibavPlaybackAdapter {
    async fn start_capture(
        &self,
        source: &SourceVideo,
        start: f64,
        options: &CaptureOptions,
    ) -> Result<Box<dyn CaptureSession>, DomainError> {
        let container = source.container().ok_or_else(|| {
            DomainError::MediaDecode(format!("Cannot record {} output", source.mime_type))
        })?;

        let stop = Arc::new(AtomicBool::new(false));
        let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_BUFFER);
        let (ready_tx, ready_rx) = oneshot::channel();

        let worker = PlaybackWorker {
            path: source.path.clone(),
            container,
            start,
            muted: options.muted,
            timeslice: options.timeslice,
            stop: Arc::clone(&stop),
        };
        let handle = tokio::task::spawn_blocking(move || worker.run(ready_tx, chunk_tx));

        let actual_start = match ready_rx.await {
            Ok(result) => result?,
            Err(_) => {
                let _ = handle.await;
                return Err(DomainError::MediaDecode(
                    "Playback thread exited before starting".to_string(),
                ));
            }
        };

        debug!(requested = start, actual_start, "Playback started");
        Ok(Box::new(LibavCaptureSession {
            actual_start,
            chunks: chunk_rx,
            stop,
            worker: handle,
        }))
    }
}

/// Session handle held by the extractor
pub struct LibavCaptureSession {
    actual_start: f64,
    chunks: mpsc::Receiver<ChunkResult>,
    stop: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

#[async_trait]
impl CaptureSession for LibavCaptureSession {
    fn actual_start(&self) -> f64 {
        self.actual_start
    }

    async fn next_chunk(&mut self) -> Option<ChunkResult> {
        self.chunks.recv().await
    }

    async fn stop(self: Box<Self>) -> Result<Vec<CaptureChunk>, DomainError> {
        let LibavCaptureSession {
            mut chunks,
            stop,
            worker,
            ..
        } = *self;
        stop.store(true, Ordering::Relaxed);

        // The recorder finalizes its output and closes the channel on exit
        let mut remaining = Vec::new();
        while let Some(chunk) = chunks.recv().await {
            remaining.push(chunk?);
        }

        worker
            .await
            .map_err(|e| DomainError::MediaDecode(format!("Playback thread failed: {}", e)))?;
        Ok(remaining)
    }

    async fn abort(self: Box<Self>) {
        let LibavCaptureSession {
            chunks,
            stop,
            worker,
            ..
        } = *self;
        stop.store(true, Ordering::Relaxed);
        drop(chunks);
        let _ = worker.await;
    }
}

/// Hands newly written recorder bytes to the session
struct ChunkTap {
    file: File,
    read: u64,
    sender: mpsc::Sender<ChunkResult>,
    last: Instant,
    timeslice: Duration,
}

impl ChunkTap {
    fn new(file: File, sender: mpsc::Sender<ChunkResult>, timeslice: Duration) -> Self {
        Self {
            file,
            read: 0,
            sender,
            last: Instant::now(),
            timeslice,
        }
    }

    fn restart(&mut self, at: Instant) {
        self.last = at;
    }

    /// Emit a chunk once a timeslice has passed. `false` once nobody listens.
    fn tick(&mut self, octx: &mut format::context::Output, clock: Instant) -> DomainResult<bool> {
        if self.last.elapsed() < self.timeslice {
            return Ok(true);
        }
        self.flush(octx, clock)
    }

    fn flush(&mut self, octx: &mut format::context::Output, clock: Instant) -> DomainResult<bool> {
        unsafe {
            let pb = (*octx.as_mut_ptr()).pb;
            if !pb.is_null() {
                ffmpeg_next::ffi::avio_flush(pb);
            }
        }
        self.last = Instant::now();

        let mut data = Vec::new();
        self.file.seek(SeekFrom::Start(self.read))?;
        self.file.read_to_end(&mut data)?;
        if data.is_empty() {
            return Ok(true);
        }
        self.read += data.len() as u64;

        trace!(bytes = data.len(), total = self.read, "Recorder chunk");
        let chunk = CaptureChunk {
            offset: clock.elapsed(),
            data,
        };
        Ok(self.sender.blocking_send(Ok(chunk)).is_ok())
    }
}

/// Blocking playback loop that remuxes the source into the recorder output
struct PlaybackWorker {
    path: PathBuf,
    container: ContainerFormat,
    start: f64,
    muted: bool,
    timeslice: Duration,
    stop: Arc<AtomicBool>,
}

impl PlaybackWorker {
    fn run(self, ready: oneshot::Sender<DomainResult<f64>>, chunks: mpsc::Sender<ChunkResult>) {
        let mut ready = Some(ready);
        if let Err(e) = self.play(&mut ready, &chunks) {
            match ready.take() {
                Some(ready) => {
                    let _ = ready.send(Err(e));
                }
                None => {
                    let _ = chunks.blocking_send(Err(e));
                }
            }
        }
    }

    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    fn play(
        &self,
        ready: &mut Option<oneshot::Sender<DomainResult<f64>>>,
        chunks: &mpsc::Sender<ChunkResult>,
    ) -> DomainResult<()> {
        let mut ictx = format::input(&self.path).map_err(libav("open source"))?;

        let video_index = ictx
            .streams()
            .best(media::Type::Video)
            .map(|stream| stream.index())
            .ok_or_else(|| DomainError::MediaDecode("No video stream found".to_string()))?;
        let audio_index = if self.muted {
            None
        } else {
            ictx.streams()
                .best(media::Type::Audio)
                .map(|stream| stream.index())
        };

        let temp = tempfile::Builder::new()
            .prefix("cortefacil-capture-")
            .suffix(&format!(".{}", self.container.extension()))
            .tempfile()?;
        let mut octx =
            format::output_as(temp.path(), self.container.muxer()).map_err(libav("create recorder"))?;

        let mut mapping: Vec<Option<usize>> = vec![None; ictx.nb_streams() as usize];
        for ist in ictx.streams() {
            if ist.index() != video_index && Some(ist.index()) != audio_index {
                continue;
            }
            let mut ost = octx
                .add_stream(encoder::find(codec::Id::None))
                .map_err(libav("add recorder stream"))?;
            ost.set_parameters(ist.parameters());
            // Source codec tags are not valid in every target container
            unsafe {
                (*ost.parameters().as_mut_ptr()).codec_tag = 0;
            }
            mapping[ist.index()] = Some(ost.index());
        }

        if self.start > 0.0 {
            let target = (self.start * ffmpeg_next::ffi::AV_TIME_BASE as f64) as i64;
            ictx.seek(target, ..target).map_err(libav("seek source"))?;
        }

        if self.container.needs_fragmenting() {
            let mut options = Dictionary::new();
            options.set("movflags", "frag_keyframe+empty_moov+default_base_moof");
            octx.write_header_with(options)
                .map_err(libav("write recorder header"))?;
        } else {
            octx.write_header().map_err(libav("write recorder header"))?;
        }
        let out_time_bases: Vec<Rational> = octx.streams().map(|stream| stream.time_base()).collect();

        let mut tap = ChunkTap::new(File::open(temp.path())?, chunks.clone(), self.timeslice);
        let mut clock = Instant::now();
        let mut origin: Option<f64> = None;

        'packets: for (ist, mut packet) in ictx.packets() {
            if self.stopped() {
                break;
            }
            let Some(out_index) = mapping[ist.index()] else {
                continue;
            };

            let in_time_base = ist.time_base();
            let position = packet
                .dts()
                .or(packet.pts())
                .map(|ts| ts as f64 * f64::from(in_time_base));

            // Playback begins at the first video packet after the seek
            let origin_secs = match origin {
                Some(origin_secs) => origin_secs,
                None => {
                    if ist.index() != video_index {
                        continue;
                    }
                    let origin_secs = position.unwrap_or(self.start).max(0.0);
                    origin = Some(origin_secs);
                    clock = Instant::now();
                    tap.restart(clock);
                    if let Some(ready) = ready.take() {
                        if ready.send(Ok(origin_secs)).is_err() {
                            return Ok(());
                        }
                    }
                    origin_secs
                }
            };

            let due = Duration::from_secs_f64(
                (position.unwrap_or(origin_secs) - origin_secs).max(0.0),
            );
            while clock.elapsed() < due {
                if self.stopped() {
                    break 'packets;
                }
                if !tap.tick(&mut octx, clock)? {
                    return Ok(());
                }
                std::thread::sleep(due.saturating_sub(clock.elapsed()).min(PACING_STEP));
            }

            let shift = (origin_secs / f64::from(in_time_base)).round() as i64;
            packet.set_pts(packet.pts().map(|ts| ts - shift));
            packet.set_dts(packet.dts().map(|ts| ts - shift));
            if packet.dts().is_some_and(|ts| ts < 0) {
                continue;
            }

            packet.rescale_ts(in_time_base, out_time_bases[out_index]);
            packet.set_position(-1);
            packet.set_stream(out_index);
            packet
                .write_interleaved(&mut octx)
                .map_err(libav("record packet"))?;

            if !tap.tick(&mut octx, clock)? {
                return Ok(());
            }
        }

        if ready.is_some() {
            return Err(DomainError::MediaDecode(format!(
                "No video frames at {:.3}s",
                self.start
            )));
        }

        octx.write_trailer().map_err(libav("finalize recorder"))?;
        tap.flush(&mut octx, clock)?;
        debug!(
            bytes = tap.read,
            elapsed_ms = clock.elapsed().as_millis() as u64,
            "Recorder finished"
        );
        Ok(())
    }
}
