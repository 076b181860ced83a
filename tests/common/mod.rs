//! Shared test doubles: scripted playback, fixed probing and release counting

#![allow(dead_code)]

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use cortefacil::domain::errors::DomainError;
use cortefacil::domain::model::{BlobUrl, CaptureChunk, SourceVideo};
use cortefacil::engine::BlobRegistry;
use cortefacil::ports::{CaptureOptions, CaptureSession, PlaybackPort, ProbePort, ReleaseHook};
use cortefacil::HighlightInteractor;

pub const MP4: &str = "video/mp4";

pub fn source(duration: f64) -> SourceVideo {
    SourceVideo::new("/videos/talk.mp4", duration, MP4).unwrap()
}

/// Probe that always reports the same source
pub struct FixedProbe(pub SourceVideo);

#[async_trait]
impl ProbePort for FixedProbe {
    async fn probe_source(&self, _file_path: &Path) -> Result<SourceVideo, DomainError> {
        Ok(self.0.clone())
    }
}

/// Playback double that yields one chunk per timeslice of (paused) tokio time.
///
/// Chunk payloads are filled with the capture call number so assembled
/// output can be traced back to its segment.
#[derive(Default)]
pub struct ScriptedPlayback {
    pub chunk_bytes: usize,
    fail_calls: HashSet<usize>,
    empty_calls: HashSet<usize>,
    cancel_on_call: Option<(usize, CancellationToken)>,
    calls: AtomicUsize,
    starts: Mutex<Vec<f64>>,
    aborted: Arc<AtomicUsize>,
}

impl ScriptedPlayback {
    pub fn new() -> Self {
        Self {
            chunk_bytes: 4,
            ..Self::default()
        }
    }

    /// Fail to start playback on the given capture call
    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_calls.insert(call);
        self
    }

    /// Record nothing on the given capture call
    pub fn empty_on(mut self, call: usize) -> Self {
        self.empty_calls.insert(call);
        self
    }

    /// Cancel `token` as soon as the given capture call starts
    pub fn cancelling_on(mut self, call: usize, token: CancellationToken) -> Self {
        self.cancel_on_call = Some((call, token));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn starts(&self) -> Vec<f64> {
        self.starts.lock().unwrap().clone()
    }

    pub fn aborted(&self) -> usize {
        self.aborted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaybackPort for ScriptedPlayback {
    async fn start_capture(
        &self,
        source: &SourceVideo,
        start: f64,
        options: &CaptureOptions,
    ) -> Result<Box<dyn CaptureSession>, DomainError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        self.starts.lock().unwrap().push(start);

        if let Some((on_call, token)) = &self.cancel_on_call {
            if *on_call == call {
                token.cancel();
            }
        }
        if self.fail_calls.contains(&call) {
            return Err(DomainError::MediaDecode(format!(
                "Cannot play from {:.1}s",
                start
            )));
        }

        let chunk_bytes = if self.empty_calls.contains(&call) {
            0
        } else {
            self.chunk_bytes
        };

        Ok(Box::new(ScriptedSession {
            actual_start: start,
            playable: source.duration - start,
            played: Duration::ZERO,
            timeslice: options.timeslice,
            marker: call as u8,
            chunk_bytes,
            aborted: Arc::clone(&self.aborted),
        }))
    }
}

struct ScriptedSession {
    actual_start: f64,
    playable: f64,
    played: Duration,
    timeslice: Duration,
    marker: u8,
    chunk_bytes: usize,
    aborted: Arc<AtomicUsize>,
}

#[async_trait]
impl CaptureSession for ScriptedSession {
    fn actual_start(&self) -> f64 {
        self.actual_start
    }

    async fn next_chunk(&mut self) -> Option<Result<CaptureChunk, DomainError>> {
        if self.played.as_secs_f64() >= self.playable {
            return None;
        }
        tokio::time::sleep(self.timeslice).await;
        self.played += self.timeslice;
        Some(Ok(CaptureChunk {
            offset: self.played,
            data: vec![self.marker; self.chunk_bytes],
        }))
    }

    async fn stop(self: Box<Self>) -> Result<Vec<CaptureChunk>, DomainError> {
        Ok(vec![CaptureChunk {
            offset: self.played,
            data: vec![self.marker; self.chunk_bytes.min(1)],
        }])
    }

    async fn abort(self: Box<Self>) {
        self.aborted.fetch_add(1, Ordering::SeqCst);
    }
}

/// Release hook that remembers every released URL
#[derive(Default)]
pub struct CountingHook {
    released: Mutex<Vec<BlobUrl>>,
}

impl CountingHook {
    pub fn count(&self) -> usize {
        self.released.lock().unwrap().len()
    }

    pub fn released(&self) -> Vec<BlobUrl> {
        self.released.lock().unwrap().clone()
    }
}

impl ReleaseHook for CountingHook {
    fn on_release(&self, url: &BlobUrl) {
        self.released.lock().unwrap().push(url.clone());
    }
}

/// Interactor over the scripted playback with a counting hook installed
pub fn interactor(
    source: SourceVideo,
    playback: Arc<ScriptedPlayback>,
) -> (HighlightInteractor, BlobRegistry, Arc<CountingHook>) {
    let registry = BlobRegistry::new();
    let hook = Arc::new(CountingHook::default());
    registry.add_hook(hook.clone());

    let interactor = HighlightInteractor::new(
        Arc::new(FixedProbe(source)),
        playback,
        registry.clone(),
    );
    (interactor, registry, hook)
}
