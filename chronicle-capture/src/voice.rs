//! Voice capture session
//!
//! A small state machine around audio capture: `Idle → Recording → Idle`
//! (cleared) or `Recording → Transcribing → Idle` once the finalized
//! artifact exists. Exactly one instance per publish session; transitions
//! are user- or completion-triggered only.

use crate::client::{ActiveRecording, AudioCaptureDevice, TranscriptionService};
use crate::error::{CaptureError, CaptureResult};
use crate::models::{AudioArtifact, RecordingState};
use chronicle_common::events::CaptureEvent;
use chronicle_common::{time, CaptureConfig, EventBus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

struct VoiceInner {
    state: RecordingState,
    active: Option<Box<dyn ActiveRecording>>,
    artifact: Option<AudioArtifact>,
    elapsed_seconds: u64,
    tick_task: Option<JoinHandle<()>>,
    /// Bumped by `clear()`; a finalization task carrying a stale epoch
    /// must not write into the torn-down session
    epoch: u64,
}

/// Audio capture state machine with elapsed-time reporting
///
/// Cloning shares the same session state.
#[derive(Clone)]
pub struct VoiceCaptureSession {
    inner: Arc<Mutex<VoiceInner>>,
    events: EventBus,
    device: Arc<dyn AudioCaptureDevice>,
    transcriber: Arc<dyn TranscriptionService>,
    tick_interval: Duration,
}

impl VoiceCaptureSession {
    pub fn new(
        config: &CaptureConfig,
        events: EventBus,
        device: Arc<dyn AudioCaptureDevice>,
        transcriber: Arc<dyn TranscriptionService>,
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(VoiceInner {
                state: RecordingState::Idle,
                active: None,
                artifact: None,
                elapsed_seconds: 0,
                tick_task: None,
                epoch: 0,
            })),
            events,
            device,
            transcriber,
            tick_interval: time::millis_to_duration(config.recording_tick_ms),
        }
    }

    /// Begin recording
    ///
    /// Fails with `ResourceUnavailable` when the capture device cannot be
    /// acquired; callers must surface this rather than silently continue.
    pub async fn start(&self) -> CaptureResult<()> {
        {
            let inner = self.inner.lock().await;
            if inner.state != RecordingState::Idle {
                return Err(CaptureError::Common(chronicle_common::Error::InvalidInput(
                    "recording already in progress".to_string(),
                )));
            }
        }

        // Acquire outside the lock; acquisition can take a while
        let recording = self.device.acquire().await?;

        let mut inner = self.inner.lock().await;
        inner.active = Some(recording);
        inner.artifact = None;
        inner.elapsed_seconds = 0;
        self.transition(&mut inner, RecordingState::Recording);

        let session = self.clone();
        inner.tick_task = Some(tokio::spawn(async move {
            session.run_ticks().await;
        }));
        Ok(())
    }

    /// Stop recording and hand the artifact off to transcription
    ///
    /// Finalization is asynchronous: the artifact is not available in the
    /// same tick this returns; its completion triggers the automatic
    /// transition into `Transcribing`. Safe to call from `Idle` (no-op);
    /// always clears the tick timer.
    pub async fn stop(&self) {
        let (active, epoch) = {
            let mut inner = self.inner.lock().await;
            if let Some(tick) = inner.tick_task.take() {
                tick.abort();
            }
            if inner.state != RecordingState::Recording {
                return;
            }
            (inner.active.take(), inner.epoch)
        };
        let Some(active) = active else {
            return;
        };

        let session = self.clone();
        tokio::spawn(async move {
            session.finalize_and_transcribe(active, epoch).await;
        });
    }

    /// Discard any artifact and return to `Idle`, releasing its backing
    /// resource
    pub async fn clear(&self) {
        let mut inner = self.inner.lock().await;
        if let Some(tick) = inner.tick_task.take() {
            tick.abort();
        }
        inner.active = None;
        inner.artifact = None;
        inner.elapsed_seconds = 0;
        // Invalidate any finalization still in flight from an earlier stop()
        inner.epoch += 1;
        if inner.state != RecordingState::Idle {
            self.transition(&mut inner, RecordingState::Idle);
        }
    }

    pub async fn state(&self) -> RecordingState {
        self.inner.lock().await.state
    }

    pub async fn elapsed_seconds(&self) -> u64 {
        self.inner.lock().await.elapsed_seconds
    }

    /// The finalized artifact, if one exists
    pub async fn artifact(&self) -> Option<AudioArtifact> {
        self.inner.lock().await.artifact.clone()
    }

    async fn run_ticks(&self) {
        loop {
            tokio::time::sleep(self.tick_interval).await;
            let mut inner = self.inner.lock().await;
            if inner.state != RecordingState::Recording {
                break;
            }
            inner.elapsed_seconds += 1;
            self.events.emit(CaptureEvent::RecordingTick {
                elapsed_seconds: inner.elapsed_seconds,
                timestamp: time::now(),
            });
        }
    }

    async fn finalize_and_transcribe(&self, active: Box<dyn ActiveRecording>, epoch: u64) {
        let artifact = match active.finalize().await {
            Ok(artifact) => artifact,
            Err(e) => {
                warn!(error = %e, "Recording finalization failed");
                let mut inner = self.inner.lock().await;
                if inner.epoch != epoch {
                    return;
                }
                self.events.emit(CaptureEvent::ActionFailed {
                    action: "recording".to_string(),
                    message: e.to_string(),
                    timestamp: time::now(),
                });
                self.transition(&mut inner, RecordingState::Idle);
                return;
            }
        };

        debug!(
            duration_seconds = artifact.duration_seconds,
            bytes = artifact.bytes.len(),
            "Recording finalized"
        );
        {
            let mut inner = self.inner.lock().await;
            if inner.epoch != epoch {
                // The session was cleared while finalization was in flight;
                // the artifact belongs to a torn-down recording
                debug!("Discarding recording finalized after clear");
                return;
            }
            inner.artifact = Some(artifact.clone());
            // Artifact availability is what triggers the hand-off
            self.transition(&mut inner, RecordingState::Transcribing);
        }

        let transcription = self.transcriber.transcribe_audio(&artifact).await;

        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            debug!("Discarding transcript for a cleared session");
            return;
        }
        match transcription {
            Ok(transcript) => {
                self.events.emit(CaptureEvent::TranscriptReady {
                    text: transcript.text,
                    timestamp: time::now(),
                });
            }
            Err(e) => {
                warn!(error = %e, "Transcription failed");
                self.events.emit(CaptureEvent::ActionFailed {
                    action: "transcription".to_string(),
                    message: e.to_string(),
                    timestamp: time::now(),
                });
            }
        }
        self.transition(&mut inner, RecordingState::Idle);
    }

    fn transition(&self, inner: &mut VoiceInner, new_state: RecordingState) {
        let old_state = inner.state;
        if old_state == new_state {
            return;
        }
        inner.state = new_state;
        debug!(%old_state, %new_state, "Recording state changed");
        self.events.emit(CaptureEvent::RecordingStateChanged {
            old_state,
            new_state,
            timestamp: time::now(),
        });
    }
}
