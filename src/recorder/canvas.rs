//! Canvas recorder
//!
//! Drives one host capture per session: picks the recording format, starts
//! the capture, and once stopped waits for the host's final data before
//! handing it to the download mechanism.

use super::state::{
    resolve_file_name, RecorderConfig, RecordingSession, RecordingState, SavedRecording,
};
use crate::capture::format::select_mime_type;
use crate::capture::traits::{
    CaptureHandle, CaptureOptions, RecordedMedia, RecordingHost, RecordingSink,
};
use crate::utils::error::{RecorderError, RecorderResult};
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::rc::Rc;
use tokio::sync::{broadcast, oneshot};

/// Events emitted during recording
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordingEvent {
    /// Capture started with the selected format
    Started { mime_type: String },
    /// Capture stopped, final data pending
    Stopped,
    /// Download triggered
    Saved { file_name: String, size_bytes: u64 },
    /// Error occurred
    Error(String),
}

struct ActiveSession<H: RecordingHost> {
    session: RecordingSession,
    capture: H::Capture,
    data_rx: oneshot::Receiver<H::Recording>,
}

/// Records a canvas through a [`RecordingHost`]
pub struct CanvasRecorder<H: RecordingHost> {
    host: Rc<H>,
    config: RecorderConfig,
    active: Option<ActiveSession<H>>,
    event_tx: broadcast::Sender<RecordingEvent>,
}

impl<H: RecordingHost> CanvasRecorder<H> {
    /// Create a new recorder on the given host
    pub fn new(host: H, config: RecorderConfig) -> Self {
        let (event_tx, _) = broadcast::channel(16);
        Self {
            host: Rc::new(host),
            config,
            active: None,
            event_tx,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    /// Get the current recording state
    pub fn state(&self) -> RecordingState {
        if self.active.is_some() {
            RecordingState::Recording
        } else {
            RecordingState::Idle
        }
    }

    /// The live session, if recording
    pub fn session(&self) -> Option<&RecordingSession> {
        self.active.as_ref().map(|active| &active.session)
    }

    /// MIME type of the live session, if recording
    pub fn mime_type(&self) -> Option<&str> {
        self.session().map(|session| session.mime_type.as_str())
    }

    /// Subscribe to recording events
    pub fn subscribe(&self) -> broadcast::Receiver<RecordingEvent> {
        self.event_tx.subscribe()
    }

    fn emit(&self, event: RecordingEvent) {
        let _ = self.event_tx.send(event);
    }

    /// Start recording.
    ///
    /// Fails with [`RecorderError::UnsupportedFormat`] before any capture is
    /// opened when the host supports none of the configured MIME types.
    pub fn start(&mut self) -> RecorderResult<&RecordingSession> {
        if self.active.is_some() {
            return Err(RecorderError::AlreadyRecording);
        }

        let host = &self.host;
        let Some(mime_type) = select_mime_type(
            self.config.mime_types.iter().map(String::as_str),
            |candidate| host.is_type_supported(candidate),
        ) else {
            tracing::warn!(candidates = ?self.config.mime_types, "No supported recording format");
            self.emit(RecordingEvent::Error(RecorderError::UnsupportedFormat.to_string()));
            return Err(RecorderError::UnsupportedFormat);
        };

        let options = CaptureOptions {
            mime_type: mime_type.to_string(),
            video_bits_per_second: self.config.effective_video_bits_per_second(),
        };

        let (sink, data_rx) = RecordingSink::channel();
        let capture = self
            .host
            .open_capture(&options, sink)
            .and_then(|mut capture| capture.start().map(|_| capture));
        let capture = match capture {
            Ok(capture) => capture,
            Err(e) => {
                tracing::error!("Failed to start capture: {}", e);
                self.emit(RecordingEvent::Error(e.to_string()));
                return Err(e);
            }
        };

        let session = RecordingSession::new(options.mime_type, options.video_bits_per_second);
        tracing::info!(
            session_id = %session.id,
            mime_type = %session.mime_type,
            video_bits_per_second = session.video_bits_per_second,
            "Recording started"
        );
        self.emit(RecordingEvent::Started {
            mime_type: session.mime_type.clone(),
        });

        let active = self.active.insert(ActiveSession {
            session,
            capture,
            data_rx,
        });
        Ok(&active.session)
    }

    /// Stop recording and save it under `file_name` (default `recording.webm`).
    ///
    /// The recorder is idle again as soon as this returns. The download
    /// happens when the returned [`PendingSave`] is awaited and the host has
    /// delivered its final data. If the host fails to stop, the session stays
    /// live and the call can be retried.
    pub fn stop_and_save(&mut self, file_name: Option<&str>) -> RecorderResult<PendingSave<H>> {
        let active = self.active.as_mut().ok_or(RecorderError::NotRecording)?;

        let file_name = resolve_file_name(file_name);
        tracing::info!(session_id = %active.session.id, "Stopping recording, saving as {}", file_name);

        if let Err(e) = active.capture.stop() {
            tracing::error!("Failed to stop capture: {}", e);
            self.emit(RecordingEvent::Error(e.to_string()));
            return Err(e);
        }

        let ActiveSession {
            session,
            capture,
            data_rx,
        } = self.active.take().ok_or(RecorderError::NotRecording)?;
        self.emit(RecordingEvent::Stopped);

        Ok(PendingSave {
            host: Rc::clone(&self.host),
            session,
            capture,
            data_rx,
            file_name,
            event_tx: self.event_tx.clone(),
        })
    }
}

/// A stopped recording waiting for the host's final data.
///
/// Dropping it releases the capture without downloading anything.
pub struct PendingSave<H: RecordingHost> {
    host: Rc<H>,
    session: RecordingSession,
    capture: H::Capture,
    data_rx: oneshot::Receiver<H::Recording>,
    file_name: String,
    event_tx: broadcast::Sender<RecordingEvent>,
}

impl<H: RecordingHost> PendingSave<H> {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn session(&self) -> &RecordingSession {
        &self.session
    }

    /// Wait for the final data and trigger the download
    pub async fn finish(self) -> RecorderResult<SavedRecording> {
        let PendingSave {
            host,
            session,
            capture,
            data_rx,
            file_name,
            event_tx,
        } = self;

        let recording = match data_rx.await {
            Ok(recording) => recording,
            Err(_) => {
                tracing::error!(session_id = %session.id, "Capture ended without data");
                let _ = event_tx.send(RecordingEvent::Error(RecorderError::Finalize.to_string()));
                return Err(RecorderError::Finalize);
            }
        };
        drop(capture);

        if let Err(e) = host.trigger_download(&recording, &file_name) {
            tracing::error!("Failed to trigger download: {}", e);
            let _ = event_tx.send(RecordingEvent::Error(e.to_string()));
            return Err(e);
        }

        let saved = SavedRecording {
            session_id: session.id,
            file_name,
            mime_type: session.mime_type.clone(),
            size_bytes: recording.size_bytes(),
            started_at: session.started_at,
            duration_ms: session.elapsed_ms(),
        };

        tracing::info!(
            session_id = %saved.session_id,
            size_bytes = saved.size_bytes,
            "Recording saved as {}",
            saved.file_name
        );
        let _ = event_tx.send(RecordingEvent::Saved {
            file_name: saved.file_name.clone(),
            size_bytes: saved.size_bytes,
        });

        Ok(saved)
    }
}

impl<H: RecordingHost + 'static> IntoFuture for PendingSave<H> {
    type Output = RecorderResult<SavedRecording>;
    type IntoFuture = Pin<Box<dyn Future<Output = Self::Output>>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(self.finish())
    }
}
