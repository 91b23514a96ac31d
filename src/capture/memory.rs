//! In-memory host
//!
//! A host that encodes nothing: it reports a configurable set of supported
//! formats, "records" a fixed payload, and keeps every download it was asked
//! to perform. Clones share state, so a caller can hand one clone to the
//! recorder and inspect the other.

use super::traits::{CaptureHandle, CaptureOptions, RecordedMedia, RecordingHost, RecordingSink};
use crate::utils::error::{RecorderError, RecorderResult};
use parking_lot::Mutex;
use std::sync::Arc;

/// Recording produced by [`MemoryHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryRecording {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl RecordedMedia for MemoryRecording {
    fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// A download the host was asked to trigger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRecord {
    pub file_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Default)]
struct HostState {
    supported: Vec<String>,
    payload: Vec<u8>,
    withhold_final_data: bool,
    manual_delivery: bool,
    stop_failures: Vec<String>,
    download_failure: Option<String>,
    opened: Vec<CaptureOptions>,
    live_captures: usize,
    held: Vec<(RecordingSink<MemoryRecording>, MemoryRecording)>,
    downloads: Vec<DownloadRecord>,
}

/// Fake host backed by memory
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    state: Arc<Mutex<HostState>>,
}

impl MemoryHost {
    /// Host that supports exactly the given MIME types
    pub fn supporting<I, S>(mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let host = Self::default();
        host.state.lock().supported = mime_types.into_iter().map(Into::into).collect();
        host
    }

    /// Bytes every capture produces when stopped
    pub fn with_payload(self, payload: impl Into<Vec<u8>>) -> Self {
        self.state.lock().payload = payload.into();
        self
    }

    /// Captures end without ever emitting their final chunk
    pub fn without_final_data(self) -> Self {
        self.state.lock().withhold_final_data = true;
        self
    }

    /// Stopped captures keep their data until [`MemoryHost::deliver_held`]
    pub fn with_manual_delivery(self) -> Self {
        self.state.lock().manual_delivery = true;
        self
    }

    /// The next stop request fails with the given message; stacks per call
    pub fn with_stop_failure(self, message: impl Into<String>) -> Self {
        self.state.lock().stop_failures.push(message.into());
        self
    }

    /// Every download attempt fails with the given message
    pub fn with_download_failure(self, message: impl Into<String>) -> Self {
        self.state.lock().download_failure = Some(message.into());
        self
    }

    /// Options of every capture opened so far
    pub fn opened_captures(&self) -> Vec<CaptureOptions> {
        self.state.lock().opened.clone()
    }

    /// Captures started and not yet stopped
    pub fn live_captures(&self) -> usize {
        self.state.lock().live_captures
    }

    /// Deliver the data of every stopped capture held back so far
    pub fn deliver_held(&self) -> usize {
        let held = std::mem::take(&mut self.state.lock().held);
        let count = held.len();
        for (sink, recording) in held {
            sink.deliver(recording);
        }
        count
    }

    /// Downloads triggered so far
    pub fn downloads(&self) -> Vec<DownloadRecord> {
        self.state.lock().downloads.clone()
    }
}

impl RecordingHost for MemoryHost {
    type Recording = MemoryRecording;
    type Capture = MemoryCapture;

    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.state.lock().supported.iter().any(|m| m == mime_type)
    }

    fn open_capture(
        &self,
        options: &CaptureOptions,
        sink: RecordingSink<MemoryRecording>,
    ) -> RecorderResult<MemoryCapture> {
        let mut state = self.state.lock();
        state.opened.push(options.clone());

        Ok(MemoryCapture {
            host: Arc::clone(&self.state),
            mime_type: options.mime_type.clone(),
            payload: state.payload.clone(),
            sink: Some(sink),
            started: false,
        })
    }

    fn trigger_download(&self, recording: &MemoryRecording, file_name: &str) -> RecorderResult<()> {
        let mut state = self.state.lock();
        if let Some(message) = &state.download_failure {
            return Err(RecorderError::Download(message.clone()));
        }

        state.downloads.push(DownloadRecord {
            file_name: file_name.to_string(),
            mime_type: recording.mime_type.clone(),
            data: recording.data.clone(),
        });
        Ok(())
    }
}

/// Capture handle of [`MemoryHost`]
#[derive(Debug)]
pub struct MemoryCapture {
    host: Arc<Mutex<HostState>>,
    mime_type: String,
    payload: Vec<u8>,
    sink: Option<RecordingSink<MemoryRecording>>,
    started: bool,
}

impl CaptureHandle for MemoryCapture {
    fn start(&mut self) -> RecorderResult<()> {
        if self.started {
            return Err(RecorderError::Capture("capture already started".into()));
        }
        self.started = true;
        self.host.lock().live_captures += 1;
        Ok(())
    }

    fn stop(&mut self) -> RecorderResult<()> {
        if !self.started {
            return Err(RecorderError::Capture("capture was never started".into()));
        }
        if self.sink.is_none() {
            return Err(RecorderError::Capture("capture already stopped".into()));
        }

        let mut state = self.host.lock();
        if !state.stop_failures.is_empty() {
            return Err(RecorderError::Capture(state.stop_failures.remove(0)));
        }
        state.live_captures = state.live_captures.saturating_sub(1);

        let Some(sink) = self.sink.take() else {
            return Err(RecorderError::Capture("capture already stopped".into()));
        };
        let recording = MemoryRecording {
            mime_type: self.mime_type.clone(),
            data: std::mem::take(&mut self.payload),
        };

        if state.withhold_final_data {
            drop(sink);
        } else if state.manual_delivery {
            state.held.push((sink, recording));
        } else {
            drop(state);
            sink.deliver(recording);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> CaptureOptions {
        CaptureOptions {
            mime_type: "video/webm".into(),
            video_bits_per_second: 5_000_000,
        }
    }

    #[test]
    fn test_reports_only_configured_types() {
        let host = MemoryHost::supporting(["video/webm"]);
        assert!(host.is_type_supported("video/webm"));
        assert!(!host.is_type_supported("video/webm;codecs=vp9"));
    }

    #[tokio::test]
    async fn test_stop_delivers_payload() {
        let host = MemoryHost::supporting(["video/webm"]).with_payload(vec![7u8; 4]);
        let (sink, rx) = RecordingSink::channel();
        let mut capture = host.open_capture(&options(), sink).unwrap();

        capture.start().unwrap();
        capture.stop().unwrap();

        let recording = rx.await.unwrap();
        assert_eq!(recording.mime_type, "video/webm");
        assert_eq!(recording.size_bytes(), 4);
        assert_eq!(host.opened_captures(), vec![options()]);
    }

    #[test]
    fn test_stop_before_start_fails() {
        let host = MemoryHost::supporting(["video/webm"]);
        let (sink, _rx) = RecordingSink::channel();
        let mut capture = host.open_capture(&options(), sink).unwrap();
        assert!(matches!(capture.stop(), Err(RecorderError::Capture(_))));
    }

    #[tokio::test]
    async fn test_manual_delivery_holds_data_until_released() {
        let host = MemoryHost::supporting(["video/webm"])
            .with_payload(vec![1u8, 2])
            .with_manual_delivery();
        let (sink, mut rx) = RecordingSink::channel();
        let mut capture = host.open_capture(&options(), sink).unwrap();

        capture.start().unwrap();
        capture.stop().unwrap();
        assert!(rx.try_recv().is_err());

        assert_eq!(host.deliver_held(), 1);
        assert_eq!(rx.await.unwrap().data, vec![1, 2]);
    }

    #[test]
    fn test_stop_failure_keeps_capture_live() {
        let host = MemoryHost::supporting(["video/webm"]).with_stop_failure("transient");
        let (sink, _rx) = RecordingSink::channel();
        let mut capture = host.open_capture(&options(), sink).unwrap();

        capture.start().unwrap();
        assert!(matches!(capture.stop(), Err(RecorderError::Capture(ref m)) if m == "transient"));
        assert_eq!(host.live_captures(), 1);

        capture.stop().unwrap();
        assert_eq!(host.live_captures(), 0);
    }

    #[test]
    fn test_download_failure() {
        let host = MemoryHost::supporting(["video/webm"]).with_download_failure("blocked");
        let recording = MemoryRecording {
            mime_type: "video/webm".into(),
            data: vec![1],
        };
        let result = host.trigger_download(&recording, "clip.webm");
        assert!(matches!(result, Err(RecorderError::Download(ref m)) if m == "blocked"));
        assert!(host.downloads().is_empty());
    }
}
