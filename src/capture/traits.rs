//! Capture trait definitions
//!
//! Host-agnostic contract for the capabilities the recorder needs: probing
//! encoder support, opening a capture of the canvas, delivering the finished
//! recording once, and handing it to the host's download mechanism.

use crate::utils::error::RecorderResult;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Parameters the host needs to open a capture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureOptions {
    /// MIME type selected from the preference list
    pub mime_type: String,

    /// Target video bitrate in bits per second
    pub video_bits_per_second: u32,
}

/// Finished recording data produced by a host
pub trait RecordedMedia {
    /// Size of the recorded artifact in bytes
    fn size_bytes(&self) -> u64;
}

/// One-shot delivery of the finished recording.
///
/// The host keeps the sink while capturing and calls [`RecordingSink::deliver`]
/// when its final data chunk is available. Dropping the sink without
/// delivering ends the session with [`crate::RecorderError::Finalize`].
#[derive(Debug)]
pub struct RecordingSink<R> {
    tx: oneshot::Sender<R>,
}

impl<R> RecordingSink<R> {
    /// Create a sink and the receiving end the recorder awaits
    pub fn channel() -> (Self, oneshot::Receiver<R>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Hand the recording to the recorder
    pub fn deliver(self, recording: R) {
        if self.tx.send(recording).is_err() {
            tracing::warn!("Recording delivered after the pending save was dropped");
        }
    }
}

/// A live capture of the canvas, owned by one recording session
pub trait CaptureHandle {
    /// Begin encoding frames
    fn start(&mut self) -> RecorderResult<()>;

    /// Ask the host to finalize; the data arrives later through the sink
    fn stop(&mut self) -> RecorderResult<()>;
}

/// Capabilities a host environment provides to the recorder
pub trait RecordingHost {
    /// Finished recording type
    type Recording: RecordedMedia;

    /// Capture handle type
    type Capture: CaptureHandle;

    /// Whether the host can encode the given MIME type
    fn is_type_supported(&self, mime_type: &str) -> bool;

    /// Open a capture of the canvas with the given options
    fn open_capture(
        &self,
        options: &CaptureOptions,
        sink: RecordingSink<Self::Recording>,
    ) -> RecorderResult<Self::Capture>;

    /// Deliver the recording to the user as a file download
    fn trigger_download(&self, recording: &Self::Recording, file_name: &str) -> RecorderResult<()>;
}
