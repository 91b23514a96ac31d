//! Canvas Recorder - record a canvas element to a downloadable video file.
//!
//! The recorder picks the best recording format the host supports, captures
//! the canvas while recording, and hands the finished file to the host's
//! download mechanism when stopped. Hosts implement
//! [`capture::RecordingHost`]; the browser host lives in `capture::web` on
//! `wasm32`, and [`capture::MemoryHost`] runs anywhere.

pub mod capture;
pub mod recorder;
pub mod utils;

#[cfg(target_arch = "wasm32")]
pub mod bindings;

pub use capture::{CaptureHandle, CaptureOptions, MemoryHost, RecordedMedia, RecordingHost, RecordingSink};
pub use recorder::{
    CanvasRecorder, PendingSave, RecorderConfig, RecordingEvent, RecordingSession, RecordingState,
    SavedRecording,
};
pub use utils::error::{ErrorResponse, RecorderError, RecorderResult};

/// Initialize tracing/logging for native callers
#[cfg(not(target_arch = "wasm32"))]
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "canvas_recorder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    tracing::info!("Canvas Recorder v{}", env!("CARGO_PKG_VERSION"));
}
