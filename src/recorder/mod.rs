//! Recording system module
//!
//! This module implements the recorder facade:
//! - RecordingState / RecordingSession for the two-state lifecycle
//! - CanvasRecorder to drive a host capture from start to download
//! - PendingSave for the asynchronous finalization after stop

pub mod canvas;
pub mod state;

pub use canvas::{CanvasRecorder, PendingSave, RecordingEvent};
pub use state::{RecorderConfig, RecordingSession, RecordingState, SavedRecording};
