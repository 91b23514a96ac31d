//! Host capture implementations
//!
//! This module provides the host contract, format selection, and the hosts
//! the recorder can run on.

pub mod format;
pub mod memory;
pub mod traits;

#[cfg(target_arch = "wasm32")]
pub mod web;

// Re-export traits
pub use traits::{CaptureHandle, CaptureOptions, RecordedMedia, RecordingHost, RecordingSink};

pub use format::{select_mime_type, DEFAULT_MIME_TYPES};
pub use memory::MemoryHost;
