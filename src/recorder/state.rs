//! Recording state management
//!
//! Defines the recording state machine, session tracking, and the recorder
//! configuration.

use crate::capture::format::default_mime_types;
use crate::utils::error::RecorderResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Bitrate used when none (or zero) is configured
pub const DEFAULT_VIDEO_BITS_PER_SECOND: u32 = 5_000_000;

/// File name used when `stop_and_save` gets none
pub const DEFAULT_FILE_NAME: &str = "recording.webm";

/// Current state of the recorder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordingState {
    /// No recording in progress
    #[default]
    Idle,
    /// Currently recording
    Recording,
}

/// Information about a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingSession {
    /// Unique session ID
    pub id: Uuid,

    /// MIME type the host is encoding
    pub mime_type: String,

    /// Target video bitrate in bits per second
    pub video_bits_per_second: u32,

    /// When the capture started
    pub started_at: DateTime<Utc>,
}

impl RecordingSession {
    /// Create a new session starting now
    pub fn new(mime_type: impl Into<String>, video_bits_per_second: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            mime_type: mime_type.into(),
            video_bits_per_second,
            started_at: Utc::now(),
        }
    }

    /// Milliseconds elapsed since the session started
    pub fn elapsed_ms(&self) -> u64 {
        (Utc::now() - self.started_at).num_milliseconds().max(0) as u64
    }
}

/// Configuration for a recorder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderConfig {
    /// Target video bitrate; `None` or `0` means the default
    #[serde(default)]
    pub video_bits_per_second: Option<u32>,

    /// MIME type preference list, highest preference first
    #[serde(default = "default_mime_types")]
    pub mime_types: Vec<String>,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            video_bits_per_second: None,
            mime_types: default_mime_types(),
        }
    }
}

impl RecorderConfig {
    /// Default configuration with the given bitrate
    pub fn with_video_bits_per_second(video_bits_per_second: Option<u32>) -> Self {
        Self {
            video_bits_per_second,
            ..Self::default()
        }
    }

    /// Replace the MIME type preference list
    pub fn with_mime_types<I, S>(mut self, mime_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mime_types = mime_types.into_iter().map(Into::into).collect();
        self
    }

    /// Bitrate handed to the host
    pub fn effective_video_bits_per_second(&self) -> u32 {
        match self.video_bits_per_second {
            Some(bits) if bits > 0 => bits,
            _ => DEFAULT_VIDEO_BITS_PER_SECOND,
        }
    }

    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> RecorderResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a configuration from a JSON file
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> RecorderResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

/// Pick the download name: empty or missing names fall back to the default
pub fn resolve_file_name(file_name: Option<&str>) -> String {
    match file_name {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_FILE_NAME.to_string(),
    }
}

/// Result of a saved recording
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRecording {
    /// Session that produced the recording
    pub session_id: Uuid,

    /// Name the download was triggered with
    pub file_name: String,

    /// MIME type of the recorded data
    pub mime_type: String,

    /// Size of the recorded data in bytes
    pub size_bytes: u64,

    /// When the capture started
    pub started_at: DateTime<Utc>,

    /// Time from start until the recording was saved, in milliseconds
    pub duration_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_bitrate() {
        assert_eq!(RecorderConfig::default().effective_video_bits_per_second(), 5_000_000);
        assert_eq!(
            RecorderConfig::with_video_bits_per_second(Some(0)).effective_video_bits_per_second(),
            5_000_000
        );
        assert_eq!(
            RecorderConfig::with_video_bits_per_second(Some(2_500_000))
                .effective_video_bits_per_second(),
            2_500_000
        );
    }

    #[test]
    fn test_resolve_file_name() {
        assert_eq!(resolve_file_name(None), "recording.webm");
        assert_eq!(resolve_file_name(Some("")), "recording.webm");
        assert_eq!(resolve_file_name(Some("clip1.webm")), "clip1.webm");
        assert_eq!(resolve_file_name(Some(" ")), " ");
    }

    #[test]
    fn test_config_from_partial_json() {
        let config = RecorderConfig::from_json(r#"{ "videoBitsPerSecond": 8000000 }"#).unwrap();
        assert_eq!(config.effective_video_bits_per_second(), 8_000_000);
        assert_eq!(config.mime_types, default_mime_types());
    }

    #[test]
    fn test_config_custom_mime_types() {
        let config = RecorderConfig::from_json(r#"{ "mimeTypes": ["fmt-a", "fmt-b"] }"#).unwrap();
        assert_eq!(config.mime_types, vec!["fmt-a", "fmt-b"]);
        assert_eq!(config.video_bits_per_second, None);
    }

    #[test]
    fn test_config_rejects_malformed_json() {
        assert!(RecorderConfig::from_json("{ videoBitsPerSecond: }").is_err());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("recorder.json");
        fs::write(&path, r#"{ "videoBitsPerSecond": 1000000, "mimeTypes": ["video/webm"] }"#).unwrap();

        let config = RecorderConfig::load(&path).unwrap();
        assert_eq!(config.effective_video_bits_per_second(), 1_000_000);
        assert_eq!(config.mime_types, vec!["video/webm"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = RecorderConfig::load(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(crate::RecorderError::Io(_))));
    }

    #[test]
    fn test_state_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&RecordingState::Recording).unwrap(), "\"recording\"");
        assert_eq!(RecordingState::default(), RecordingState::Idle);
    }
}
