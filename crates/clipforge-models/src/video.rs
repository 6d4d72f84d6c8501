//! Video descriptors and extracted metadata.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

/// Unique identifier for a source video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Containers the pipeline accepts as input.
pub const SUPPORTED_FORMATS: &[&str] = &["mp4", "mov", "mkv", "webm", "avi"];

/// Source video descriptor handed to the core by the intake collaborator.
///
/// The intake layer is responsible for upload/validation UX; the core only
/// requires a decodable local path plus basic identity fields.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoFile {
    /// Unique video ID
    pub id: VideoId,

    /// Original file name
    pub name: String,

    /// File size in bytes
    pub size: u64,

    /// Duration in seconds
    pub duration: f64,

    /// Decodable local path
    pub path: PathBuf,

    /// Container format (lowercase extension, e.g. "mp4")
    pub format: String,
}

impl VideoFile {
    /// Whether the container format is one the pipeline can decode.
    pub fn is_supported_format(&self) -> bool {
        SUPPORTED_FORMATS.contains(&self.format.to_lowercase().as_str())
    }
}

/// Technical metadata extracted from a media file.
///
/// Immutable once probed; clip outputs carry their own copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoMetadata {
    /// Duration in seconds
    pub duration: f64,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Frame rate (fps)
    pub fps: f64,
    /// Bitrate in bits/second
    pub bitrate: u64,
    /// Container format
    pub format: String,
    /// File size in bytes
    pub size: u64,
}

impl VideoMetadata {
    /// Aspect ratio as a decimal (width / height).
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_format_check() {
        let mut file = VideoFile {
            id: VideoId::new(),
            name: "talk.mp4".into(),
            size: 1024,
            duration: 120.0,
            path: PathBuf::from("/tmp/talk.mp4"),
            format: "MP4".into(),
        };
        assert!(file.is_supported_format());

        file.format = "wmv".into();
        assert!(!file.is_supported_format());
    }

    #[test]
    fn test_aspect_ratio() {
        let meta = VideoMetadata {
            duration: 60.0,
            width: 1920,
            height: 1080,
            fps: 30.0,
            bitrate: 4_000_000,
            format: "mp4".into(),
            size: 10_000_000,
        };
        assert!((meta.aspect_ratio() - 16.0 / 9.0).abs() < 1e-9);
    }
}
