//! Pipeline configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Runtime knobs for the pipeline, loaded from the environment.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Maximum composition tasks running concurrently within one job
    pub batch_size: usize,
    /// Seconds between sampled frames fed to the analyzers
    pub frame_stride: f64,
    /// Seconds per audio energy window
    pub audio_stride: f64,
    /// Bounded wait for the execution context's ready handshake
    pub handshake_timeout: Duration,
    /// Directory clips and thumbnails are written into
    pub work_dir: PathBuf,
    /// Keep audio tracks on platforms that require them
    pub preserve_audio: bool,
    /// Capture scene/clip thumbnails; disabled when no real encoder runs
    pub capture_thumbnails: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            batch_size: 4,
            frame_stride: clipforge_engine::sample::DEFAULT_FRAME_STRIDE,
            audio_stride: clipforge_engine::sample::DEFAULT_AUDIO_STRIDE,
            handshake_timeout: Duration::from_secs(10),
            work_dir: PathBuf::from("/tmp/clipforge"),
            preserve_audio: true,
            capture_thumbnails: true,
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            batch_size: std::env::var("CLIPFORGE_BATCH_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.batch_size),
            frame_stride: std::env::var("CLIPFORGE_FRAME_STRIDE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.frame_stride),
            audio_stride: std::env::var("CLIPFORGE_AUDIO_STRIDE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.audio_stride),
            handshake_timeout: std::env::var("CLIPFORGE_HANDSHAKE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.handshake_timeout),
            work_dir: std::env::var("CLIPFORGE_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            preserve_audio: std::env::var("CLIPFORGE_PRESERVE_AUDIO")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.preserve_audio),
            capture_thumbnails: std::env::var("CLIPFORGE_CAPTURE_THUMBNAILS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.capture_thumbnails),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = PipelineConfig::default();
        assert!(config.batch_size >= 1);
        assert!(config.frame_stride > 0.0);
        assert!(config.handshake_timeout > Duration::ZERO);
    }
}
