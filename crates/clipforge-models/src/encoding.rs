//! Encoding configuration and per-platform lookup tables.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default video codec (H.264)
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoding preset
pub const DEFAULT_PRESET: &str = "veryfast";
/// Default audio bitrate
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// Thumbnail generation settings
pub const THUMBNAIL_SCALE_WIDTH: u32 = 480;

/// Per-platform encode target (fps + bitrates).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct EncodeTarget {
    /// Output frame rate
    pub fps: u32,
    /// Video bitrate, FFmpeg notation (e.g. "6M")
    pub video_bitrate: &'static str,
    /// Audio bitrate, FFmpeg notation
    pub audio_bitrate: &'static str,
}

/// Encode target for a platform id; unknown platforms get the fallback.
pub fn encode_target(platform_id: &str) -> EncodeTarget {
    match platform_id {
        "tiktok" => EncodeTarget {
            fps: 30,
            video_bitrate: "6M",
            audio_bitrate: "128k",
        },
        "instagram-reels" => EncodeTarget {
            fps: 30,
            video_bitrate: "5M",
            audio_bitrate: "128k",
        },
        "youtube-shorts" => EncodeTarget {
            fps: 60,
            video_bitrate: "8M",
            audio_bitrate: "192k",
        },
        "twitter" => EncodeTarget {
            fps: 30,
            video_bitrate: "5M",
            audio_bitrate: "128k",
        },
        _ => EncodeTarget {
            fps: 30,
            video_bitrate: "5M",
            audio_bitrate: DEFAULT_AUDIO_BITRATE,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_platform_targets() {
        assert_eq!(encode_target("youtube-shorts").fps, 60);
        assert_eq!(encode_target("tiktok").video_bitrate, "6M");
    }

    #[test]
    fn test_unknown_platform_falls_back() {
        let target = encode_target("vine");
        assert_eq!(target.fps, 30);
        assert_eq!(target.audio_bitrate, DEFAULT_AUDIO_BITRATE);
    }
}
