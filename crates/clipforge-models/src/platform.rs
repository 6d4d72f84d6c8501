//! Platform presets.
//!
//! Presets are static configuration data supplied to the core, not computed
//! by it. The built-in catalog covers the short-form targets the composer's
//! lookup tables know about.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output aspect ratio expressed as an integer pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct AspectRatio {
    pub width: u32,
    pub height: u32,
}

impl AspectRatio {
    /// Standard portrait (9:16) for TikTok/Reels/Shorts
    pub const PORTRAIT: AspectRatio = AspectRatio {
        width: 9,
        height: 16,
    };

    /// Square (1:1)
    pub const SQUARE: AspectRatio = AspectRatio {
        width: 1,
        height: 1,
    };

    /// Landscape (16:9)
    pub const LANDSCAPE: AspectRatio = AspectRatio {
        width: 16,
        height: 9,
    };

    /// Create a new aspect ratio.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns the aspect ratio as a decimal.
    pub fn as_f64(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /// True for portrait orientation (taller than wide).
    pub fn is_vertical(&self) -> bool {
        self.as_f64() < 1.0
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.width, self.height)
    }
}

/// Parse error for "W:H" aspect ratio strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AspectRatioParseError {
    #[error("invalid aspect ratio format '{0}', expected W:H")]
    InvalidFormat(String),
    #[error("invalid aspect ratio number '{0}'")]
    InvalidNumber(String),
    #[error("aspect ratio components must be non-zero")]
    ZeroValue,
}

impl FromStr for AspectRatio {
    type Err = AspectRatioParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 2 {
            return Err(AspectRatioParseError::InvalidFormat(s.to_string()));
        }

        let width = parts[0]
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(parts[0].to_string()))?;
        let height = parts[1]
            .parse()
            .map_err(|_| AspectRatioParseError::InvalidNumber(parts[1].to_string()))?;

        if width == 0 || height == 0 {
            return Err(AspectRatioParseError::ZeroValue);
        }

        Ok(AspectRatio { width, height })
    }
}

/// Spatial reframing strategy for a platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CropStrategyKind {
    #[default]
    Center,
    Smart,
    FaceTracking,
    ActionFollowing,
    SpeakerFocus,
}

impl CropStrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CropStrategyKind::Center => "center",
            CropStrategyKind::Smart => "smart",
            CropStrategyKind::FaceTracking => "face-tracking",
            CropStrategyKind::ActionFollowing => "action-following",
            CropStrategyKind::SpeakerFocus => "speaker-focus",
        }
    }
}

/// Pacing a platform's audience responds to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    Fast,
    #[default]
    Medium,
    Slow,
}

/// Platform-specific publishing optimizations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformOptimizations {
    /// Seconds of "hook" the platform algorithm prioritizes
    pub hook_duration: f64,
    /// Engagement mechanics worth boosting (e.g. "duet", "stitch")
    pub engagement_boosts: Vec<String>,
    /// Traits the recommendation algorithm rewards
    pub algorithm_friendly: Vec<String>,
    /// Currently favored formats
    pub trending_formats: Vec<String>,
    /// Caption rendering style hint
    pub caption_style: String,
}

/// Audience guidance for a platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContentGuidelines {
    /// Sweet-spot clip length, seconds
    pub preferred_length: f64,
    /// Pacing profile the audience expects
    pub ideal_pacing: Pacing,
    /// Typical attention span, seconds
    pub attention_span: f64,
    /// Elements correlated with shares on this platform
    pub viral_elements: Vec<String>,
}

/// Immutable description of a clip target platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformPreset {
    /// Stable identifier (e.g. "tiktok")
    pub id: String,
    /// Human-readable name
    pub display_name: String,
    /// Output aspect ratio
    pub aspect_ratio: AspectRatio,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// Hard cap on clip duration, seconds
    pub max_duration: f64,
    /// Reframing strategy
    pub crop_strategy: CropStrategyKind,
    /// Whether the platform requires an audio track
    pub audio_required: bool,
    /// Publishing optimizations
    pub optimizations: PlatformOptimizations,
    /// Audience guidance
    pub content_guidelines: ContentGuidelines,
}

impl PlatformPreset {
    /// Attention multiplier for hook strength: short-attention platforms
    /// reward a strong opening harder.
    pub fn attention_multiplier(&self) -> f64 {
        if self.content_guidelines.attention_span < 10.0 {
            1.2
        } else {
            1.0
        }
    }
}

/// Built-in platform catalog.
pub fn builtin_presets() -> Vec<PlatformPreset> {
    vec![
        PlatformPreset {
            id: "tiktok".into(),
            display_name: "TikTok".into(),
            aspect_ratio: AspectRatio::PORTRAIT,
            width: 1080,
            height: 1920,
            max_duration: 60.0,
            crop_strategy: CropStrategyKind::FaceTracking,
            audio_required: true,
            optimizations: PlatformOptimizations {
                hook_duration: 3.0,
                engagement_boosts: vec!["duet".into(), "stitch".into()],
                algorithm_friendly: vec!["loops".into(), "trending-audio".into()],
                trending_formats: vec!["povs".into(), "transitions".into()],
                caption_style: "bold-center".into(),
            },
            content_guidelines: ContentGuidelines {
                preferred_length: 21.0,
                ideal_pacing: Pacing::Fast,
                attention_span: 8.0,
                viral_elements: vec!["hook".into(), "payoff".into()],
            },
        },
        PlatformPreset {
            id: "instagram-reels".into(),
            display_name: "Instagram Reels".into(),
            aspect_ratio: AspectRatio::PORTRAIT,
            width: 1080,
            height: 1920,
            max_duration: 90.0,
            crop_strategy: CropStrategyKind::SpeakerFocus,
            audio_required: true,
            optimizations: PlatformOptimizations {
                hook_duration: 3.0,
                engagement_boosts: vec!["remix".into(), "collab".into()],
                algorithm_friendly: vec!["saves".into(), "shares".into()],
                trending_formats: vec!["before-after".into()],
                caption_style: "clean-bottom".into(),
            },
            content_guidelines: ContentGuidelines {
                preferred_length: 30.0,
                ideal_pacing: Pacing::Medium,
                attention_span: 12.0,
                viral_elements: vec!["relatability".into(), "save-worthy".into()],
            },
        },
        PlatformPreset {
            id: "youtube-shorts".into(),
            display_name: "YouTube Shorts".into(),
            aspect_ratio: AspectRatio::PORTRAIT,
            width: 1080,
            height: 1920,
            max_duration: 60.0,
            crop_strategy: CropStrategyKind::Smart,
            audio_required: false,
            optimizations: PlatformOptimizations {
                hook_duration: 5.0,
                engagement_boosts: vec!["subscribe-prompt".into()],
                algorithm_friendly: vec!["watch-time".into(), "loops".into()],
                trending_formats: vec!["explainers".into()],
                caption_style: "outline-center".into(),
            },
            content_guidelines: ContentGuidelines {
                preferred_length: 45.0,
                ideal_pacing: Pacing::Medium,
                attention_span: 15.0,
                viral_elements: vec!["curiosity-gap".into()],
            },
        },
        PlatformPreset {
            id: "twitter".into(),
            display_name: "X / Twitter".into(),
            aspect_ratio: AspectRatio::SQUARE,
            width: 1080,
            height: 1080,
            max_duration: 140.0,
            crop_strategy: CropStrategyKind::Center,
            audio_required: false,
            optimizations: PlatformOptimizations {
                hook_duration: 2.0,
                engagement_boosts: vec!["quote-post".into()],
                algorithm_friendly: vec!["replies".into()],
                trending_formats: vec!["commentary".into()],
                caption_style: "subtitle".into(),
            },
            content_guidelines: ContentGuidelines {
                preferred_length: 40.0,
                ideal_pacing: Pacing::Slow,
                attention_span: 10.0,
                viral_elements: vec!["hot-take".into()],
            },
        },
    ]
}

/// Look up a built-in preset by id.
pub fn find_preset(id: &str) -> Option<PlatformPreset> {
    builtin_presets().into_iter().find(|p| p.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio_parse() {
        assert_eq!("9:16".parse::<AspectRatio>().unwrap(), AspectRatio::PORTRAIT);
        assert!("9x16".parse::<AspectRatio>().is_err());
        assert!("0:16".parse::<AspectRatio>().is_err());
    }

    #[test]
    fn test_vertical_check() {
        assert!(AspectRatio::PORTRAIT.is_vertical());
        assert!(!AspectRatio::SQUARE.is_vertical());
        assert!(!AspectRatio::LANDSCAPE.is_vertical());
    }

    #[test]
    fn test_builtin_catalog_lookup() {
        let tiktok = find_preset("tiktok").unwrap();
        assert_eq!(tiktok.width, 1080);
        assert!(tiktok.audio_required);
        assert!(find_preset("myspace").is_none());
    }

    #[test]
    fn test_attention_multiplier() {
        let tiktok = find_preset("tiktok").unwrap();
        assert_eq!(tiktok.attention_multiplier(), 1.2);
        let shorts = find_preset("youtube-shorts").unwrap();
        assert_eq!(shorts.attention_multiplier(), 1.0);
    }
}
