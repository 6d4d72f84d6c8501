//! Generated clips and the composition plans behind them.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::platform::{AspectRatio, CropStrategyKind};
use crate::video::VideoMetadata;

/// Normalized engagement estimates, all components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct EngagementFactors {
    /// Strength of the clip opening
    pub hook_strength: f64,
    /// Motion + color diversity
    pub visual_appeal: f64,
    /// Fit between scene motion and platform pacing
    pub pacing: f64,
    /// Information density (duration + speakers)
    pub content_density: f64,
    /// Emotional resonance estimate
    pub emotional_impact: f64,
    /// Short-form sharing potential
    pub viral_potential: f64,
}

/// Fixed weights for the composite quality score.
const QUALITY_WEIGHTS: [(f64, fn(&EngagementFactors) -> f64); 6] = [
    (0.25, |f| f.hook_strength),
    (0.20, |f| f.visual_appeal),
    (0.15, |f| f.pacing),
    (0.15, |f| f.content_density),
    (0.15, |f| f.emotional_impact),
    (0.10, |f| f.viral_potential),
];

impl EngagementFactors {
    /// Weighted composite quality score.
    ///
    /// Weights sum to 1, so components in [0,1] keep the score in [0,1].
    pub fn quality_score(&self) -> f64 {
        QUALITY_WEIGHTS
            .iter()
            .map(|(weight, get)| weight * get(self))
            .sum()
    }
}

/// A normalized point of interest within the frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FocusPoint {
    /// Horizontal position, 0 = left, 1 = right
    pub x: f64,
    /// Vertical position, 0 = top, 1 = bottom
    pub y: f64,
    /// Importance for camera targeting, 0-1
    pub weight: f64,
}

impl FocusPoint {
    pub const fn new(x: f64, y: f64, weight: f64) -> Self {
        Self { x, y, weight }
    }

    /// Frame center with the given weight.
    pub const fn center(weight: f64) -> Self {
        Self::new(0.5, 0.5, weight)
    }
}

/// Lateral pan applied while rendering a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum PanDirection {
    Left,
    Right,
    Up,
    Down,
    #[default]
    None,
}

/// The spatial reframing plan used when rendering a clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CropPlan {
    /// Strategy inherited from the platform preset
    pub kind: CropStrategyKind,
    /// Points of interest, descending relevance not guaranteed
    pub focus_points: Vec<FocusPoint>,
    /// Zoom factor, always within [1.0, 2.0]
    pub zoom_level: f64,
    /// Lateral pan for high-motion scenes
    pub pan_direction: PanDirection,
    /// Whether the renderer should track the dominant focus point
    pub tracking_enabled: bool,
}

impl CropPlan {
    /// The highest-weight focus point; the crop window is anchored on it.
    pub fn dominant_focus(&self) -> FocusPoint {
        self.focus_points
            .iter()
            .copied()
            .max_by(|a, b| a.weight.total_cmp(&b.weight))
            .unwrap_or(FocusPoint::center(1.0))
    }
}

/// Lifecycle of a single clip composition task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClipStatus {
    /// Task created, not yet dispatched
    #[default]
    Pending,
    /// Composer is working on it
    Processing,
    /// Rendered successfully
    Completed,
    /// Composition failed; siblings are unaffected
    Failed,
}

impl ClipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipStatus::Pending => "pending",
            ClipStatus::Processing => "processing",
            ClipStatus::Completed => "completed",
            ClipStatus::Failed => "failed",
        }
    }

    /// Terminal states: completed or failed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClipStatus::Completed | ClipStatus::Failed)
    }
}

impl fmt::Display for ClipStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A platform-specific output derived from one scene.
///
/// Owned by the job that produced it; never mutated after reaching a terminal
/// status.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedClip {
    /// Unique clip id
    pub id: String,
    /// Scene this clip was cut from
    pub scene_id: u32,
    /// Target platform preset id
    pub platform: String,
    /// Task status
    pub status: ClipStatus,
    /// Rendered output path, set on completion
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
    /// Probed metadata of the rendered output
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VideoMetadata>,
    /// Thumbnail captured at the clip midpoint
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PathBuf>,
    /// Composite quality score in [0, 1]
    pub quality_score: f64,
    /// Engagement factor breakdown
    pub engagement_factors: EngagementFactors,
    /// Reframing plan used for the render
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropPlan>,
    /// Final clip duration, seconds
    pub duration: f64,
    /// Output aspect ratio
    pub aspect_ratio: AspectRatio,
    /// Failure detail when status is failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl GeneratedClip {
    /// Create a pending stub for a (scene, platform) pair; the composer
    /// fills in the rest on completion.
    pub fn pending(scene_id: u32, platform: impl Into<String>, aspect_ratio: AspectRatio) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            scene_id,
            platform: platform.into(),
            status: ClipStatus::Pending,
            output: None,
            metadata: None,
            thumbnail: None,
            quality_score: 0.0,
            engagement_factors: EngagementFactors::default(),
            crop: None,
            duration: 0.0,
            aspect_ratio,
            error: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_score_bounds() {
        let zero = EngagementFactors::default();
        assert_eq!(zero.quality_score(), 0.0);

        let full = EngagementFactors {
            hook_strength: 1.0,
            visual_appeal: 1.0,
            pacing: 1.0,
            content_density: 1.0,
            emotional_impact: 1.0,
            viral_potential: 1.0,
        };
        assert!((full.quality_score() - 1.0).abs() < 1e-9);

        let mixed = EngagementFactors {
            hook_strength: 0.9,
            visual_appeal: 0.2,
            pacing: 0.7,
            content_density: 0.4,
            emotional_impact: 0.5,
            viral_potential: 0.6,
        };
        let score = mixed.quality_score();
        assert!((0.0..=1.0).contains(&score));
    }

    #[test]
    fn test_quality_score_weighting() {
        // Only hook strength set: score is exactly its 0.25 weight.
        let factors = EngagementFactors {
            hook_strength: 1.0,
            ..Default::default()
        };
        assert!((factors.quality_score() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_dominant_focus() {
        let plan = CropPlan {
            kind: CropStrategyKind::Smart,
            focus_points: vec![
                FocusPoint::center(0.3),
                FocusPoint::new(0.4, 0.35, 0.8),
            ],
            zoom_level: 1.2,
            pan_direction: PanDirection::None,
            tracking_enabled: false,
        };
        assert_eq!(plan.dominant_focus().weight, 0.8);
    }

    #[test]
    fn test_pending_clip_is_not_terminal() {
        let clip = GeneratedClip::pending(1, "tiktok", AspectRatio::PORTRAIT);
        assert_eq!(clip.status, ClipStatus::Pending);
        assert!(!clip.is_terminal());
    }
}
