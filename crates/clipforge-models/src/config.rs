//! Scene detection configuration.
//!
//! One canonical schema at the core boundary; legacy shapes from older
//! front-ends are translated by adapters before they reach the pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Detection sensitivity preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

impl Sensitivity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sensitivity::Low => "low",
            Sensitivity::Medium => "medium",
            Sensitivity::High => "high",
        }
    }
}

/// Per-algorithm tuning: on/off switch, trigger threshold, fusion weight.
///
/// Weights are positive multipliers applied to boundary confidence during
/// fusion; they are not required to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct AlgorithmSettings {
    /// Whether this analyzer contributes boundaries
    pub enabled: bool,

    /// Trigger threshold in the analyzer's own signal units (0-1)
    #[validate(range(min = 0.0, max = 1.0))]
    pub threshold: f64,

    /// Confidence multiplier applied during fusion
    #[validate(range(min = 0.0))]
    pub weight: f64,
}

impl AlgorithmSettings {
    pub const fn new(enabled: bool, threshold: f64, weight: f64) -> Self {
        Self {
            enabled,
            threshold,
            weight,
        }
    }
}

/// Face/speaker analyzer tuning.
///
/// Same shape as [`AlgorithmSettings`] except the threshold is named for what
/// it gates: the normalized face-count delta that signals a speaker change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
pub struct FaceDetectionSettings {
    /// Whether the face/speaker analyzer contributes boundaries
    pub enabled: bool,

    /// Normalized face-count delta (0-1) that triggers a boundary
    #[validate(range(min = 0.0, max = 1.0))]
    pub speaker_change_threshold: f64,

    /// Confidence multiplier applied during fusion
    #[validate(range(min = 0.0))]
    pub weight: f64,
}

/// Full scene detection configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SceneDetectionConfig {
    /// Overall sensitivity preset
    #[serde(default)]
    pub sensitivity: Sensitivity,

    /// Mean absolute per-channel frame difference
    #[validate(nested)]
    pub pixel_difference: AlgorithmSettings,

    /// Relative audio energy change
    #[validate(nested)]
    pub audio_amplitude: AlgorithmSettings,

    /// Grayscale histogram intersection drop
    #[validate(nested)]
    pub color_histogram: AlgorithmSettings,

    /// Frame-difference motion magnitude
    #[validate(nested)]
    pub motion_vector: AlgorithmSettings,

    /// Face-count change (speaker change proxy)
    #[validate(nested)]
    pub face_detection: FaceDetectionSettings,

    /// Minimum scene duration in seconds
    #[validate(range(min = 0.5))]
    pub min_scene_duration: f64,

    /// Maximum number of scenes to materialize
    #[validate(range(min = 1))]
    pub max_scenes: usize,

    /// Merge very short adjacent scenes that share context
    #[serde(default)]
    pub preserve_context: bool,

    /// Same merge pass, requested for narrative continuity
    #[serde(default)]
    pub maintain_narrative_flow: bool,
}

impl Default for SceneDetectionConfig {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::Medium,
            pixel_difference: AlgorithmSettings::new(true, 0.3, 1.0),
            audio_amplitude: AlgorithmSettings::new(true, 0.4, 0.8),
            color_histogram: AlgorithmSettings::new(true, 0.35, 0.9),
            motion_vector: AlgorithmSettings::new(true, 0.5, 0.7),
            face_detection: FaceDetectionSettings {
                enabled: true,
                speaker_change_threshold: 0.5,
                weight: 1.1,
            },
            min_scene_duration: 3.0,
            max_scenes: 20,
            preserve_context: true,
            maintain_narrative_flow: false,
        }
    }
}

impl SceneDetectionConfig {
    /// True when the context-merge post-pass should run after materialization.
    pub fn wants_context_merge(&self) -> bool {
        self.preserve_context || self.maintain_narrative_flow
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SceneDetectionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let mut config = SceneDetectionConfig::default();
        config.pixel_difference.threshold = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_weight() {
        let mut config = SceneDetectionConfig::default();
        config.motion_vector.weight = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_context_merge_flags() {
        let mut config = SceneDetectionConfig::default();
        config.preserve_context = false;
        config.maintain_narrative_flow = false;
        assert!(!config.wants_context_merge());
        config.maintain_narrative_flow = true;
        assert!(config.wants_context_merge());
    }
}
