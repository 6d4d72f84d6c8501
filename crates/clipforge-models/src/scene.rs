//! Detected scenes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::boundary::DetectionMethod;

/// Coarse motion classification for a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum MotionLevel {
    Low,
    #[default]
    Medium,
    High,
}

impl MotionLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            MotionLevel::Low => "low",
            MotionLevel::Medium => "medium",
            MotionLevel::High => "high",
        }
    }
}

impl fmt::Display for MotionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Aggregate audio characteristics over a scene interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AudioFeatures {
    /// Mean RMS amplitude over the interval (0-1)
    pub average_amplitude: f64,
    /// Fraction of windows classified as speech-like
    pub speech_ratio: f64,
    /// Fraction of windows classified as music-like
    pub music_ratio: f64,
}

/// A contiguous interval of the source video bounded by two refined
/// boundaries, with derived engagement/selection scores.
///
/// Invariants maintained by the materializer: `0 <= start_time < end_time <=
/// video duration`, `duration == end_time - start_time`, scenes within one job
/// are time-ordered and non-overlapping.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct DetectedScene {
    /// Scene id, ordinal within the job (1-based)
    pub id: u32,

    /// Start of the interval, seconds
    pub start_time: f64,

    /// End of the interval, seconds
    pub end_time: f64,

    /// end_time - start_time, seconds
    pub duration: f64,

    /// Confidence of the boundary that opened this scene (post-fusion)
    pub confidence: f64,

    /// Per-method contribution confidence; 0 entries are omitted
    pub detection_methods: BTreeMap<DetectionMethod, f64>,

    /// Closeness to the ideal standalone-scene length
    pub context_score: f64,

    /// Positional importance within the overall timeline
    pub narrative_importance: f64,

    /// Estimated short-form potential
    pub viral_potential: f64,

    /// Positional speaker labels present in the interval
    pub speakers: Vec<String>,

    /// Dominant colors as "#rrggbb" strings, most dominant first
    pub dominant_colors: Vec<String>,

    /// Coarse motion classification
    pub motion_level: MotionLevel,

    /// Aggregate audio characteristics
    pub audio_features: AudioFeatures,

    /// Thumbnail captured at the interval midpoint, if generated
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<PathBuf>,
}

impl DetectedScene {
    /// The timeline midpoint of this scene.
    pub fn midpoint(&self) -> f64 {
        self.start_time + self.duration / 2.0
    }

    /// Number of analyzers that contributed to the opening boundary.
    pub fn triggered_method_count(&self) -> usize {
        self.detection_methods.len()
    }

    /// The method with the highest contribution, if any.
    pub fn dominant_method(&self) -> Option<DetectionMethod> {
        self.detection_methods
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(method, _)| *method)
    }

    /// Whether any speaker label is shared with another scene.
    pub fn shares_speaker_with(&self, other: &DetectedScene) -> bool {
        self.speakers.iter().any(|s| other.speakers.contains(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(id: u32, start: f64, end: f64) -> DetectedScene {
        DetectedScene {
            id,
            start_time: start,
            end_time: end,
            duration: end - start,
            confidence: 0.8,
            detection_methods: BTreeMap::new(),
            context_score: 0.5,
            narrative_importance: 0.5,
            viral_potential: 0.5,
            speakers: vec!["speaker-1".into()],
            dominant_colors: Vec::new(),
            motion_level: MotionLevel::Medium,
            audio_features: AudioFeatures::default(),
            thumbnail: None,
        }
    }

    #[test]
    fn test_midpoint() {
        assert!((scene(1, 10.0, 20.0).midpoint() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_shared_speakers() {
        let a = scene(1, 0.0, 10.0);
        let mut b = scene(2, 10.0, 20.0);
        assert!(a.shares_speaker_with(&b));
        b.speakers = vec!["speaker-2".into()];
        assert!(!a.shares_speaker_with(&b));
    }

    #[test]
    fn test_dominant_method() {
        let mut s = scene(1, 0.0, 10.0);
        assert_eq!(s.dominant_method(), None);
        s.detection_methods
            .insert(DetectionMethod::PixelDifference, 0.4);
        s.detection_methods
            .insert(DetectionMethod::MotionVector, 0.7);
        assert_eq!(s.dominant_method(), Some(DetectionMethod::MotionVector));
    }
}
