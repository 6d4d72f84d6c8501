//! Boundary candidates produced by signal analyzers.
//!
//! These are fusion-internal: they exist between analysis and scene
//! materialization and are never persisted past it.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which analyzer produced a boundary candidate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    PixelDifference,
    AudioAmplitude,
    ColorHistogram,
    MotionVector,
    FaceDetection,
}

impl DetectionMethod {
    /// All methods, in the order analyzers are dispatched.
    pub const ALL: [DetectionMethod; 5] = [
        DetectionMethod::PixelDifference,
        DetectionMethod::AudioAmplitude,
        DetectionMethod::ColorHistogram,
        DetectionMethod::MotionVector,
        DetectionMethod::FaceDetection,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::PixelDifference => "pixel_difference",
            DetectionMethod::AudioAmplitude => "audio_amplitude",
            DetectionMethod::ColorHistogram => "color_histogram",
            DetectionMethod::MotionVector => "motion_vector",
            DetectionMethod::FaceDetection => "face_detection",
        }
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A candidate point in time where one scene ends and another begins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SceneBoundary {
    /// Position in the source video, seconds
    pub timestamp: f64,

    /// Confidence in [0, 1] before fusion weighting
    pub confidence: f64,

    /// Analyzer that emitted this candidate
    pub method: DetectionMethod,

    /// Free-form analyzer diagnostics (signal values, classifications).
    /// BTreeMap keeps serialization order stable for deterministic output.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl SceneBoundary {
    /// Create a boundary with no diagnostics attached.
    pub fn new(timestamp: f64, confidence: f64, method: DetectionMethod) -> Self {
        Self {
            timestamp,
            confidence: confidence.clamp(0.0, 1.0),
            method,
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a diagnostic key/value.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
