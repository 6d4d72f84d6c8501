//! Motion-vector analyzer.
//!
//! True motion vectors are not recovered at analysis resolution; motion
//! magnitude is approximated from scaled luma frame differences and
//! classified into slow / moderate / fast / camera_cut. A boundary is
//! emitted when the magnitude exceeds the threshold.

use clipforge_models::{DetectionMethod, SceneBoundary};

use super::BoundaryAnalyzer;
use crate::sample::{SampledFrame, SampledMedia};

/// Scale applied to raw luma difference to approximate motion magnitude.
const MOTION_SCALE: f64 = 2.5;

/// Coarse classification of a motion magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionClass {
    Slow,
    Moderate,
    Fast,
    CameraCut,
}

impl MotionClass {
    pub fn from_magnitude(magnitude: f64) -> Self {
        if magnitude >= 0.85 {
            MotionClass::CameraCut
        } else if magnitude >= 0.5 {
            MotionClass::Fast
        } else if magnitude >= 0.25 {
            MotionClass::Moderate
        } else {
            MotionClass::Slow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MotionClass::Slow => "slow",
            MotionClass::Moderate => "moderate",
            MotionClass::Fast => "fast",
            MotionClass::CameraCut => "camera_cut",
        }
    }
}

pub struct MotionVectorAnalyzer {
    threshold: f64,
}

impl MotionVectorAnalyzer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl BoundaryAnalyzer for MotionVectorAnalyzer {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::MotionVector
    }

    fn analyze(&self, media: &SampledMedia) -> Vec<SceneBoundary> {
        let mut boundaries = Vec::new();

        for pair in media.frames.windows(2) {
            let magnitude = motion_magnitude(&pair[0], &pair[1]);
            if magnitude > self.threshold {
                let confidence = (magnitude / self.threshold).min(1.0);
                let class = MotionClass::from_magnitude(magnitude);
                boundaries.push(
                    SceneBoundary::new(pair[1].timestamp, confidence, self.method())
                        .with_metadata("magnitude", format!("{:.4}", magnitude))
                        .with_metadata("motion_class", class.as_str()),
                );
            }
        }

        boundaries
    }
}

/// Motion magnitude between two frames, clamped to [0, 1].
pub fn motion_magnitude(a: &SampledFrame, b: &SampledFrame) -> f64 {
    let luma_a = a.luma();
    let luma_b = b.luma();
    if luma_a.len() != luma_b.len() || luma_a.is_empty() {
        return 1.0;
    }

    let total: u64 = luma_a
        .iter()
        .zip(luma_b.iter())
        .map(|(&x, &y)| x.abs_diff(y) as u64)
        .sum();
    let mean = total as f64 / (luma_a.len() as f64 * 255.0);

    (mean * MOTION_SCALE).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{media_from_colors, solid_frame};

    #[test]
    fn test_static_frames_no_motion() {
        let a = solid_frame(0.0, 60, 60, 60);
        let b = solid_frame(1.0, 60, 60, 60);
        assert_eq!(motion_magnitude(&a, &b), 0.0);
    }

    #[test]
    fn test_hard_cut_classified_as_camera_cut() {
        let a = solid_frame(0.0, 0, 0, 0);
        let b = solid_frame(1.0, 255, 255, 255);
        let magnitude = motion_magnitude(&a, &b);
        assert_eq!(magnitude, 1.0);
        assert_eq!(MotionClass::from_magnitude(magnitude), MotionClass::CameraCut);
    }

    #[test]
    fn test_classification_bands() {
        assert_eq!(MotionClass::from_magnitude(0.1), MotionClass::Slow);
        assert_eq!(MotionClass::from_magnitude(0.3), MotionClass::Moderate);
        assert_eq!(MotionClass::from_magnitude(0.6), MotionClass::Fast);
        assert_eq!(MotionClass::from_magnitude(0.9), MotionClass::CameraCut);
    }

    #[test]
    fn test_boundary_carries_motion_class() {
        let media = media_from_colors(&[(0, 0, 0), (255, 255, 255)]);
        let analyzer = MotionVectorAnalyzer::new(0.5);
        let boundaries = analyzer.analyze(&media);

        assert_eq!(boundaries.len(), 1);
        assert_eq!(
            boundaries[0].metadata.get("motion_class").map(String::as_str),
            Some("camera_cut")
        );
    }
}
