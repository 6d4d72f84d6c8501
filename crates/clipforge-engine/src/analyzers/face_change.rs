//! Speaker/face-change analyzer.
//!
//! Tracks the detected-face count per sampled frame and emits a boundary
//! when the count delta, scaled to [0, 1], exceeds the configured
//! speaker-change threshold. Face counting goes through the vision
//! capability seam; see [`crate::vision`].

use std::sync::Arc;

use clipforge_models::{DetectionMethod, SceneBoundary};

use super::BoundaryAnalyzer;
use crate::sample::SampledMedia;
use crate::vision::FaceCounter;

/// Face-count deltas at or above this many faces scale to 1.0.
const MAX_FACE_DELTA: f64 = 4.0;

pub struct FaceChangeAnalyzer {
    threshold: f64,
    counter: Arc<dyn FaceCounter>,
}

impl FaceChangeAnalyzer {
    pub fn new(threshold: f64, counter: Arc<dyn FaceCounter>) -> Self {
        Self { threshold, counter }
    }
}

impl BoundaryAnalyzer for FaceChangeAnalyzer {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::FaceDetection
    }

    fn analyze(&self, media: &SampledMedia) -> Vec<SceneBoundary> {
        let counts: Vec<usize> = media
            .frames
            .iter()
            .map(|frame| self.counter.count_faces(frame))
            .collect();

        let mut boundaries = Vec::new();
        for (i, pair) in counts.windows(2).enumerate() {
            let delta = pair[0].abs_diff(pair[1]) as f64;
            let scaled = (delta / MAX_FACE_DELTA).min(1.0);

            if scaled > self.threshold {
                let confidence = (scaled / self.threshold).min(1.0);
                boundaries.push(
                    SceneBoundary::new(media.frames[i + 1].timestamp, confidence, self.method())
                        .with_metadata("faces_before", pair[0].to_string())
                        .with_metadata("faces_after", pair[1].to_string()),
                );
            }
        }

        boundaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampledFrame;
    use crate::testutil::media_from_colors;

    /// Counter keyed on frame brightness: one face per 64 luma units.
    struct BrightnessCounter;

    impl FaceCounter for BrightnessCounter {
        fn count_faces(&self, frame: &SampledFrame) -> usize {
            (frame.rgb[0] / 64) as usize
        }
    }

    #[test]
    fn test_stable_face_count_no_boundaries() {
        let media = media_from_colors(&[(70, 70, 70), (70, 70, 70), (70, 70, 70)]);
        let analyzer = FaceChangeAnalyzer::new(0.4, Arc::new(BrightnessCounter));
        assert!(analyzer.analyze(&media).is_empty());
    }

    #[test]
    fn test_speaker_change_emits_boundary() {
        // 1 face -> 3 faces: delta 2 scaled to 0.5, above threshold 0.4.
        let media = media_from_colors(&[(70, 70, 70), (200, 200, 200)]);
        let analyzer = FaceChangeAnalyzer::new(0.4, Arc::new(BrightnessCounter));
        let boundaries = analyzer.analyze(&media);

        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].timestamp, 1.0);
        assert_eq!(boundaries[0].method, DetectionMethod::FaceDetection);
        assert_eq!(
            boundaries[0].metadata.get("faces_after").map(String::as_str),
            Some("3")
        );
    }

    #[test]
    fn test_single_face_delta_below_threshold() {
        // 1 face -> 2 faces: delta 1 scaled to 0.25, below threshold 0.4.
        let media = media_from_colors(&[(70, 70, 70), (135, 135, 135)]);
        let analyzer = FaceChangeAnalyzer::new(0.4, Arc::new(BrightnessCounter));
        assert!(analyzer.analyze(&media).is_empty());
    }
}
