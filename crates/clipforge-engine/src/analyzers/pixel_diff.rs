//! Pixel-difference analyzer.
//!
//! Mean absolute per-channel difference between consecutive sampled frames,
//! normalized to [0, 1]. A boundary is emitted when the difference exceeds
//! the configured threshold, with confidence `min(difference/threshold, 1)`.

use clipforge_models::{DetectionMethod, SceneBoundary};

use super::BoundaryAnalyzer;
use crate::sample::{SampledFrame, SampledMedia};

pub struct PixelDifferenceAnalyzer {
    threshold: f64,
}

impl PixelDifferenceAnalyzer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl BoundaryAnalyzer for PixelDifferenceAnalyzer {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::PixelDifference
    }

    fn analyze(&self, media: &SampledMedia) -> Vec<SceneBoundary> {
        let mut boundaries = Vec::new();

        for pair in media.frames.windows(2) {
            let difference = frame_difference(&pair[0], &pair[1]);
            if difference > self.threshold {
                let confidence = (difference / self.threshold).min(1.0);
                boundaries.push(
                    SceneBoundary::new(pair[1].timestamp, confidence, self.method())
                        .with_metadata("difference", format!("{:.4}", difference)),
                );
            }
        }

        boundaries
    }
}

/// Mean absolute per-channel difference between two frames, in [0, 1].
///
/// Frames with mismatched dimensions (source resolution change mid-stream)
/// compare as maximally different.
pub fn frame_difference(a: &SampledFrame, b: &SampledFrame) -> f64 {
    if a.rgb.len() != b.rgb.len() || a.rgb.is_empty() {
        return 1.0;
    }

    let total: u64 = a
        .rgb
        .iter()
        .zip(b.rgb.iter())
        .map(|(&x, &y)| x.abs_diff(y) as u64)
        .sum();

    total as f64 / (a.rgb.len() as f64 * 255.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{media_from_colors, solid_frame};

    #[test]
    fn test_identical_frames_no_difference() {
        let a = solid_frame(0.0, 100, 100, 100);
        let b = solid_frame(1.0, 100, 100, 100);
        assert_eq!(frame_difference(&a, &b), 0.0);
    }

    #[test]
    fn test_black_to_white_is_max_difference() {
        let a = solid_frame(0.0, 0, 0, 0);
        let b = solid_frame(1.0, 255, 255, 255);
        assert!((frame_difference(&a, &b) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_hard_cut_emits_boundary() {
        let media = media_from_colors(&[(20, 20, 20), (20, 20, 20), (230, 230, 230)]);
        let analyzer = PixelDifferenceAnalyzer::new(0.3);
        let boundaries = analyzer.analyze(&media);

        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].timestamp, 2.0);
        assert_eq!(boundaries[0].confidence, 1.0);
        assert_eq!(boundaries[0].method, DetectionMethod::PixelDifference);
    }

    #[test]
    fn test_subthreshold_change_is_ignored() {
        let media = media_from_colors(&[(100, 100, 100), (110, 110, 110)]);
        let analyzer = PixelDifferenceAnalyzer::new(0.3);
        assert!(analyzer.analyze(&media).is_empty());
    }

    #[test]
    fn test_confidence_scales_with_difference() {
        // Difference of ~0.47 against threshold 0.3 -> confidence capped by ratio.
        let media = media_from_colors(&[(0, 0, 0), (120, 120, 120)]);
        let analyzer = PixelDifferenceAnalyzer::new(0.3);
        let boundaries = analyzer.analyze(&media);
        assert_eq!(boundaries.len(), 1);
        let expected: f64 = (120.0 / 255.0) / 0.3;
        assert!((boundaries[0].confidence - expected.min(1.0)).abs() < 1e-9);
    }
}
