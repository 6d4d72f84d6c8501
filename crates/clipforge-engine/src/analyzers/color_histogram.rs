//! Color-histogram analyzer.
//!
//! Builds a normalized grayscale histogram per sampled frame and compares
//! consecutive frames with histogram intersection. A boundary is emitted when
//! the dissimilarity `1 - intersection` exceeds the threshold.

use clipforge_models::{DetectionMethod, SceneBoundary};

use super::BoundaryAnalyzer;
use crate::sample::{SampledFrame, SampledMedia};

/// Grayscale histogram bins.
pub const HISTOGRAM_BINS: usize = 32;

pub struct ColorHistogramAnalyzer {
    threshold: f64,
}

impl ColorHistogramAnalyzer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl BoundaryAnalyzer for ColorHistogramAnalyzer {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::ColorHistogram
    }

    fn analyze(&self, media: &SampledMedia) -> Vec<SceneBoundary> {
        let histograms: Vec<[f64; HISTOGRAM_BINS]> =
            media.frames.iter().map(grayscale_histogram).collect();

        let mut boundaries = Vec::new();
        for (i, pair) in histograms.windows(2).enumerate() {
            let dissimilarity = 1.0 - intersection(&pair[0], &pair[1]);
            if dissimilarity > self.threshold {
                let confidence = (dissimilarity / self.threshold).min(1.0);
                boundaries.push(
                    SceneBoundary::new(media.frames[i + 1].timestamp, confidence, self.method())
                        .with_metadata("dissimilarity", format!("{:.4}", dissimilarity)),
                );
            }
        }

        boundaries
    }
}

/// Normalized grayscale histogram of a frame (bins sum to 1).
pub fn grayscale_histogram(frame: &SampledFrame) -> [f64; HISTOGRAM_BINS] {
    let mut bins = [0.0f64; HISTOGRAM_BINS];
    let luma = frame.luma();
    if luma.is_empty() {
        return bins;
    }

    let bin_width = 256 / HISTOGRAM_BINS;
    for l in &luma {
        bins[(*l as usize / bin_width).min(HISTOGRAM_BINS - 1)] += 1.0;
    }
    let total = luma.len() as f64;
    for bin in &mut bins {
        *bin /= total;
    }
    bins
}

/// Histogram intersection: sum of per-bin minima, 1.0 for identical frames.
pub fn intersection(a: &[f64; HISTOGRAM_BINS], b: &[f64; HISTOGRAM_BINS]) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| x.min(*y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{media_from_colors, solid_frame};

    #[test]
    fn test_identical_frames_full_intersection() {
        let h1 = grayscale_histogram(&solid_frame(0.0, 100, 100, 100));
        let h2 = grayscale_histogram(&solid_frame(1.0, 100, 100, 100));
        assert!((intersection(&h1, &h2) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_opposite_frames_zero_intersection() {
        let dark = grayscale_histogram(&solid_frame(0.0, 0, 0, 0));
        let bright = grayscale_histogram(&solid_frame(1.0, 255, 255, 255));
        assert!(intersection(&dark, &bright) < 1e-9);
    }

    #[test]
    fn test_palette_swap_emits_boundary() {
        let media = media_from_colors(&[(30, 30, 30), (30, 30, 30), (220, 220, 220)]);
        let analyzer = ColorHistogramAnalyzer::new(0.35);
        let boundaries = analyzer.analyze(&media);

        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].timestamp, 2.0);
        assert_eq!(boundaries[0].method, DetectionMethod::ColorHistogram);
    }

    #[test]
    fn test_static_shot_is_quiet() {
        let media = media_from_colors(&[(90, 90, 90); 5]);
        let analyzer = ColorHistogramAnalyzer::new(0.35);
        assert!(analyzer.analyze(&media).is_empty());
    }
}
