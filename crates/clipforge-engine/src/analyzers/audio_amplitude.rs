//! Audio-amplitude analyzer.
//!
//! Works over the RMS energy windows sampled at a fixed interval. A boundary
//! is emitted when the relative amplitude change between consecutive windows
//! exceeds the threshold. Energy is expressed on a 0-100 scale so the
//! relative-change denominator floors at one unit instead of blowing up in
//! near-silent passages.

use clipforge_models::{DetectionMethod, SceneBoundary};

use super::BoundaryAnalyzer;
use crate::sample::SampledMedia;

/// Normalized RMS amplitude (0-1) is scaled to percent for the change ratio.
const AMPLITUDE_SCALE: f64 = 100.0;

pub struct AudioAmplitudeAnalyzer {
    threshold: f64,
}

impl AudioAmplitudeAnalyzer {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl BoundaryAnalyzer for AudioAmplitudeAnalyzer {
    fn method(&self) -> DetectionMethod {
        DetectionMethod::AudioAmplitude
    }

    fn analyze(&self, media: &SampledMedia) -> Vec<SceneBoundary> {
        let mut boundaries = Vec::new();

        for pair in media.audio.windows(2) {
            let prev = pair[0].amplitude * AMPLITUDE_SCALE;
            let curr = pair[1].amplitude * AMPLITUDE_SCALE;
            let relative_change = (curr - prev).abs() / prev.max(1.0);

            if relative_change > self.threshold {
                let confidence = (relative_change / self.threshold).min(1.0);
                boundaries.push(
                    SceneBoundary::new(pair[1].timestamp, confidence, self.method())
                        .with_metadata("relative_change", format!("{:.4}", relative_change))
                        .with_metadata("amplitude", format!("{:.4}", pair[1].amplitude)),
                );
            }
        }

        boundaries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::media_from_amplitudes;

    #[test]
    fn test_steady_audio_no_boundaries() {
        let media = media_from_amplitudes(&[0.5, 0.5, 0.5, 0.5]);
        let analyzer = AudioAmplitudeAnalyzer::new(0.4);
        assert!(analyzer.analyze(&media).is_empty());
    }

    #[test]
    fn test_loudness_jump_emits_boundary() {
        // 0.1 -> 0.8 on the percent scale: |80-10|/10 = 7.0 relative change.
        let media = media_from_amplitudes(&[0.1, 0.1, 0.8, 0.8]);
        let analyzer = AudioAmplitudeAnalyzer::new(0.4);
        let boundaries = analyzer.analyze(&media);

        assert_eq!(boundaries.len(), 1);
        assert_eq!(boundaries[0].timestamp, 1.0);
        assert_eq!(boundaries[0].confidence, 1.0);
        assert_eq!(boundaries[0].method, DetectionMethod::AudioAmplitude);
    }

    #[test]
    fn test_drop_to_silence_emits_boundary() {
        let media = media_from_amplitudes(&[0.6, 0.0]);
        let analyzer = AudioAmplitudeAnalyzer::new(0.4);
        let boundaries = analyzer.analyze(&media);
        assert_eq!(boundaries.len(), 1);
    }

    #[test]
    fn test_no_audio_track_yields_nothing() {
        let media = media_from_amplitudes(&[]);
        let analyzer = AudioAmplitudeAnalyzer::new(0.4);
        assert!(analyzer.analyze(&media).is_empty());
    }
}
