//! Signal analyzers.
//!
//! Five independent algorithms, each consuming the shared [`SampledMedia`]
//! snapshot plus its own settings and emitting ordered boundary candidates.
//! Analyzers are pure functions over their inputs with no shared mutable
//! state, so the runner executes them concurrently on blocking-friendly
//! threads.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use tracing::debug;

use clipforge_models::{DetectionMethod, SceneBoundary, SceneDetectionConfig};

use crate::sample::SampledMedia;
use crate::vision::{resolve_face_counter, VisionProvider};

pub mod audio_amplitude;
pub mod color_histogram;
pub mod face_change;
pub mod motion_vector;
pub mod pixel_diff;

pub use audio_amplitude::AudioAmplitudeAnalyzer;
pub use color_histogram::ColorHistogramAnalyzer;
pub use face_change::FaceChangeAnalyzer;
pub use motion_vector::MotionVectorAnalyzer;
pub use pixel_diff::PixelDifferenceAnalyzer;

/// A boundary-candidate producer for one detection method.
pub trait BoundaryAnalyzer: Send + Sync {
    /// The method tag this analyzer emits.
    fn method(&self) -> DetectionMethod;

    /// Produce boundary candidates, ordered ascending by timestamp.
    fn analyze(&self, media: &SampledMedia) -> Vec<SceneBoundary>;
}

/// Build the analyzers enabled by `config`.
pub fn enabled_analyzers(
    config: &SceneDetectionConfig,
    vision: &dyn VisionProvider,
) -> Vec<Box<dyn BoundaryAnalyzer>> {
    let mut analyzers: Vec<Box<dyn BoundaryAnalyzer>> = Vec::new();

    if config.pixel_difference.enabled {
        analyzers.push(Box::new(PixelDifferenceAnalyzer::new(
            config.pixel_difference.threshold,
        )));
    }
    if config.audio_amplitude.enabled {
        analyzers.push(Box::new(AudioAmplitudeAnalyzer::new(
            config.audio_amplitude.threshold,
        )));
    }
    if config.color_histogram.enabled {
        analyzers.push(Box::new(ColorHistogramAnalyzer::new(
            config.color_histogram.threshold,
        )));
    }
    if config.motion_vector.enabled {
        analyzers.push(Box::new(MotionVectorAnalyzer::new(
            config.motion_vector.threshold,
        )));
    }
    if config.face_detection.enabled {
        analyzers.push(Box::new(FaceChangeAnalyzer::new(
            config.face_detection.speaker_change_threshold,
            resolve_face_counter(vision),
        )));
    }

    analyzers
}

/// Run every enabled analyzer concurrently over the sampled media.
///
/// Disabled analyzers contribute no entry; an enabled analyzer that found
/// nothing contributes an empty list.
pub async fn run_analyzers(
    media: Arc<SampledMedia>,
    config: &SceneDetectionConfig,
    vision: &dyn VisionProvider,
) -> HashMap<DetectionMethod, Vec<SceneBoundary>> {
    let analyzers = enabled_analyzers(config, vision);

    let handles: Vec<_> = analyzers
        .into_iter()
        .map(|analyzer| {
            let media = Arc::clone(&media);
            tokio::task::spawn_blocking(move || {
                let method = analyzer.method();
                let boundaries = analyzer.analyze(&media);
                debug!(
                    method = %method,
                    candidates = boundaries.len(),
                    "analyzer finished"
                );
                (method, boundaries)
            })
        })
        .collect();

    let mut results = HashMap::new();
    for joined in join_all(handles).await {
        // Analyzer panics surface as a missing entry rather than poisoning
        // the whole detection; fusion treats it like a disabled analyzer.
        if let Ok((method, boundaries)) = joined {
            results.insert(method, boundaries);
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::media_from_colors;
    use crate::vision::NoVision;

    #[tokio::test]
    async fn test_disabled_analyzers_contribute_nothing() {
        let mut config = SceneDetectionConfig::default();
        config.audio_amplitude.enabled = false;
        config.color_histogram.enabled = false;
        config.motion_vector.enabled = false;
        config.face_detection.enabled = false;

        let media = Arc::new(media_from_colors(&[(0, 0, 0), (255, 255, 255)]));
        let results = run_analyzers(media, &config, &NoVision).await;

        assert_eq!(results.len(), 1);
        assert!(results.contains_key(&DetectionMethod::PixelDifference));
    }

    #[tokio::test]
    async fn test_all_enabled_analyzers_report() {
        let config = SceneDetectionConfig::default();
        let media = Arc::new(media_from_colors(&[(0, 0, 0), (255, 255, 255)]));
        let results = run_analyzers(media, &config, &NoVision).await;
        assert_eq!(results.len(), 5);
    }
}
