//! Platform clip composer.
//!
//! One invocation per (scene, platform) pair: engagement analysis, crop
//! planning, trim/encode, thumbnail capture, and quality scoring, reported
//! through five named progress phases. Invocations share no mutable state;
//! each returns its own [`GeneratedClip`].

pub mod crop;
pub mod encode;
pub mod engagement;

use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;

use clipforge_models::{
    clip_filename, ClipStatus, DetectedScene, GeneratedClip, PlatformPreset, VideoMetadata,
};

use crate::error::EngineResult;
use crate::thumbnail::capture_thumbnail;

pub use encode::{ClipRenderer, EncodeParams, FfmpegRenderer, NullRenderer};
pub use engagement::{analyze_engagement, optimal_duration};

/// Composer progress phases mapped onto 0-100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposePhase {
    Analyzing,
    Cropping,
    Processing,
    Optimizing,
    Finalizing,
}

impl ComposePhase {
    pub const ALL: [ComposePhase; 5] = [
        ComposePhase::Analyzing,
        ComposePhase::Cropping,
        ComposePhase::Processing,
        ComposePhase::Optimizing,
        ComposePhase::Finalizing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ComposePhase::Analyzing => "analyzing",
            ComposePhase::Cropping => "cropping",
            ComposePhase::Processing => "processing",
            ComposePhase::Optimizing => "optimizing",
            ComposePhase::Finalizing => "finalizing",
        }
    }

    /// Percentage reported when this phase begins.
    pub fn percentage(&self) -> f64 {
        match self {
            ComposePhase::Analyzing => 0.0,
            ComposePhase::Cropping => 20.0,
            ComposePhase::Processing => 40.0,
            ComposePhase::Optimizing => 70.0,
            ComposePhase::Finalizing => 90.0,
        }
    }
}

/// Per-invocation composition options.
#[derive(Debug, Clone)]
pub struct ComposeOptions {
    /// Keep the audio track when the platform requires one
    pub preserve_audio: bool,
    /// Directory clips and thumbnails are written into
    pub output_dir: PathBuf,
}

/// Composes platform clips from detected scenes.
pub struct ClipComposer<R: ClipRenderer> {
    renderer: R,
    /// Skip thumbnail capture, used when the renderer writes no real file
    capture_thumbnails: bool,
}

impl<R: ClipRenderer> ClipComposer<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            capture_thumbnails: true,
        }
    }

    pub fn without_thumbnails(renderer: R) -> Self {
        Self {
            renderer,
            capture_thumbnails: false,
        }
    }

    /// Compose one clip for `scene` on `platform`.
    ///
    /// `progress` is invoked at each phase transition with (percentage,
    /// message). Errors surface to the caller; this function never mutates
    /// anything beyond its own output files.
    pub async fn compose(
        &self,
        source: &Path,
        source_meta: &VideoMetadata,
        scene: &DetectedScene,
        platform: &PlatformPreset,
        options: &ComposeOptions,
        mut progress: impl FnMut(f64, String),
    ) -> EngineResult<GeneratedClip> {
        let mut report = |phase: ComposePhase| {
            progress(
                phase.percentage(),
                format!("{} scene {} for {}", phase.as_str(), scene.id, platform.id),
            );
        };

        report(ComposePhase::Analyzing);
        let factors = analyze_engagement(scene, platform);
        let duration = optimal_duration(scene, platform);

        report(ComposePhase::Cropping);
        let crop = crop::plan_crop(scene, platform);

        report(ComposePhase::Processing);
        let params = EncodeParams::derive(
            scene,
            platform,
            &crop,
            source_meta,
            duration,
            options.preserve_audio,
        );
        let output = options.output_dir.join(clip_filename(scene.id, &platform.id));
        let metadata = self.renderer.render(source, &output, &params).await?;

        report(ComposePhase::Optimizing);
        let quality_score = factors.quality_score();

        report(ComposePhase::Finalizing);
        let thumbnail = if self.capture_thumbnails {
            let path = output.with_extension("jpg");
            capture_thumbnail(source, &path, params.start + params.duration / 2.0).await?;
            Some(path)
        } else {
            None
        };

        info!(
            scene = scene.id,
            platform = %platform.id,
            quality = quality_score,
            "clip composed"
        );

        Ok(GeneratedClip {
            id: format!("clip-{}-{}", scene.id, platform.id),
            scene_id: scene.id,
            platform: platform.id.clone(),
            status: ClipStatus::Completed,
            output: Some(output),
            metadata: Some(metadata),
            thumbnail,
            quality_score,
            engagement_factors: factors,
            crop: Some(crop),
            duration,
            aspect_ratio: platform.aspect_ratio,
            error: None,
            created_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipforge_models::{find_preset, MotionLevel};
    use std::collections::BTreeMap;

    fn scene() -> DetectedScene {
        DetectedScene {
            id: 2,
            start_time: 30.0,
            end_time: 50.0,
            duration: 20.0,
            confidence: 0.7,
            detection_methods: BTreeMap::from([(
                clipforge_models::DetectionMethod::PixelDifference,
                0.7,
            )]),
            context_score: 0.7,
            narrative_importance: 0.5,
            viral_potential: 0.8,
            speakers: vec!["speaker-1".into()],
            dominant_colors: vec!["#202020".into()],
            motion_level: MotionLevel::Medium,
            audio_features: Default::default(),
            thumbnail: None,
        }
    }

    fn source_meta() -> VideoMetadata {
        VideoMetadata {
            duration: 300.0,
            width: 1920,
            height: 1080,
            fps: 30.0,
            bitrate: 8_000_000,
            format: "mp4".to_string(),
            size: 100_000_000,
        }
    }

    #[tokio::test]
    async fn test_compose_reports_all_phases_in_order() {
        let composer = ClipComposer::without_thumbnails(NullRenderer);
        let options = ComposeOptions {
            preserve_audio: true,
            output_dir: PathBuf::from("/tmp/clips"),
        };

        let mut percentages = Vec::new();
        let clip = composer
            .compose(
                Path::new("/tmp/source.mp4"),
                &source_meta(),
                &scene(),
                &find_preset("tiktok").unwrap(),
                &options,
                |pct, _| percentages.push(pct),
            )
            .await
            .unwrap();

        assert_eq!(percentages, vec![0.0, 20.0, 40.0, 70.0, 90.0]);
        assert_eq!(clip.status, ClipStatus::Completed);
        assert!(clip.is_terminal());
    }

    #[tokio::test]
    async fn test_compose_quality_is_bounded() {
        let composer = ClipComposer::without_thumbnails(NullRenderer);
        let options = ComposeOptions {
            preserve_audio: false,
            output_dir: PathBuf::from("/tmp/clips"),
        };

        for platform in clipforge_models::builtin_presets() {
            let clip = composer
                .compose(
                    Path::new("/tmp/source.mp4"),
                    &source_meta(),
                    &scene(),
                    &platform,
                    &options,
                    |_, _| {},
                )
                .await
                .unwrap();
            assert!((0.0..=1.0).contains(&clip.quality_score));
            assert!((1.0..=2.0).contains(&clip.crop.as_ref().unwrap().zoom_level));
        }
    }

    #[tokio::test]
    async fn test_compose_respects_scene_bound_duration() {
        let composer = ClipComposer::without_thumbnails(NullRenderer);
        let options = ComposeOptions {
            preserve_audio: true,
            output_dir: PathBuf::from("/tmp/clips"),
        };

        let clip = composer
            .compose(
                Path::new("/tmp/source.mp4"),
                &source_meta(),
                &scene(),
                &find_preset("youtube-shorts").unwrap(),
                &options,
                |_, _| {},
            )
            .await
            .unwrap();
        assert!(clip.duration <= 20.0 + 1e-9);
        assert!(clip.duration >= 5.0);
    }
}
