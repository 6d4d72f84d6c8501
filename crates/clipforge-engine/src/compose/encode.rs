//! Clip trim/encode parameters and the renderer seam.

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use clipforge_models::{
    encode_target, CropPlan, DetectedScene, PlatformPreset, VideoMetadata, DEFAULT_AUDIO_CODEC,
    DEFAULT_PRESET, DEFAULT_VIDEO_CODEC,
};

use crate::command::{run_ffmpeg, FfmpegCommand};
use crate::compose::crop::crop_filter;
use crate::error::EngineResult;
use crate::probe::probe_video;

/// Everything the renderer needs to cut one clip from the source.
#[derive(Debug, Clone)]
pub struct EncodeParams {
    /// Trim start in the source, seconds; backed off 1s before the scene cut
    /// so the clip does not open mid-motion
    pub start: f64,
    /// Clip length, seconds
    pub duration: f64,
    /// `crop=...,scale=WxH` filter chain
    pub video_filter: String,
    pub fps: u32,
    pub video_bitrate: &'static str,
    pub audio_bitrate: &'static str,
    /// Audio kept iff the platform requires it and the caller preserves it
    pub include_audio: bool,
}

impl EncodeParams {
    /// Derive encode parameters for one (scene, platform) pair.
    pub fn derive(
        scene: &DetectedScene,
        platform: &PlatformPreset,
        crop: &CropPlan,
        source: &VideoMetadata,
        optimal_duration: f64,
        preserve_audio: bool,
    ) -> Self {
        let start = (scene.start_time - 1.0).max(0.0);
        let end = scene.start_time + optimal_duration;
        let target = encode_target(&platform.id);

        Self {
            start,
            duration: end - start,
            video_filter: crop_filter(crop, source.width, source.height, platform),
            fps: target.fps,
            video_bitrate: target.video_bitrate,
            audio_bitrate: target.audio_bitrate,
            include_audio: platform.audio_required && preserve_audio,
        }
    }
}

/// Renders one clip from a source file. The seam between composition logic
/// and the actual encoder, so orchestration tests can run without ffmpeg.
#[async_trait]
pub trait ClipRenderer: Send + Sync {
    /// Encode `params` from `source` into `output`, returning the metadata
    /// of the written file.
    async fn render(
        &self,
        source: &Path,
        output: &Path,
        params: &EncodeParams,
    ) -> EngineResult<VideoMetadata>;
}

/// The real renderer: shells out to ffmpeg and probes the result.
#[derive(Debug, Default, Clone)]
pub struct FfmpegRenderer;

#[async_trait]
impl ClipRenderer for FfmpegRenderer {
    async fn render(
        &self,
        source: &Path,
        output: &Path,
        params: &EncodeParams,
    ) -> EngineResult<VideoMetadata> {
        let mut command = FfmpegCommand::new(source, output)
            .seek(params.start)
            .duration(params.duration)
            .video_filter(params.video_filter.as_str())
            .video_codec(DEFAULT_VIDEO_CODEC)
            .preset(DEFAULT_PRESET)
            .fps(params.fps)
            .video_bitrate(params.video_bitrate);

        if params.include_audio {
            command = command
                .audio_codec(DEFAULT_AUDIO_CODEC)
                .audio_bitrate(params.audio_bitrate);
        } else {
            command = command.no_audio();
        }

        debug!(output = %output.display(), "encoding clip");
        run_ffmpeg(&command).await?;
        probe_video(output).await
    }
}

/// Test renderer: writes nothing, returns metadata synthesized from params.
#[derive(Debug, Default, Clone)]
pub struct NullRenderer;

#[async_trait]
impl ClipRenderer for NullRenderer {
    async fn render(
        &self,
        _source: &Path,
        _output: &Path,
        params: &EncodeParams,
    ) -> EngineResult<VideoMetadata> {
        Ok(VideoMetadata {
            duration: params.duration,
            width: 0,
            height: 0,
            fps: params.fps as f64,
            bitrate: 0,
            format: "mp4".to_string(),
            size: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipforge_models::find_preset;
    use std::collections::BTreeMap;

    fn scene(start: f64, duration: f64) -> DetectedScene {
        DetectedScene {
            id: 1,
            start_time: start,
            end_time: start + duration,
            duration,
            confidence: 0.7,
            detection_methods: BTreeMap::new(),
            context_score: 0.5,
            narrative_importance: 0.5,
            viral_potential: 0.6,
            speakers: Vec::new(),
            dominant_colors: Vec::new(),
            motion_level: Default::default(),
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

    #[test]
    fn test_trim_backs_off_one_second() {
        let s = scene(30.0, 20.0);
        let platform = find_preset("tiktok").unwrap();
        let crop = crate::compose::crop::plan_crop(&s, &platform);
        let params = EncodeParams::derive(&s, &platform, &crop, &source_meta(), 15.0, true);

        assert!((params.start - 29.0).abs() < 1e-9);
        assert!((params.duration - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_trim_clamps_at_zero() {
        let s = scene(0.5, 20.0);
        let platform = find_preset("tiktok").unwrap();
        let crop = crate::compose::crop::plan_crop(&s, &platform);
        let params = EncodeParams::derive(&s, &platform, &crop, &source_meta(), 10.0, true);
        assert_eq!(params.start, 0.0);
    }

    #[test]
    fn test_audio_requires_platform_and_caller() {
        let s = scene(30.0, 20.0);
        let crop_src = source_meta();

        let tiktok = find_preset("tiktok").unwrap(); // audio required
        let shorts = find_preset("youtube-shorts").unwrap(); // audio optional
        let crop = crate::compose::crop::plan_crop(&s, &tiktok);

        assert!(EncodeParams::derive(&s, &tiktok, &crop, &crop_src, 15.0, true).include_audio);
        assert!(!EncodeParams::derive(&s, &tiktok, &crop, &crop_src, 15.0, false).include_audio);
        assert!(!EncodeParams::derive(&s, &shorts, &crop, &crop_src, 15.0, true).include_audio);
    }

    #[test]
    fn test_platform_bitrate_lookup() {
        let s = scene(30.0, 20.0);
        let shorts = find_preset("youtube-shorts").unwrap();
        let crop = crate::compose::crop::plan_crop(&s, &shorts);
        let params = EncodeParams::derive(&s, &shorts, &crop, &source_meta(), 15.0, true);
        assert_eq!(params.fps, 60);
        assert_eq!(params.video_bitrate, "8M");
    }
}
