//! Crop strategy derivation.
//!
//! Produces a [`CropPlan`] for a (scene, platform) pair: weighted focus
//! points, a bounded zoom level, and a pan direction for high-motion scenes.
//! The plan is later lowered to an ffmpeg crop+scale filter chain anchored on
//! the dominant focus point.

use clipforge_models::{
    CropPlan, CropStrategyKind, DetectedScene, FocusPoint, MotionLevel, PanDirection,
    PlatformPreset,
};

/// Derive the spatial reframing plan for one scene on one platform.
pub fn plan_crop(scene: &DetectedScene, platform: &PlatformPreset) -> CropPlan {
    let mut focus_points = vec![FocusPoint::center(0.3)];

    if !scene.speakers.is_empty() {
        // Faces sit above center in almost all footage.
        focus_points.push(FocusPoint::new(0.5, 0.35, 0.8));
    }

    if let Some(extra) = platform_focus(platform.crop_strategy) {
        focus_points.push(extra);
    }

    let mut zoom_level = 1.0_f64;
    if platform.aspect_ratio.is_vertical() {
        zoom_level *= 1.2;
    }
    if scene.speakers.len() > 1 {
        zoom_level *= 0.9;
    }
    let zoom_level = zoom_level.clamp(1.0, 2.0);

    let pan_direction = if scene.motion_level == MotionLevel::High {
        // Alternate by scene ordinal so consecutive action clips don't all
        // sweep the same way.
        if scene.id % 2 == 0 {
            PanDirection::Left
        } else {
            PanDirection::Right
        }
    } else {
        PanDirection::None
    };

    CropPlan {
        kind: platform.crop_strategy,
        focus_points,
        zoom_level,
        pan_direction,
        tracking_enabled: matches!(
            platform.crop_strategy,
            CropStrategyKind::FaceTracking | CropStrategyKind::ActionFollowing
        ),
    }
}

/// Platform-specific extra focus point, weight up to 1.0.
fn platform_focus(strategy: CropStrategyKind) -> Option<FocusPoint> {
    match strategy {
        CropStrategyKind::FaceTracking => Some(FocusPoint::new(0.5, 0.3, 1.0)),
        CropStrategyKind::SpeakerFocus => Some(FocusPoint::new(0.5, 0.4, 0.9)),
        CropStrategyKind::ActionFollowing => Some(FocusPoint::new(0.5, 0.5, 0.85)),
        CropStrategyKind::Smart => Some(FocusPoint::new(0.5, 0.45, 0.7)),
        CropStrategyKind::Center => None,
    }
}

/// Lower a crop plan to an ffmpeg `crop=...,scale=WxH` video filter.
///
/// The crop window matches the target aspect ratio, shrunk by the zoom
/// level and centered on the dominant focus point, clamped inside the
/// source frame.
pub fn crop_filter(
    plan: &CropPlan,
    source_width: u32,
    source_height: u32,
    platform: &PlatformPreset,
) -> String {
    let src_w = source_width as f64;
    let src_h = source_height as f64;
    let target = platform.aspect_ratio.as_f64();

    // Largest window with the target aspect ratio that fits the source.
    let (mut crop_w, mut crop_h) = if src_w / src_h > target {
        (src_h * target, src_h)
    } else {
        (src_w, src_w / target)
    };
    crop_w /= plan.zoom_level;
    crop_h /= plan.zoom_level;

    let focus = plan.dominant_focus();
    let x = (focus.x * src_w - crop_w / 2.0).clamp(0.0, src_w - crop_w);
    let y = (focus.y * src_h - crop_h / 2.0).clamp(0.0, src_h - crop_h);

    format!(
        "crop={}:{}:{}:{},scale={}:{}",
        crop_w.round() as u32,
        crop_h.round() as u32,
        x.round() as u32,
        y.round() as u32,
        platform.width,
        platform.height
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipforge_models::find_preset;
    use std::collections::BTreeMap;

    fn scene(speakers: usize, motion: MotionLevel) -> DetectedScene {
        DetectedScene {
            id: 1,
            start_time: 0.0,
            end_time: 20.0,
            duration: 20.0,
            confidence: 0.7,
            detection_methods: BTreeMap::new(),
            context_score: 0.5,
            narrative_importance: 0.5,
            viral_potential: 0.6,
            speakers: (1..=speakers).map(|n| format!("speaker-{n}")).collect(),
            dominant_colors: Vec::new(),
            motion_level: motion,
            audio_features: Default::default(),
            thumbnail: None,
        }
    }

    #[test]
    fn test_zoom_always_bounded() {
        for platform in clipforge_models::builtin_presets() {
            for speakers in 0..4 {
                let plan = plan_crop(&scene(speakers, MotionLevel::Medium), &platform);
                assert!(
                    (1.0..=2.0).contains(&plan.zoom_level),
                    "zoom {} out of range for {}",
                    plan.zoom_level,
                    platform.id
                );
            }
        }
    }

    #[test]
    fn test_vertical_platform_zooms_in() {
        let tiktok = find_preset("tiktok").unwrap();
        let plan = plan_crop(&scene(0, MotionLevel::Low), &tiktok);
        assert!((plan.zoom_level - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_multi_speaker_widens() {
        let tiktok = find_preset("tiktok").unwrap();
        let plan = plan_crop(&scene(2, MotionLevel::Low), &tiktok);
        // 1.2 * 0.9, still >= 1.0.
        assert!((plan.zoom_level - 1.08).abs() < 1e-9);
    }

    #[test]
    fn test_speakers_add_face_focus_point() {
        let tiktok = find_preset("tiktok").unwrap();
        let without = plan_crop(&scene(0, MotionLevel::Low), &tiktok);
        let with = plan_crop(&scene(1, MotionLevel::Low), &tiktok);
        assert_eq!(with.focus_points.len(), without.focus_points.len() + 1);
    }

    #[test]
    fn test_pan_only_for_high_motion() {
        let tiktok = find_preset("tiktok").unwrap();
        assert_eq!(
            plan_crop(&scene(0, MotionLevel::Medium), &tiktok).pan_direction,
            PanDirection::None
        );
        assert_ne!(
            plan_crop(&scene(0, MotionLevel::High), &tiktok).pan_direction,
            PanDirection::None
        );
    }

    #[test]
    fn test_crop_filter_fits_source() {
        let tiktok = find_preset("tiktok").unwrap();
        let plan = plan_crop(&scene(1, MotionLevel::Low), &tiktok);
        let filter = crop_filter(&plan, 1920, 1080, &tiktok);
        assert!(filter.starts_with("crop="));
        assert!(filter.ends_with("scale=1080:1920"));
    }
}
