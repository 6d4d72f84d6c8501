//! Engagement analysis for a (scene, platform) pair.

use clipforge_models::{DetectedScene, EngagementFactors, MotionLevel, Pacing, PlatformPreset};

/// Cap on the bonus for multi-analyzer agreement on the opening boundary.
const METHOD_COUNT_BONUS_CAP: f64 = 0.3;

/// Pacing fit lookup: how well a scene's motion level suits the platform's
/// ideal pacing. Rows are the platform pacing, columns the scene motion.
const PACING_TABLE: [[f64; 3]; 3] = [
    // low   medium  high
    [0.5, 0.8, 1.0], // fast
    [0.7, 1.0, 0.7], // medium
    [1.0, 0.8, 0.4], // slow
];

fn pacing_fit(ideal: Pacing, motion: MotionLevel) -> f64 {
    let row = match ideal {
        Pacing::Fast => 0,
        Pacing::Medium => 1,
        Pacing::Slow => 2,
    };
    let col = match motion {
        MotionLevel::Low => 0,
        MotionLevel::Medium => 1,
        MotionLevel::High => 2,
    };
    PACING_TABLE[row][col]
}

fn motion_score(motion: MotionLevel) -> f64 {
    match motion {
        MotionLevel::Low => 0.3,
        MotionLevel::Medium => 0.6,
        MotionLevel::High => 0.9,
    }
}

/// Compute the engagement profile for one scene on one platform.
///
/// Hook strength rewards confident boundaries backed by several analyzers,
/// amplified on platforms with short attention spans. Every component is
/// clamped to [0, 1].
pub fn analyze_engagement(scene: &DetectedScene, platform: &PlatformPreset) -> EngagementFactors {
    let method_bonus =
        (scene.triggered_method_count() as f64 / 5.0).min(METHOD_COUNT_BONUS_CAP);
    let hook_strength =
        ((scene.confidence + method_bonus) * platform.attention_multiplier()).min(1.0);

    let color_diversity = (scene.dominant_colors.len() as f64 / 3.0).min(1.0);
    let visual_appeal = (motion_score(scene.motion_level) + color_diversity) / 2.0;

    let pacing = pacing_fit(platform.content_guidelines.ideal_pacing, scene.motion_level);

    let content_density = ((scene.duration / 30.0).min(1.0)
        + (scene.speakers.len() as f64 / 3.0).min(1.0))
        / 2.0;

    EngagementFactors {
        hook_strength,
        visual_appeal,
        pacing,
        content_density,
        emotional_impact: scene.viral_potential,
        viral_potential: scene.viral_potential,
    }
}

/// Target clip length for this scene on this platform, seconds.
///
/// The platform's preferred length stretches or shrinks with viral
/// potential, bounded below by 5s and above by both the scene itself and the
/// platform's hard cap.
pub fn optimal_duration(scene: &DetectedScene, platform: &PlatformPreset) -> f64 {
    let target =
        platform.content_guidelines.preferred_length * (0.7 + 0.6 * scene.viral_potential);
    let upper = scene.duration.min(platform.max_duration);
    target.clamp(5.0_f64.min(upper), upper)
}
