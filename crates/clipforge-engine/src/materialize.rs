//! Scene materializer.
//!
//! Turns refined boundaries into [`DetectedScene`] records: adjacent boundary
//! pairs become intervals, capped at `max_scenes`, and each interval is
//! enriched with derived scores plus speaker, color, motion, and audio
//! descriptors computed from the sampled media.

use std::collections::BTreeMap;

use clipforge_models::{
    AudioFeatures, DetectedScene, DetectionMethod, MotionLevel, SceneDetectionConfig,
};

use crate::analyzers::motion_vector::motion_magnitude;
use crate::fusion::FusedBoundary;
use crate::sample::{SampledFrame, SampledMedia};
use crate::vision::FaceCounter;

/// Scene length, in seconds, at which `context_score` peaks.
const IDEAL_SCENE_SECS: f64 = 15.0;

/// Adjacent scene pairs shorter than this combined are candidates for the
/// context-preserving merge pass.
const CONTEXT_MERGE_MAX_SECS: f64 = 20.0;

/// Number of dominant colors reported per scene.
const DOMINANT_COLOR_COUNT: usize = 3;

/// Materialize refined boundaries into a capped, ordered scene list.
pub fn materialize(
    boundaries: &[FusedBoundary],
    media: &SampledMedia,
    config: &SceneDetectionConfig,
    faces: &dyn FaceCounter,
) -> Vec<DetectedScene> {
    let mut scenes: Vec<DetectedScene> = boundaries
        .windows(2)
        .take(config.max_scenes)
        .enumerate()
        .map(|(index, pair)| build_scene(index as u32 + 1, &pair[0], &pair[1], media, faces))
        .collect();

    if config.wants_context_merge() {
        scenes = merge_for_context(scenes, media);
    }

    scenes
}

fn build_scene(
    id: u32,
    opening: &FusedBoundary,
    closing: &FusedBoundary,
    media: &SampledMedia,
    faces: &dyn FaceCounter,
) -> DetectedScene {
    let start_time = opening.timestamp;
    let end_time = closing.timestamp;
    let duration = end_time - start_time;

    let detection_methods: BTreeMap<DetectionMethod, f64> = opening
        .contributions
        .iter()
        .filter(|(_, confidence)| **confidence > 0.0)
        .map(|(method, confidence)| (*method, *confidence))
        .collect();

    let frames: Vec<&SampledFrame> = media.frames_between(start_time, end_time).collect();
    let motion_level = classify_motion(&frames);
    let speakers = speaker_labels(&frames, faces);
    let dominant_colors = dominant_colors(&frames);
    let audio_features = audio_features(media, start_time, end_time);

    let midpoint = start_time + duration / 2.0;
    let scene = DetectedScene {
        id,
        start_time,
        end_time,
        duration,
        confidence: opening.confidence,
        detection_methods,
        context_score: context_score(duration),
        narrative_importance: narrative_importance(midpoint, media.duration),
        viral_potential: 0.0,
        speakers,
        dominant_colors,
        motion_level,
        audio_features,
        thumbnail: None,
    };

    DetectedScene {
        viral_potential: viral_potential(&scene, opening.method),
        ..scene
    }
}

/// Closeness to the ideal standalone-scene length, peaking at 15s.
fn context_score(duration: f64) -> f64 {
    (-(duration - IDEAL_SCENE_SECS).abs() / IDEAL_SCENE_SECS).exp()
}

/// Positional importance: openings and endings matter most, the middle act
/// somewhat, everything else is filler until proven otherwise.
fn narrative_importance(midpoint: f64, total_duration: f64) -> f64 {
    if total_duration <= 0.0 {
        return 0.5;
    }
    let position = midpoint / total_duration;
    if position < 0.1 || position > 0.9 {
        0.9
    } else if (0.4..=0.6).contains(&position) {
        0.8
    } else {
        0.5
    }
}

/// Short-form potential: boundary confidence boosted for clip-friendly
/// durations and for motion/audio-triggered cuts.
fn viral_potential(scene: &DetectedScene, method: Option<DetectionMethod>) -> f64 {
    let mut potential = scene.confidence;
    if (10.0..=30.0).contains(&scene.duration) {
        potential *= 1.2;
    }
    if matches!(
        method,
        Some(DetectionMethod::MotionVector) | Some(DetectionMethod::AudioAmplitude)
    ) {
        potential *= 1.1;
    }
    potential.clamp(0.0, 1.0)
}

fn classify_motion(frames: &[&SampledFrame]) -> MotionLevel {
    if frames.len() < 2 {
        return MotionLevel::Low;
    }
    let total: f64 = frames
        .windows(2)
        .map(|pair| motion_magnitude(pair[0], pair[1]))
        .sum();
    let mean = total / (frames.len() - 1) as f64;
    if mean < 0.25 {
        MotionLevel::Low
    } else if mean < 0.5 {
        MotionLevel::Medium
    } else {
        MotionLevel::High
    }
}

/// Positional speaker labels from the highest concurrent face count seen in
/// the interval.
fn speaker_labels(frames: &[&SampledFrame], faces: &dyn FaceCounter) -> Vec<String> {
    let max_faces = frames
        .iter()
        .map(|frame| faces.count_faces(frame))
        .max()
        .unwrap_or(0);
    (1..=max_faces).map(|n| format!("speaker-{n}")).collect()
}

/// Top colors over the interval, quantized to 4 levels per channel.
fn dominant_colors(frames: &[&SampledFrame]) -> Vec<String> {
    let mut buckets: BTreeMap<(u8, u8, u8), u64> = BTreeMap::new();
    for frame in frames {
        for pixel in frame.rgb.chunks_exact(3) {
            let key = (pixel[0] >> 6, pixel[1] >> 6, pixel[2] >> 6);
            *buckets.entry(key).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<((u8, u8, u8), u64)> = buckets.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(DOMINANT_COLOR_COUNT)
        .map(|((r, g, b), _)| {
            // Bucket center: level * 64 + 32.
            format!(
                "#{:02x}{:02x}{:02x}",
                r as u32 * 64 + 32,
                g as u32 * 64 + 32,
                b as u32 * 64 + 32
            )
        })
        .collect()
}

fn audio_features(media: &SampledMedia, start: f64, end: f64) -> AudioFeatures {
    let amplitudes: Vec<f64> = media.audio_between(start, end).map(|w| w.amplitude).collect();
    if amplitudes.is_empty() {
        return AudioFeatures::default();
    }

    let average = amplitudes.iter().sum::<f64>() / amplitudes.len() as f64;
    // Mid-band energy with swings reads as speech, sustained loud energy as
    // music; crude but stable across identical inputs.
    let speech = amplitudes
        .iter()
        .filter(|a| (0.03..0.35).contains(*a))
        .count() as f64
        / amplitudes.len() as f64;
    let music = amplitudes.iter().filter(|a| **a >= 0.35).count() as f64 / amplitudes.len() as f64;

    AudioFeatures {
        average_amplitude: average,
        speech_ratio: speech,
        music_ratio: music,
    }
}

/// Merge adjacent short scenes that clearly belong together: combined
/// duration under 20s, at least one shared speaker, identical motion level.
fn merge_for_context(scenes: Vec<DetectedScene>, media: &SampledMedia) -> Vec<DetectedScene> {
    let mut merged: Vec<DetectedScene> = Vec::with_capacity(scenes.len());

    for scene in scenes {
        match merged.last_mut() {
            Some(prev)
                if prev.duration + scene.duration < CONTEXT_MERGE_MAX_SECS
                    && prev.shares_speaker_with(&scene)
                    && prev.motion_level == scene.motion_level =>
            {
                prev.end_time = scene.end_time;
                prev.duration = prev.end_time - prev.start_time;
                prev.confidence = prev.confidence.max(scene.confidence);
                for (method, confidence) in scene.detection_methods {
                    let entry = prev.detection_methods.entry(method).or_insert(0.0);
                    if confidence > *entry {
                        *entry = confidence;
                    }
                }
                if scene.speakers.len() > prev.speakers.len() {
                    prev.speakers = scene.speakers;
                }
                for color in scene.dominant_colors {
                    if !prev.dominant_colors.contains(&color)
                        && prev.dominant_colors.len() < DOMINANT_COLOR_COUNT
                    {
                        prev.dominant_colors.push(color);
                    }
                }
                prev.context_score = context_score(prev.duration);
                prev.narrative_importance = narrative_importance(prev.midpoint(), media.duration);
                prev.viral_potential = viral_potential(prev, None);
                prev.audio_features = audio_features(media, prev.start_time, prev.end_time);
            }
            _ => merged.push(scene),
        }
    }

    // Re-number after merging so ids stay ordinal.
    for (index, scene) in merged.iter_mut().enumerate() {
        scene.id = index as u32 + 1;
    }
    merged
}
