//! Boundary fusion engine.
//!
//! Combines the analyzers' weighted boundary candidates into one ordered,
//! de-duplicated list, then refines it into cut points that respect the
//! minimum scene duration. Given identical inputs and configuration the
//! output is fully deterministic: there is no randomness anywhere in
//! weighting, merging, or refinement, and ties are broken by a fixed
//! (timestamp, method) order.

use std::collections::{BTreeMap, HashMap};

use clipforge_models::{DetectionMethod, SceneBoundary, SceneDetectionConfig};

/// Candidates closer than this collapse into one boundary.
pub const MERGE_WINDOW_SECS: f64 = 2.0;

/// A boundary after fusion: the winning candidate plus every method's
/// contribution that was folded into it, or a synthetic timeline endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedBoundary {
    /// Position in the source, seconds
    pub timestamp: f64,
    /// Weighted confidence of the winning candidate, in [0, 1]
    pub confidence: f64,
    /// Winning method; `None` for the synthetic start/end markers
    pub method: Option<DetectionMethod>,
    /// Weighted confidence per contributing method (max when a method
    /// contributed more than one merged candidate)
    pub contributions: BTreeMap<DetectionMethod, f64>,
}

impl FusedBoundary {
    fn from_candidate(boundary: &SceneBoundary, weight: f64) -> Self {
        let confidence = (boundary.confidence * weight).clamp(0.0, 1.0);
        let mut contributions = BTreeMap::new();
        contributions.insert(boundary.method, confidence);
        Self {
            timestamp: boundary.timestamp,
            confidence,
            method: Some(boundary.method),
            contributions,
        }
    }

    /// Synthetic marker pinning the timeline start or end.
    fn synthetic(timestamp: f64) -> Self {
        Self {
            timestamp,
            confidence: 1.0,
            method: None,
            contributions: BTreeMap::new(),
        }
    }

    /// Fold a losing candidate's contributions into this boundary.
    fn absorb(&mut self, other: &FusedBoundary) {
        for (method, confidence) in &other.contributions {
            let entry = self.contributions.entry(*method).or_insert(0.0);
            if *confidence > *entry {
                *entry = *confidence;
            }
        }
    }
}

/// Fusion weight configured for a method.
fn method_weight(config: &SceneDetectionConfig, method: DetectionMethod) -> f64 {
    match method {
        DetectionMethod::PixelDifference => config.pixel_difference.weight,
        DetectionMethod::AudioAmplitude => config.audio_amplitude.weight,
        DetectionMethod::ColorHistogram => config.color_histogram.weight,
        DetectionMethod::MotionVector => config.motion_vector.weight,
        DetectionMethod::FaceDetection => config.face_detection.weight,
    }
}

/// Weight, pool, sort, and merge the analyzers' boundary candidates.
///
/// Candidates within [`MERGE_WINDOW_SECS`] of the previously retained
/// boundary collapse into it, keeping whichever confidence is higher while
/// remembering every method's contribution.
pub fn fuse(
    results: &HashMap<DetectionMethod, Vec<SceneBoundary>>,
    config: &SceneDetectionConfig,
) -> Vec<FusedBoundary> {
    let mut pooled: Vec<FusedBoundary> = results
        .iter()
        .flat_map(|(method, boundaries)| {
            let weight = method_weight(config, *method);
            boundaries
                .iter()
                .map(move |b| FusedBoundary::from_candidate(b, weight))
        })
        .collect();

    // Fixed tie order keeps fusion deterministic regardless of HashMap
    // iteration order.
    pooled.sort_by(|a, b| {
        a.timestamp
            .total_cmp(&b.timestamp)
            .then_with(|| a.method.cmp(&b.method))
    });

    let mut merged: Vec<FusedBoundary> = Vec::with_capacity(pooled.len());
    for candidate in pooled {
        match merged.last_mut() {
            Some(last) if candidate.timestamp - last.timestamp < MERGE_WINDOW_SECS => {
                if candidate.confidence > last.confidence {
                    let mut winner = candidate;
                    winner.absorb(last);
                    *last = winner;
                } else {
                    last.absorb(&candidate);
                }
            }
            _ => merged.push(candidate),
        }
    }

    merged
}

/// Refine merged boundaries into final cut points.
///
/// Prepends a synthetic boundary at t=0 and appends one at t=duration, then
/// walks left-to-right dropping any boundary that would create a scene
/// shorter than `min_scene_duration` relative to the last kept boundary, a
/// greedy spacing filter rather than a global optimization. The closing marker is
/// always kept; interior boundaries too close to it are dropped instead.
pub fn refine(
    merged: Vec<FusedBoundary>,
    min_scene_duration: f64,
    duration: f64,
) -> Vec<FusedBoundary> {
    let mut refined = vec![FusedBoundary::synthetic(0.0)];

    for boundary in merged {
        if boundary.timestamp <= 0.0 || boundary.timestamp >= duration {
            continue;
        }
        let last = refined[refined.len() - 1].timestamp;
        if boundary.timestamp - last >= min_scene_duration {
            refined.push(boundary);
        }
    }

    // The final scene honors the minimum too; trailing interior boundaries
    // give way to the end marker.
    while refined.len() > 1
        && duration - refined[refined.len() - 1].timestamp < min_scene_duration
    {
        refined.pop();
    }

    refined.push(FusedBoundary::synthetic(duration));
    refined
}

/// Full fusion pipeline: weight, pool, merge, refine.
pub fn fuse_and_refine(
    results: &HashMap<DetectionMethod, Vec<SceneBoundary>>,
    config: &SceneDetectionConfig,
    duration: f64,
) -> Vec<FusedBoundary> {
    refine(fuse(results, config), config.min_scene_duration, duration)
}
