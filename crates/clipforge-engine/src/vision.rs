//! Vision capability seam for the face/speaker analyzer.
//!
//! Face counting may be backed by an external AI-capability provider; when no
//! model is loaded, a deterministic skin-region heuristic over the sampled
//! frames is used instead. Detection must stay deterministic, so the fallback
//! never involves randomness.

use std::sync::Arc;

use crate::sample::SampledFrame;

/// Model name the face analyzer asks the provider for.
pub const FACE_MODEL: &str = "face-detector";

/// Capability handle: count faces visible in one sampled frame.
pub trait FaceCounter: Send + Sync {
    fn count_faces(&self, frame: &SampledFrame) -> usize;
}

/// External AI-capability provider interface.
pub trait VisionProvider: Send + Sync {
    /// Whether a named model is loaded and queryable.
    fn is_model_loaded(&self, name: &str) -> bool;

    /// Get a capability handle for a loaded model.
    fn get_model(&self, name: &str) -> Option<Arc<dyn FaceCounter>>;
}

/// Provider with no models; forces the heuristic fallback.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVision;

impl VisionProvider for NoVision {
    fn is_model_loaded(&self, _name: &str) -> bool {
        false
    }

    fn get_model(&self, _name: &str) -> Option<Arc<dyn FaceCounter>> {
        None
    }
}

/// Resolve the face counter to use: the provider's model when loaded, the
/// skin-region heuristic otherwise.
pub fn resolve_face_counter(provider: &dyn VisionProvider) -> Arc<dyn FaceCounter> {
    if provider.is_model_loaded(FACE_MODEL) {
        if let Some(model) = provider.get_model(FACE_MODEL) {
            return model;
        }
    }
    Arc::new(SkinRegionCounter::default())
}

/// Grid resolution the heuristic evaluates skin coverage on.
const GRID_COLS: usize = 8;
const GRID_ROWS: usize = 6;

/// Minimum skin-pixel fraction for a grid cell to count as face-like.
const CELL_SKIN_FRACTION: f64 = 0.35;

/// Deterministic face-count approximation from skin-tone regions.
///
/// Classifies pixels with a standard RGB skin rule, marks grid cells whose
/// skin coverage passes a threshold, and counts 4-connected cell regions.
/// Crude, but stable across runs and adequate as a speaker-change signal.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkinRegionCounter;

impl FaceCounter for SkinRegionCounter {
    fn count_faces(&self, frame: &SampledFrame) -> usize {
        if frame.width == 0 || frame.height == 0 {
            return 0;
        }

        let mut skin_cells = [[false; GRID_COLS]; GRID_ROWS];
        let cell_w = (frame.width as usize).div_ceil(GRID_COLS);
        let cell_h = (frame.height as usize).div_ceil(GRID_ROWS);

        for row in 0..GRID_ROWS {
            for col in 0..GRID_COLS {
                let mut skin = 0usize;
                let mut total = 0usize;
                for y in (row * cell_h)..((row + 1) * cell_h).min(frame.height as usize) {
                    for x in (col * cell_w)..((col + 1) * cell_w).min(frame.width as usize) {
                        let i = (y * frame.width as usize + x) * 3;
                        if is_skin(frame.rgb[i], frame.rgb[i + 1], frame.rgb[i + 2]) {
                            skin += 1;
                        }
                        total += 1;
                    }
                }
                if total > 0 && skin as f64 / total as f64 >= CELL_SKIN_FRACTION {
                    skin_cells[row][col] = true;
                }
            }
        }

        count_regions(&skin_cells)
    }
}

/// Classic RGB skin-tone rule.
fn is_skin(r: u8, g: u8, b: u8) -> bool {
    let (r, g, b) = (r as i32, g as i32, b as i32);
    r > 95 && g > 40 && b > 20 && r > g && r > b && (r - g) > 15
}

/// Count 4-connected regions of marked cells via flood fill.
fn count_regions(cells: &[[bool; GRID_COLS]; GRID_ROWS]) -> usize {
    let mut visited = [[false; GRID_COLS]; GRID_ROWS];
    let mut regions = 0;

    for row in 0..GRID_ROWS {
        for col in 0..GRID_COLS {
            if !cells[row][col] || visited[row][col] {
                continue;
            }
            regions += 1;
            let mut stack = vec![(row, col)];
            while let Some((r, c)) = stack.pop() {
                if visited[r][c] {
                    continue;
                }
                visited[r][c] = true;
                if r > 0 && cells[r - 1][c] {
                    stack.push((r - 1, c));
                }
                if r + 1 < GRID_ROWS && cells[r + 1][c] {
                    stack.push((r + 1, c));
                }
                if c > 0 && cells[r][c - 1] {
                    stack.push((r, c - 1));
                }
                if c + 1 < GRID_COLS && cells[r][c + 1] {
                    stack.push((r, c + 1));
                }
            }
        }
    }

    regions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::solid_frame;

    #[test]
    fn test_no_faces_in_flat_blue() {
        let counter = SkinRegionCounter;
        assert_eq!(counter.count_faces(&solid_frame(0.0, 10, 20, 200)), 0);
    }

    #[test]
    fn test_skin_rule() {
        assert!(is_skin(200, 140, 110)); // light skin tone
        assert!(!is_skin(10, 20, 200)); // blue
        assert!(!is_skin(90, 200, 90)); // green
    }

    #[test]
    fn test_region_counting_separates_blobs() {
        let mut cells = [[false; GRID_COLS]; GRID_ROWS];
        cells[0][0] = true;
        cells[0][1] = true; // one blob
        cells[4][6] = true; // second blob
        assert_eq!(count_regions(&cells), 2);
    }

    #[test]
    fn test_resolver_falls_back_without_model() {
        let counter = resolve_face_counter(&NoVision);
        // Fallback behaves like the heuristic on a skinless frame.
        assert_eq!(counter.count_faces(&solid_frame(0.0, 0, 0, 255)), 0);
    }
}
