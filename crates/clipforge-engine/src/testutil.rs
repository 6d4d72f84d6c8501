//! Shared fixtures for engine unit tests.

use crate::sample::{AudioWindow, SampledFrame, SampledMedia};

/// Build a flat-color 16x9 test frame.
pub(crate) fn solid_frame(timestamp: f64, r: u8, g: u8, b: u8) -> SampledFrame {
    let width = 16;
    let height = 9;
    let mut rgb = Vec::with_capacity((width * height * 3) as usize);
    for _ in 0..(width * height) {
        rgb.extend_from_slice(&[r, g, b]);
    }
    SampledFrame {
        timestamp,
        width,
        height,
        rgb,
    }
}

/// Media made of flat-color frames at 1s stride, no audio.
pub(crate) fn media_from_colors(colors: &[(u8, u8, u8)]) -> SampledMedia {
    SampledMedia {
        duration: colors.len() as f64,
        frames: colors
            .iter()
            .enumerate()
            .map(|(i, &(r, g, b))| solid_frame(i as f64, r, g, b))
            .collect(),
        audio: Vec::new(),
        frame_stride: 1.0,
        audio_stride: 0.5,
    }
}

/// Media with the given audio amplitudes at 0.5s stride and a single frame.
pub(crate) fn media_from_amplitudes(amplitudes: &[f64]) -> SampledMedia {
    SampledMedia {
        duration: amplitudes.len() as f64 * 0.5,
        frames: vec![solid_frame(0.0, 128, 128, 128)],
        audio: amplitudes
            .iter()
            .enumerate()
            .map(|(i, &amplitude)| AudioWindow {
                timestamp: i as f64 * 0.5,
                amplitude,
            })
            .collect(),
        frame_stride: 1.0,
        audio_stride: 0.5,
    }
}
