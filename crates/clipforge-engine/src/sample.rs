//! Strided media sampling.
//!
//! Analyzers never touch the decoder directly: detection runs over a
//! [`SampledMedia`] extracted once per job: downscaled RGB frames at a fixed
//! stride plus RMS audio energy windows. Sampling at a stride (not every
//! frame) bounds analysis cost regardless of source length, and making the
//! analyzers pure functions over this snapshot is what lets them run
//! concurrently with no shared mutable state.

use std::path::Path;
use tokio::process::Command;
use tracing::debug;

use crate::error::{EngineError, EngineResult};

/// Analysis frames are downscaled to this width (height follows aspect).
pub const ANALYSIS_WIDTH: u32 = 160;

/// Default seconds between sampled frames.
pub const DEFAULT_FRAME_STRIDE: f64 = 1.0;

/// Default seconds per audio energy window.
pub const DEFAULT_AUDIO_STRIDE: f64 = 0.5;

/// PCM sample rate used for audio energy extraction.
const AUDIO_SAMPLE_RATE: u32 = 8000;

/// One downscaled frame sampled from the source.
#[derive(Debug, Clone)]
pub struct SampledFrame {
    /// Position in the source, seconds
    pub timestamp: f64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Interleaved RGB8 pixel data, row-major
    pub rgb: Vec<u8>,
}

impl SampledFrame {
    /// Per-pixel luma (Rec. 601) of the frame.
    pub fn luma(&self) -> Vec<u8> {
        self.rgb
            .chunks_exact(3)
            .map(|px| {
                (0.299 * px[0] as f64 + 0.587 * px[1] as f64 + 0.114 * px[2] as f64).round() as u8
            })
            .collect()
    }

    /// Number of pixels in the frame.
    pub fn pixel_count(&self) -> usize {
        (self.width * self.height) as usize
    }
}

/// RMS audio energy over one window.
#[derive(Debug, Clone, Copy)]
pub struct AudioWindow {
    /// Window start, seconds
    pub timestamp: f64,
    /// RMS amplitude normalized to [0, 1]
    pub amplitude: f64,
}

/// A strided snapshot of a media source, sufficient for every analyzer.
#[derive(Debug, Clone, Default)]
pub struct SampledMedia {
    /// Source duration in seconds
    pub duration: f64,
    /// Frames at `frame_stride` spacing, ascending by timestamp
    pub frames: Vec<SampledFrame>,
    /// Audio windows at `audio_stride` spacing, ascending by timestamp
    pub audio: Vec<AudioWindow>,
    /// Seconds between sampled frames
    pub frame_stride: f64,
    /// Seconds per audio window
    pub audio_stride: f64,
}

impl SampledMedia {
    /// Frames whose timestamps fall in `[start, end)`.
    pub fn frames_between(&self, start: f64, end: f64) -> impl Iterator<Item = &SampledFrame> {
        self.frames
            .iter()
            .filter(move |f| f.timestamp >= start && f.timestamp < end)
    }

    /// Audio windows whose timestamps fall in `[start, end)`.
    pub fn audio_between(&self, start: f64, end: f64) -> impl Iterator<Item = &AudioWindow> {
        self.audio
            .iter()
            .filter(move |w| w.timestamp >= start && w.timestamp < end)
    }

    /// The sampled frame closest to `timestamp`.
    pub fn frame_at(&self, timestamp: f64) -> Option<&SampledFrame> {
        self.frames.iter().min_by(|a, b| {
            (a.timestamp - timestamp)
                .abs()
                .total_cmp(&(b.timestamp - timestamp).abs())
        })
    }
}

/// Sample a media file: strided downscaled frames plus audio energy windows.
pub async fn sample_media(
    path: impl AsRef<Path>,
    duration: f64,
    frame_stride: f64,
    audio_stride: f64,
) -> EngineResult<SampledMedia> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(EngineError::FileNotFound(path.to_path_buf()));
    }
    which::which("ffmpeg").map_err(|_| EngineError::FfmpegNotFound)?;

    let frames = extract_frames(path, frame_stride).await?;
    if frames.is_empty() {
        return Err(EngineError::EmptySample);
    }
    // No audio stream is fine; analyzers see an empty window list.
    let audio = extract_audio_windows(path, audio_stride).await.unwrap_or_default();

    debug!(
        frames = frames.len(),
        audio_windows = audio.len(),
        "sampled media source"
    );

    Ok(SampledMedia {
        duration,
        frames,
        audio,
        frame_stride,
        audio_stride,
    })
}

/// Extract downscaled frames at `1/stride` fps into a temp dir and decode.
async fn extract_frames(path: &Path, stride: f64) -> EngineResult<Vec<SampledFrame>> {
    let dir = tempfile::tempdir()?;
    let pattern = dir.path().join("frame_%05d.png");

    let output = Command::new("ffmpeg")
        .args(["-y", "-v", "error", "-i"])
        .arg(path)
        .args([
            "-vf",
            &format!("fps=1/{},scale={}:-2", stride, ANALYSIS_WIDTH),
        ])
        .arg(&pattern)
        .output()
        .await?;

    if !output.status.success() {
        return Err(EngineError::ffmpeg(
            format!("frame sampling of {} failed", path.display()),
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
            output.status.code(),
        ));
    }

    let mut entries: Vec<_> = std::fs::read_dir(dir.path())?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "png"))
        .collect();
    entries.sort();

    let mut frames = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        let img = image::open(entry)?.to_rgb8();
        frames.push(SampledFrame {
            timestamp: index as f64 * stride,
            width: img.width(),
            height: img.height(),
            rgb: img.into_raw(),
        });
    }

    Ok(frames)
}

/// Decode mono PCM and fold it into RMS windows of `stride` seconds.
async fn extract_audio_windows(path: &Path, stride: f64) -> EngineResult<Vec<AudioWindow>> {
    let dir = tempfile::tempdir()?;
    let pcm_path = dir.path().join("audio.pcm");

    let output = Command::new("ffmpeg")
        .args(["-y", "-v", "error", "-i"])
        .arg(path)
        .args([
            "-vn",
            "-ac",
            "1",
            "-ar",
            &AUDIO_SAMPLE_RATE.to_string(),
            "-f",
            "s16le",
        ])
        .arg(&pcm_path)
        .output()
        .await?;

    if !output.status.success() {
        return Err(EngineError::ffmpeg(
            format!("audio sampling of {} failed", path.display()),
            Some(String::from_utf8_lossy(&output.stderr).to_string()),
            output.status.code(),
        ));
    }

    let bytes = tokio::fs::read(&pcm_path).await?;
    Ok(rms_windows(&bytes, stride))
}

/// Compute RMS amplitude windows from raw s16le mono PCM.
fn rms_windows(pcm: &[u8], stride: f64) -> Vec<AudioWindow> {
    let samples_per_window = ((AUDIO_SAMPLE_RATE as f64 * stride) as usize).max(1);
    let samples: Vec<i16> = pcm
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();

    samples
        .chunks(samples_per_window)
        .enumerate()
        .map(|(index, window)| {
            let sum_sq: f64 = window
                .iter()
                .map(|&s| {
                    let v = s as f64 / i16::MAX as f64;
                    v * v
                })
                .sum();
            AudioWindow {
                timestamp: index as f64 * stride,
                amplitude: (sum_sq / window.len() as f64).sqrt(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::solid_frame;

    #[test]
    fn test_luma_of_solid_frame() {
        let white = solid_frame(0.0, 255, 255, 255);
        assert!(white.luma().iter().all(|&l| l == 255));
        let black = solid_frame(0.0, 0, 0, 0);
        assert!(black.luma().iter().all(|&l| l == 0));
    }

    #[test]
    fn test_rms_windows_of_silence() {
        let pcm = vec![0u8; 32000]; // 1s of silence at 8kHz s16le
        let windows = rms_windows(&pcm, 0.5);
        assert_eq!(windows.len(), 4);
        assert!(windows.iter().all(|w| w.amplitude == 0.0));
        assert!((windows[1].timestamp - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rms_windows_of_full_scale() {
        let sample = i16::MAX.to_le_bytes();
        let pcm: Vec<u8> = std::iter::repeat(sample).take(16000).flatten().collect();
        let windows = rms_windows(&pcm, 1.0);
        assert_eq!(windows.len(), 2);
        assert!((windows[0].amplitude - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_frames_between() {
        let media = SampledMedia {
            duration: 5.0,
            frames: (0..5).map(|i| solid_frame(i as f64, 0, 0, 0)).collect(),
            audio: Vec::new(),
            frame_stride: 1.0,
            audio_stride: 0.5,
        };
        assert_eq!(media.frames_between(1.0, 3.0).count(), 2);
        assert_eq!(media.frame_at(2.4).unwrap().timestamp, 2.0);
    }
}
