//! Still-frame thumbnail capture.

use std::path::Path;

use tracing::debug;

use clipforge_models::THUMBNAIL_SCALE_WIDTH;

use crate::command::{run_ffmpeg, FfmpegCommand};
use crate::error::EngineResult;

/// Capture a single frame at `timestamp` into `output` (JPEG/PNG picked by
/// the output extension), scaled down to the standard thumbnail width.
pub async fn capture_thumbnail(
    source: impl AsRef<Path>,
    output: impl AsRef<Path>,
    timestamp: f64,
) -> EngineResult<()> {
    let command = FfmpegCommand::new(source.as_ref(), output.as_ref())
        .seek(timestamp.max(0.0))
        .single_frame()
        .video_filter(format!("scale={THUMBNAIL_SCALE_WIDTH}:-2"))
        .no_audio();

    debug!(
        timestamp,
        output = %output.as_ref().display(),
        "capturing thumbnail"
    );
    run_ffmpeg(&command).await
}
