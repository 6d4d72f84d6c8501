//! Scene detection and clip composition engine.
//!
//! The analysis path: [`sample::sample_media`] extracts a strided snapshot
//! of frames and audio once per source, the [`analyzers`] emit weighted
//! boundary candidates from it, [`fusion`] merges and refines those into cut
//! points, and [`materialize`] turns the cuts into scored
//! [`DetectedScene`](clipforge_models::DetectedScene) records.
//!
//! The synthesis path: [`compose::ClipComposer`] derives engagement factors,
//! a crop plan, and trim/encode parameters per (scene, platform) pair and
//! renders the clip through a [`compose::ClipRenderer`].

pub mod analyzers;
pub mod command;
pub mod compose;
pub mod error;
pub mod fusion;
pub mod materialize;
pub mod probe;
pub mod sample;
pub mod thumbnail;
pub mod vision;

#[cfg(test)]
pub(crate) mod testutil;

pub use command::{run_ffmpeg, FfmpegCommand};
pub use compose::{ClipComposer, ClipRenderer, ComposeOptions, FfmpegRenderer, NullRenderer};
pub use error::{EngineError, EngineResult};
pub use fusion::{fuse, fuse_and_refine, refine, FusedBoundary};
pub use materialize::materialize;
pub use probe::probe_video;
pub use sample::{sample_media, SampledFrame, SampledMedia};
pub use thumbnail::capture_thumbnail;
pub use vision::{resolve_face_counter, FaceCounter, NoVision, VisionProvider};
