//! Shared data models for the ClipForge pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Source videos and probed metadata
//! - Scene detection configuration and boundary candidates
//! - Detected scenes and generated clips
//! - Platform presets and encoding lookup tables
//! - Jobs, steps, and the worker message protocol

pub mod boundary;
pub mod clip;
pub mod config;
pub mod encoding;
pub mod job;
pub mod platform;
pub mod scene;
pub mod utils;
pub mod video;
pub mod ws;

// Re-export common types
pub use boundary::{DetectionMethod, SceneBoundary};
pub use clip::{ClipStatus, CropPlan, EngagementFactors, FocusPoint, GeneratedClip, PanDirection};
pub use config::{AlgorithmSettings, FaceDetectionSettings, SceneDetectionConfig, Sensitivity};
pub use encoding::{
    encode_target, EncodeTarget, DEFAULT_AUDIO_BITRATE, DEFAULT_AUDIO_CODEC, DEFAULT_PRESET,
    DEFAULT_VIDEO_CODEC, THUMBNAIL_SCALE_WIDTH,
};
pub use job::{JobId, JobStatus, ProcessingStep, StepId, StepStatus, VideoProcessingJob};
pub use platform::{
    builtin_presets, find_preset, AspectRatio, ContentGuidelines, CropStrategyKind, Pacing,
    PlatformOptimizations, PlatformPreset,
};
pub use scene::{AudioFeatures, DetectedScene, MotionLevel};
pub use utils::{clip_filename, format_seconds, sanitize_filename};
pub use video::{VideoFile, VideoId, VideoMetadata};
pub use ws::{CompletePayload, WorkerMessage};
