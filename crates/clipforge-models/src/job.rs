//! Processing jobs and their step state machines.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::clip::GeneratedClip;
use crate::config::SceneDetectionConfig;
use crate::scene::DetectedScene;
use crate::video::{VideoFile, VideoMetadata};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two fixed steps every job executes, strictly in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum StepId {
    DetectScenes,
    GenerateClips,
}

impl StepId {
    /// Step order within a job.
    pub const ALL: [StepId; 2] = [StepId::DetectScenes, StepId::GenerateClips];

    pub fn as_str(&self) -> &'static str {
        match self {
            StepId::DetectScenes => "detect-scenes",
            StepId::GenerateClips => "generate-clips",
        }
    }

    /// Display name for notifications/UI.
    pub fn display_name(&self) -> &'static str {
        match self {
            StepId::DetectScenes => "Detecting scenes",
            StepId::GenerateClips => "Generating clips",
        }
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Status of a single job step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Active,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::Active => "active",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sub-state-machine for one job step.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingStep {
    /// Which step this is
    pub id: StepId,
    /// Display name
    pub name: String,
    /// Progress percentage (0-100)
    pub progress: f64,
    /// Current status
    pub status: StepStatus,
    /// When the step went active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// When the step reached a terminal status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
    /// Failure detail when status is failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProcessingStep {
    /// Create a pending step.
    pub fn new(id: StepId) -> Self {
        Self {
            id,
            name: id.display_name().to_string(),
            progress: 0.0,
            status: StepStatus::Pending,
            started_at: None,
            ended_at: None,
            error: None,
        }
    }

    /// Transition to active and stamp the start time.
    pub fn start(&mut self) {
        self.status = StepStatus::Active;
        self.started_at = Some(Utc::now());
    }

    /// Transition to completed with full progress.
    pub fn complete(&mut self) {
        self.status = StepStatus::Completed;
        self.progress = 100.0;
        self.ended_at = Some(Utc::now());
    }

    /// Transition to failed with an error message.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = StepStatus::Failed;
        self.error = Some(error.into());
        self.ended_at = Some(Utc::now());
    }

    /// Reset a failed step back to pending for retry.
    ///
    /// Progress, error, and timing are cleared; completed steps are never
    /// reset so retry resumes without redoing finished work.
    pub fn reset(&mut self) {
        self.status = StepStatus::Pending;
        self.progress = 0.0;
        self.started_at = None;
        self.ended_at = None;
        self.error = None;
    }
}

/// Job lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Created, not yet started
    #[default]
    Queued,
    /// Steps are executing
    Processing,
    /// Every step completed
    Completed,
    /// A step failed; recoverable via retry
    Failed,
    /// Cancelled by the caller; late results are discarded
    Cancelled,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal states: no further transitions without an explicit retry.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The unit of work tracking one source video through detection and clip
/// generation.
///
/// Owns every scene and clip it produces; cleared explicitly by the caller.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VideoProcessingJob {
    /// Unique job id
    pub id: JobId,
    /// Source video descriptor
    pub video: VideoFile,
    /// Probed source metadata, attached once extraction completes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<VideoMetadata>,
    /// Detection configuration for this run
    pub config: SceneDetectionConfig,
    /// Selected platform preset ids
    pub platforms: Vec<String>,
    /// Lifecycle status
    pub status: JobStatus,
    /// The two fixed steps, in execution order
    pub steps: Vec<ProcessingStep>,
    /// Scenes produced by detect-scenes
    pub scenes: Vec<DetectedScene>,
    /// One clip per (scene, platform) pair
    pub clips: Vec<GeneratedClip>,
    /// Failure detail when status is failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp
    pub updated_at: DateTime<Utc>,
}

impl VideoProcessingJob {
    /// Create a queued job with both steps pending.
    pub fn new(video: VideoFile, config: SceneDetectionConfig, platforms: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            video,
            metadata: None,
            config,
            platforms,
            status: JobStatus::Queued,
            steps: StepId::ALL.iter().map(|id| ProcessingStep::new(*id)).collect(),
            scenes: Vec::new(),
            clips: Vec::new(),
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Borrow a step by id.
    pub fn step(&self, id: StepId) -> &ProcessingStep {
        self.steps
            .iter()
            .find(|s| s.id == id)
            .unwrap_or_else(|| unreachable!("job always carries both fixed steps"))
    }

    /// Mutably borrow a step by id; bumps `updated_at`.
    pub fn step_mut(&mut self, id: StepId) -> &mut ProcessingStep {
        self.updated_at = Utc::now();
        self.steps
            .iter_mut()
            .find(|s| s.id == id)
            .unwrap_or_else(|| unreachable!("job always carries both fixed steps"))
    }

    /// The first step that is not yet completed, in execution order.
    pub fn first_pending_step(&self) -> Option<StepId> {
        self.steps
            .iter()
            .find(|s| s.status == StepStatus::Pending)
            .map(|s| s.id)
    }

    /// True iff every step has completed.
    pub fn all_steps_completed(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Completed)
    }

    /// True when every clip task has reached a terminal status.
    ///
    /// Holds vacuously for zero clips, so a scene-less job still completes.
    pub fn all_clips_terminal(&self) -> bool {
        self.clips.iter().all(|c| c.is_terminal())
    }

    /// Count of clips in a terminal status.
    pub fn terminal_clip_count(&self) -> usize {
        self.clips.iter().filter(|c| c.is_terminal()).count()
    }

    /// Aggregate progress: (completed steps + active step fraction) / total.
    pub fn progress(&self) -> f64 {
        let total = self.steps.len() as f64;
        if total == 0.0 {
            return 0.0;
        }
        let completed = self
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Completed)
            .count() as f64;
        let active: f64 = self
            .steps
            .iter()
            .filter(|s| s.status == StepStatus::Active)
            .map(|s| s.progress / 100.0)
            .sum();
        (completed + active) / total * 100.0
    }

    /// Mark the job failed, recording the error.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = JobStatus::Failed;
        self.error = Some(error.into());
        self.updated_at = Utc::now();
    }

    /// Whether retry is applicable (only failed jobs can be retried).
    pub fn can_retry(&self) -> bool {
        self.status == JobStatus::Failed
    }
}
