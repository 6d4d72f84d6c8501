//! Job orchestrator.
//!
//! Single-writer state machine over in-memory job/step/clip maps. The
//! orchestrator never blocks on media work: it dispatches commands into the
//! execution context and mutates state only when a [`WorkerMessage`] arrives.
//! Every inbound result is fenced against the job's current status so late
//! results for cancelled jobs are discarded, not applied.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};
use validator::Validate;

use clipforge_models::{
    find_preset, ClipStatus, CompletePayload, GeneratedClip, JobId, JobStatus, ProcessingStep,
    SceneDetectionConfig, StepId, StepStatus, VideoFile, VideoMetadata, VideoProcessingJob,
    WorkerMessage,
};

use crate::config::PipelineConfig;
use crate::context::{ContextCommand, Dispatcher};
use crate::error::{PipelineError, PipelineResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::notify::Notifier;

/// What an in-flight operation id refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Operation {
    Probe,
    Detect,
    Clip { scene_id: u32, platform: String },
}

/// Owns the job map and reacts to execution context messages.
pub struct Orchestrator {
    config: PipelineConfig,
    dispatcher: Arc<dyn Dispatcher>,
    notifier: Arc<dyn Notifier>,
    jobs: HashMap<JobId, VideoProcessingJob>,
    /// Pending operations keyed by operation id.
    ops: HashMap<String, Operation>,
}

impl Orchestrator {
    pub fn new(
        config: PipelineConfig,
        dispatcher: Arc<dyn Dispatcher>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            dispatcher,
            notifier,
            jobs: HashMap::new(),
            ops: HashMap::new(),
        }
    }

    /// Bounded wait for the execution context's ready handshake.
    pub async fn await_ready(
        messages: &mut mpsc::Receiver<WorkerMessage>,
        timeout: Duration,
    ) -> PipelineResult<()> {
        match tokio::time::timeout(timeout, messages.recv()).await {
            Ok(Some(WorkerMessage::Ready)) => Ok(()),
            Ok(Some(other)) => Err(PipelineError::context_unavailable(format!(
                "expected ready handshake, got {other:?}"
            ))),
            Ok(None) => Err(PipelineError::context_unavailable("context channel closed")),
            Err(_) => Err(PipelineError::context_unavailable(
                "no ready signal within handshake timeout",
            )),
        }
    }

    /// Validate and submit a job. Rejections happen synchronously, before
    /// any async dispatch.
    pub async fn submit(
        &mut self,
        video: VideoFile,
        detection: SceneDetectionConfig,
        platforms: Vec<String>,
    ) -> PipelineResult<JobId> {
        if !video.is_supported_format() {
            return Err(PipelineError::validation(format!(
                "unsupported container: {}",
                video.format
            )));
        }
        if video.duration <= 0.0 {
            return Err(PipelineError::validation("source duration must be positive"));
        }
        if platforms.is_empty() {
            return Err(PipelineError::validation("no platforms selected"));
        }
        for id in &platforms {
            if find_preset(id).is_none() {
                return Err(PipelineError::UnknownPlatform(id.clone()));
            }
        }
        detection
            .validate()
            .map_err(|e| PipelineError::validation(format!("invalid detection config: {e}")))?;

        let mut job = VideoProcessingJob::new(video, detection, platforms);
        job.status = JobStatus::Processing;
        job.step_mut(StepId::DetectScenes).start();
        let job_id = job.id.clone();

        let logger = JobLogger::new(&job_id, "video_processing");
        logger.log_start(&format!("submitted {}", job.video.name));
        self.notifier.job_transition(&job, JobStatus::Processing);
        self.notifier
            .step_transition(&job, StepId::DetectScenes, StepStatus::Active);
        metrics::record_job_submitted();

        let probe_op = format!("probe-{job_id}");
        let detect_op = format!("detect-{job_id}");
        self.ops.insert(probe_op.clone(), Operation::Probe);
        self.ops.insert(detect_op.clone(), Operation::Detect);

        let probe = ContextCommand::ProbeMetadata {
            op_id: probe_op,
            job_id: job_id.clone(),
            path: job.video.path.clone(),
        };
        let detect = ContextCommand::DetectScenes {
            op_id: detect_op,
            job_id: job_id.clone(),
            video: job.video.clone(),
            config: job.config.clone(),
        };
        self.jobs.insert(job_id.clone(), job);

        self.dispatch_or_fail(&job_id, StepId::DetectScenes, probe)
            .await?;
        self.dispatch_or_fail(&job_id, StepId::DetectScenes, detect)
            .await?;
        Ok(job_id)
    }

    /// Apply one inbound message to job state.
    ///
    /// Safe to call with messages in any order; the all-clips-terminal check
    /// is re-evaluated on every clip result, and messages for jobs that are
    /// already terminal are discarded.
    pub async fn handle_message(&mut self, message: WorkerMessage) -> PipelineResult<()> {
        let Some(job_id) = message.job_id().cloned() else {
            return Ok(());
        };
        let Some(job) = self.jobs.get(&job_id) else {
            warn!(job_id = %job_id, "message for unknown job discarded");
            return Ok(());
        };
        // Cancellation fence: cooperative, so in-flight results for a
        // terminal job still arrive and must be dropped here. The operation
        // is finished either way; its tracking entry goes regardless.
        if job.status.is_terminal() {
            if let WorkerMessage::Complete { id, .. } | WorkerMessage::Error { id, .. } = &message
            {
                self.ops.remove(id);
            }
            metrics::record_stale_result_discarded();
            return Ok(());
        }

        match message {
            WorkerMessage::Ready => Ok(()),
            WorkerMessage::Progress {
                step_id: Some(step_id),
                percentage,
                message,
                ..
            } => {
                if step_id == StepId::DetectScenes {
                    let job = self.job_mut(&job_id)?;
                    let step = job.step_mut(step_id);
                    if step.status == StepStatus::Active {
                        step.progress = percentage;
                        JobLogger::new(&job_id, "video_processing").log_progress(&message);
                    }
                }
                Ok(())
            }
            WorkerMessage::Progress { .. } => Ok(()),
            WorkerMessage::Complete { id, data, .. } => {
                let op = self.ops.remove(&id);
                match (op, data) {
                    (Some(Operation::Probe), CompletePayload::Metadata { metadata }) => {
                        self.job_mut(&job_id)?.metadata = Some(metadata);
                        Ok(())
                    }
                    (Some(Operation::Detect), CompletePayload::Scenes { scenes }) => {
                        self.complete_detection(&job_id, scenes).await
                    }
                    (Some(Operation::Clip { scene_id, platform }), CompletePayload::Clip { clip }) => {
                        self.apply_clip_result(&job_id, scene_id, &platform, Ok(*clip))
                    }
                    (op, data) => {
                        warn!(op = ?op, data = ?data, "mismatched completion discarded");
                        Ok(())
                    }
                }
            }
            WorkerMessage::Error { id, error, .. } => {
                match self.ops.remove(&id) {
                    Some(Operation::Probe) => {
                        // Metadata is enrichment; detection carries on.
                        JobLogger::new(&job_id, "video_processing")
                            .log_warning(&format!("metadata probe failed: {error}"));
                        Ok(())
                    }
                    Some(Operation::Clip { scene_id, platform }) => {
                        self.apply_clip_result(&job_id, scene_id, &platform, Err(error))
                    }
                    Some(Operation::Detect) => self.fail_step(&job_id, StepId::DetectScenes, error),
                    None => {
                        warn!(op = %id, "error for unknown operation discarded");
                        Ok(())
                    }
                }
            }
        }
    }

    /// Cancel a job. Cooperative: in-flight work still completes in the
    /// context, and its results are fenced on arrival.
    pub fn cancel(&mut self, job_id: &JobId) -> PipelineResult<()> {
        let job = self.job_mut(job_id)?;
        if job.status.is_terminal() {
            return Ok(());
        }
        job.status = JobStatus::Cancelled;
        job.updated_at = chrono::Utc::now();
        self.purge_ops(job_id);
        let job = &self.jobs[job_id];
        self.notifier.job_transition(job, JobStatus::Cancelled);
        metrics::record_job_cancelled();
        JobLogger::new(job_id, "video_processing").log_completion("cancelled");
        Ok(())
    }

    /// Retry a failed job: failed steps reset to pending, completed steps
    /// untouched, execution resumes from the first pending step. A no-op for
    /// jobs with nothing failed.
    pub async fn retry(&mut self, job_id: &JobId) -> PipelineResult<()> {
        let job = self.job_mut(job_id)?;
        if !job.can_retry() {
            return Err(PipelineError::NotRetryable(job_id.to_string()));
        }
        let had_failures = job.steps.iter().any(|s| s.status == StepStatus::Failed);
        if !had_failures {
            return Ok(());
        }

        for step in &mut job.steps {
            if step.status == StepStatus::Failed {
                step.reset();
            }
        }
        job.status = JobStatus::Processing;
        job.error = None;
        job.updated_at = chrono::Utc::now();

        match job.first_pending_step() {
            Some(StepId::DetectScenes) => {
                job.scenes.clear();
                job.clips.clear();
                job.step_mut(StepId::DetectScenes).start();
                let detect = ContextCommand::DetectScenes {
                    op_id: format!("detect-{job_id}"),
                    job_id: job_id.clone(),
                    video: job.video.clone(),
                    config: job.config.clone(),
                };
                self.ops
                    .insert(format!("detect-{job_id}"), Operation::Detect);
                self.notifier
                    .job_transition(&self.jobs[job_id], JobStatus::Processing);
                self.dispatch_or_fail(job_id, StepId::DetectScenes, detect)
                    .await
            }
            Some(StepId::GenerateClips) => {
                job.step_mut(StepId::GenerateClips).start();
                self.notifier
                    .job_transition(&self.jobs[job_id], JobStatus::Processing);
                self.dispatch_pending_clips(job_id).await
            }
            None => {
                // Every step already completed; nothing to resume.
                self.finish_job_if_done(job_id);
                Ok(())
            }
        }
    }

    pub fn job(&self, job_id: &JobId) -> Option<&VideoProcessingJob> {
        self.jobs.get(job_id)
    }

    pub fn jobs(&self) -> impl Iterator<Item = &VideoProcessingJob> {
        self.jobs.values()
    }

    /// Drop jobs that reached a terminal status, along with any operation
    /// tracking they left behind. Explicit, caller-driven cleanup; nothing
    /// expires on its own.
    pub fn clear_terminal(&mut self) {
        let dropped: Vec<JobId> = self
            .jobs
            .values()
            .filter(|job| job.status.is_terminal())
            .map(|job| job.id.clone())
            .collect();
        for job_id in &dropped {
            self.purge_ops(job_id);
        }
        self.jobs.retain(|_, job| !job.status.is_terminal());
    }

    fn job_mut(&mut self, job_id: &JobId) -> PipelineResult<&mut VideoProcessingJob> {
        self.jobs
            .get_mut(job_id)
            .ok_or_else(|| PipelineError::UnknownJob(job_id.to_string()))
    }

    /// Drop every pending operation belonging to one job. Operation ids
    /// embed the job id, so a substring match is exact for uuid ids.
    fn purge_ops(&mut self, job_id: &JobId) {
        self.ops.retain(|op_id, _| !op_id.contains(job_id.as_str()));
    }

    /// Hand one command to the execution context. A dispatch failure means
    /// the context is gone: the active step fails immediately and the job
    /// with it, recoverable only through an explicit retry.
    async fn dispatch_or_fail(
        &mut self,
        job_id: &JobId,
        step_id: StepId,
        command: ContextCommand,
    ) -> PipelineResult<()> {
        let dispatcher = Arc::clone(&self.dispatcher);
        if let Err(err) = dispatcher.dispatch(command).await {
            self.purge_ops(job_id);
            self.fail_step(job_id, step_id, err.to_string())?;
            return Err(err);
        }
        Ok(())
    }

    /// Detection finished: store scenes, close the step, fan out one
    /// composition task per (scene, platform) pair.
    async fn complete_detection(
        &mut self,
        job_id: &JobId,
        scenes: Vec<clipforge_models::DetectedScene>,
    ) -> PipelineResult<()> {
        metrics::record_scenes_detected(scenes.len());
        let job = self.job_mut(job_id)?;
        job.scenes = scenes;
        job.step_mut(StepId::DetectScenes).complete();
        record_step_duration(job.step(StepId::DetectScenes));
        job.updated_at = chrono::Utc::now();
        self.notifier.step_transition(
            &self.jobs[job_id],
            StepId::DetectScenes,
            StepStatus::Completed,
        );

        let job = self.job_mut(job_id)?;
        job.step_mut(StepId::GenerateClips).start();

        if job.scenes.is_empty() {
            // Nothing to compose; the job completes with zero clips.
            job.step_mut(StepId::GenerateClips).complete();
            record_step_duration(job.step(StepId::GenerateClips));
            self.notifier.step_transition(
                &self.jobs[job_id],
                StepId::GenerateClips,
                StepStatus::Completed,
            );
            self.finish_job_if_done(job_id);
            return Ok(());
        }

        // One pending clip stub per (scene, platform) pair, N x M total.
        let mut stubs = Vec::new();
        for scene in &job.scenes {
            for platform_id in &job.platforms {
                let Some(preset) = find_preset(platform_id) else {
                    continue;
                };
                let mut stub =
                    GeneratedClip::pending(scene.id, platform_id.clone(), preset.aspect_ratio);
                stub.status = ClipStatus::Processing;
                stubs.push(stub);
            }
        }
        job.clips = stubs;
        self.notifier
            .step_transition(&self.jobs[job_id], StepId::GenerateClips, StepStatus::Active);

        self.dispatch_pending_clips(job_id).await
    }

    /// Dispatch composition for every clip stub that is not yet terminal.
    async fn dispatch_pending_clips(&mut self, job_id: &JobId) -> PipelineResult<()> {
        let preserve_audio = self.config.preserve_audio;
        let job = self.job_mut(job_id)?;
        let source = job.video.path.clone();
        let source_meta = job
            .metadata
            .clone()
            .unwrap_or_else(|| fallback_metadata(&job.video));

        let mut commands = Vec::new();
        for clip in &mut job.clips {
            if clip.is_terminal() {
                continue;
            }
            clip.status = ClipStatus::Processing;
            let Some(scene) = job.scenes.iter().find(|s| s.id == clip.scene_id) else {
                continue;
            };
            let Some(preset) = find_preset(&clip.platform) else {
                continue;
            };
            let op_id = format!("clip-{job_id}-{}-{}", clip.scene_id, clip.platform);
            commands.push((
                op_id.clone(),
                Operation::Clip {
                    scene_id: clip.scene_id,
                    platform: clip.platform.clone(),
                },
                ContextCommand::ComposeClip {
                    op_id,
                    job_id: job_id.clone(),
                    source: source.clone(),
                    source_meta: source_meta.clone(),
                    scene: scene.clone(),
                    platform: preset,
                    preserve_audio,
                },
            ));
        }

        for (op_id, op, command) in commands {
            self.ops.insert(op_id, op);
            self.dispatch_or_fail(job_id, StepId::GenerateClips, command)
                .await?;
        }
        Ok(())
    }

    /// Apply one clip's terminal result; failures stay isolated to that
    /// clip. Re-evaluates step completion on every call.
    fn apply_clip_result(
        &mut self,
        job_id: &JobId,
        scene_id: u32,
        platform: &str,
        result: Result<GeneratedClip, String>,
    ) -> PipelineResult<()> {
        let job = self.job_mut(job_id)?;
        let Some(slot) = job
            .clips
            .iter_mut()
            .find(|c| c.scene_id == scene_id && c.platform == platform)
        else {
            warn!(job_id = %job_id, scene_id, platform, "result for unknown clip discarded");
            return Ok(());
        };
        // Terminal clips are never mutated again.
        if slot.is_terminal() {
            metrics::record_stale_result_discarded();
            return Ok(());
        }

        match result {
            Ok(clip) => {
                *slot = clip;
                metrics::record_clip_completed(platform);
            }
            Err(error) => {
                slot.status = ClipStatus::Failed;
                slot.error = Some(error);
                metrics::record_clip_failed(platform);
            }
        }

        let terminal = job.terminal_clip_count();
        let total = job.clips.len();
        let step = job.step_mut(StepId::GenerateClips);
        step.progress = terminal as f64 / total as f64 * 100.0;

        if job.all_clips_terminal() {
            job.step_mut(StepId::GenerateClips).complete();
            record_step_duration(job.step(StepId::GenerateClips));
            job.updated_at = chrono::Utc::now();
            self.notifier.step_transition(
                &self.jobs[job_id],
                StepId::GenerateClips,
                StepStatus::Completed,
            );
            self.finish_job_if_done(job_id);
        }
        Ok(())
    }

    /// A step itself failed: the job fails with it. Recoverable only via
    /// explicit retry.
    fn fail_step(&mut self, job_id: &JobId, step_id: StepId, error: String) -> PipelineResult<()> {
        let job = self.job_mut(job_id)?;
        job.step_mut(step_id).fail(error.clone());
        job.fail(format!("{} failed: {error}", step_id.display_name()));
        self.notifier
            .step_transition(&self.jobs[job_id], step_id, StepStatus::Failed);
        self.notifier.job_transition(&self.jobs[job_id], JobStatus::Failed);
        metrics::record_job_failed();
        JobLogger::new(job_id, "video_processing").log_error(&error);
        Ok(())
    }

    /// Completion law: the job completes iff every step completed.
    fn finish_job_if_done(&mut self, job_id: &JobId) {
        let Some(job) = self.jobs.get_mut(job_id) else {
            return;
        };
        if job.status == JobStatus::Processing && job.all_steps_completed() {
            job.status = JobStatus::Completed;
            job.updated_at = chrono::Utc::now();
            info!(job_id = %job_id, clips = job.clips.len(), "job completed");
            self.notifier.job_transition(&self.jobs[job_id], JobStatus::Completed);
            metrics::record_job_completed();
        }
    }
}

/// Record how long a finished step ran, from its own timestamps.
fn record_step_duration(step: &ProcessingStep) {
    if let (Some(start), Some(end)) = (step.started_at, step.ended_at) {
        let secs = (end - start).num_milliseconds() as f64 / 1000.0;
        metrics::record_step_duration(step.id.as_str(), secs);
    }
}

/// Conservative stand-in when the probe has not landed yet.
fn fallback_metadata(video: &VideoFile) -> VideoMetadata {
    VideoMetadata {
        duration: video.duration,
        width: 1920,
        height: 1080,
        fps: 30.0,
        bitrate: 0,
        format: video.format.clone(),
        size: video.size,
    }
}
