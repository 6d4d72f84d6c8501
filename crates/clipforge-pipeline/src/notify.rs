//! Notification sink for job and step transitions.
//!
//! Fire-and-forget: the orchestrator calls these on every status change and
//! never waits on or inspects a result.

use clipforge_models::{JobStatus, StepId, StepStatus, VideoProcessingJob};
use tracing::info;

/// Receives job/step status transitions.
pub trait Notifier: Send + Sync {
    fn job_transition(&self, job: &VideoProcessingJob, status: JobStatus);
    fn step_transition(&self, job: &VideoProcessingJob, step: StepId, status: StepStatus);
}

/// Default sink: structured log lines.
#[derive(Debug, Default, Clone)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn job_transition(&self, job: &VideoProcessingJob, status: JobStatus) {
        info!(
            job_id = %job.id,
            video = %job.video.name,
            status = %status,
            "job transition"
        );
    }

    fn step_transition(&self, job: &VideoProcessingJob, step: StepId, status: StepStatus) {
        info!(
            job_id = %job.id,
            step = %step,
            status = %status,
            "step transition"
        );
    }
}

/// Sink that drops everything, for tests.
#[derive(Debug, Default, Clone)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn job_transition(&self, _job: &VideoProcessingJob, _status: JobStatus) {}
    fn step_transition(&self, _job: &VideoProcessingJob, _step: StepId, _status: StepStatus) {}
}
