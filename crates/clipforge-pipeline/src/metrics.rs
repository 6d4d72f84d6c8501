//! Prometheus metrics for the pipeline.

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // Job lifecycle
    pub const JOBS_SUBMITTED_TOTAL: &str = "clipforge_jobs_submitted_total";
    pub const JOBS_COMPLETED_TOTAL: &str = "clipforge_jobs_completed_total";
    pub const JOBS_FAILED_TOTAL: &str = "clipforge_jobs_failed_total";
    pub const JOBS_CANCELLED_TOTAL: &str = "clipforge_jobs_cancelled_total";

    // Detection
    pub const SCENES_DETECTED_TOTAL: &str = "clipforge_scenes_detected_total";
    pub const STEP_DURATION_SECONDS: &str = "clipforge_step_duration_seconds";

    // Composition
    pub const CLIPS_COMPLETED_TOTAL: &str = "clipforge_clips_completed_total";
    pub const CLIPS_FAILED_TOTAL: &str = "clipforge_clips_failed_total";

    // Fencing
    pub const STALE_RESULTS_DISCARDED_TOTAL: &str = "clipforge_stale_results_discarded_total";
}

pub fn record_job_submitted() {
    counter!(names::JOBS_SUBMITTED_TOTAL).increment(1);
}

pub fn record_job_completed() {
    counter!(names::JOBS_COMPLETED_TOTAL).increment(1);
}

pub fn record_job_failed() {
    counter!(names::JOBS_FAILED_TOTAL).increment(1);
}

pub fn record_job_cancelled() {
    counter!(names::JOBS_CANCELLED_TOTAL).increment(1);
}

pub fn record_scenes_detected(count: usize) {
    counter!(names::SCENES_DETECTED_TOTAL).increment(count as u64);
}

pub fn record_step_duration(step: &'static str, duration_secs: f64) {
    let labels = [("step", step)];
    histogram!(names::STEP_DURATION_SECONDS, &labels).record(duration_secs);
}

pub fn record_clip_completed(platform: &str) {
    let labels = [("platform", platform.to_string())];
    counter!(names::CLIPS_COMPLETED_TOTAL, &labels).increment(1);
}

pub fn record_clip_failed(platform: &str) {
    let labels = [("platform", platform.to_string())];
    counter!(names::CLIPS_FAILED_TOTAL, &labels).increment(1);
}

pub fn record_stale_result_discarded() {
    counter!(names::STALE_RESULTS_DISCARDED_TOTAL).increment(1);
}
