//! End-to-end pipeline tests against the real execution context.
//!
//! These run without ffmpeg installed: they exercise the handshake, message
//! routing, and failure paths that do not need a decodable source.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clipforge_engine::{NoVision, NullRenderer};
use clipforge_models::{
    JobStatus, SceneDetectionConfig, StepId, StepStatus, VideoFile, VideoId,
};
use clipforge_pipeline::{spawn_context, Orchestrator, PipelineConfig, TracingNotifier};

fn test_config() -> PipelineConfig {
    PipelineConfig {
        work_dir: std::env::temp_dir().join("clipforge-it"),
        capture_thumbnails: false,
        handshake_timeout: Duration::from_secs(5),
        ..PipelineConfig::default()
    }
}

fn missing_video() -> VideoFile {
    VideoFile {
        id: VideoId::new(),
        name: "missing.mp4".into(),
        size: 1_000_000,
        duration: 60.0,
        path: PathBuf::from("/nonexistent/clipforge/missing.mp4"),
        format: "mp4".into(),
    }
}

#[tokio::test]
async fn test_handshake_completes_within_timeout() {
    let config = test_config();
    let timeout = config.handshake_timeout;
    let (_dispatcher, mut messages) = spawn_context(config, NullRenderer, Arc::new(NoVision));
    Orchestrator::await_ready(&mut messages, timeout)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_unreadable_source_fails_detection_step() {
    let config = test_config();
    let timeout = config.handshake_timeout;
    let (dispatcher, mut messages) =
        spawn_context(config.clone(), NullRenderer, Arc::new(NoVision));
    Orchestrator::await_ready(&mut messages, timeout)
        .await
        .unwrap();

    let mut orchestrator =
        Orchestrator::new(config, Arc::new(dispatcher), Arc::new(TracingNotifier));
    let job_id = orchestrator
        .submit(
            missing_video(),
            SceneDetectionConfig::default(),
            vec!["tiktok".into()],
        )
        .await
        .unwrap();

    // Drive until the job reaches a terminal status; the detect operation
    // must come back as an error for the missing file.
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let message = tokio::time::timeout_at(deadline, messages.recv())
            .await
            .expect("context went silent")
            .expect("context channel closed");
        orchestrator.handle_message(message).await.unwrap();
        let job = orchestrator.job(&job_id).unwrap();
        if job.status.is_terminal() {
            break;
        }
    }

    let job = orchestrator.job(&job_id).unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.step(StepId::DetectScenes).status, StepStatus::Failed);
    assert!(job.error.is_some());
    assert!(job.clips.is_empty());
}

#[tokio::test]
async fn test_validation_rejected_before_dispatch() {
    let config = test_config();
    let timeout = config.handshake_timeout;
    let (dispatcher, mut messages) =
        spawn_context(config.clone(), NullRenderer, Arc::new(NoVision));
    Orchestrator::await_ready(&mut messages, timeout)
        .await
        .unwrap();

    let mut orchestrator =
        Orchestrator::new(config, Arc::new(dispatcher), Arc::new(TracingNotifier));

    let mut bad = missing_video();
    bad.format = "flv".into();
    let err = orchestrator
        .submit(bad, SceneDetectionConfig::default(), vec!["tiktok".into()])
        .await
        .unwrap_err();
    assert!(err.is_validation());

    // Nothing was dispatched, so no messages beyond the handshake arrive.
    let quiet = tokio::time::timeout(Duration::from_millis(200), messages.recv()).await;
    assert!(quiet.is_err());
}
