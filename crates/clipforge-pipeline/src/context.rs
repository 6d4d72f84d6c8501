//! Isolated asynchronous execution context.
//!
//! All media work (sampling, analysis, fusion, composition) runs here, off
//! the orchestrator's path. Communication is purely message passing: the
//! orchestrator sends [`ContextCommand`]s and reacts to [`WorkerMessage`]s
//! correlated by operation id. The context owns no job state; it only does
//! work and reports.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Semaphore};
use tracing::{error, info, warn};

use clipforge_engine::compose::{ClipComposer, ClipRenderer, ComposeOptions};
use clipforge_engine::{
    analyzers, fusion, materialize, probe_video, resolve_face_counter, sample_media,
    capture_thumbnail, VisionProvider,
};
use clipforge_models::{
    CompletePayload, DetectedScene, JobId, PlatformPreset, SceneDetectionConfig, StepId,
    VideoFile, VideoMetadata, WorkerMessage,
};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

/// Work orders the orchestrator sends into the context.
#[derive(Debug, Clone)]
pub enum ContextCommand {
    /// Extract source metadata.
    ProbeMetadata {
        op_id: String,
        job_id: JobId,
        path: PathBuf,
    },
    /// Run the full detection path: sample, analyze, fuse, materialize,
    /// thumbnail.
    DetectScenes {
        op_id: String,
        job_id: JobId,
        video: VideoFile,
        config: SceneDetectionConfig,
    },
    /// Compose one clip for one (scene, platform) pair.
    ComposeClip {
        op_id: String,
        job_id: JobId,
        source: PathBuf,
        source_meta: VideoMetadata,
        scene: DetectedScene,
        platform: PlatformPreset,
        preserve_audio: bool,
    },
}

impl ContextCommand {
    fn op_id(&self) -> &str {
        match self {
            ContextCommand::ProbeMetadata { op_id, .. }
            | ContextCommand::DetectScenes { op_id, .. }
            | ContextCommand::ComposeClip { op_id, .. } => op_id,
        }
    }
}

/// Seam between the orchestrator and whatever executes its commands. The
/// real implementation forwards into the spawned context; tests substitute
/// a recorder.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    async fn dispatch(&self, command: ContextCommand) -> PipelineResult<()>;
}

/// Dispatcher backed by the real execution context's command channel.
pub struct ContextDispatcher {
    commands: mpsc::Sender<ContextCommand>,
}

#[async_trait]
impl Dispatcher for ContextDispatcher {
    async fn dispatch(&self, command: ContextCommand) -> PipelineResult<()> {
        let op = command.op_id().to_string();
        self.commands.send(command).await.map_err(|_| {
            PipelineError::context_unavailable(format!("context gone, op {op} not dispatched"))
        })
    }
}

/// Spawn the execution context.
///
/// Returns the dispatcher plus the message stream. The first message is
/// always [`WorkerMessage::Ready`]; the orchestrator bounds its wait for it
/// with the configured handshake timeout.
pub fn spawn_context<R>(
    config: PipelineConfig,
    renderer: R,
    vision: Arc<dyn VisionProvider>,
) -> (ContextDispatcher, mpsc::Receiver<WorkerMessage>)
where
    R: ClipRenderer + 'static,
{
    let (command_tx, command_rx) = mpsc::channel::<ContextCommand>(64);
    let (message_tx, message_rx) = mpsc::channel::<WorkerMessage>(256);

    tokio::spawn(run_context(config, renderer, vision, command_rx, message_tx));

    (
        ContextDispatcher {
            commands: command_tx,
        },
        message_rx,
    )
}

async fn run_context<R>(
    config: PipelineConfig,
    renderer: R,
    vision: Arc<dyn VisionProvider>,
    mut commands: mpsc::Receiver<ContextCommand>,
    messages: mpsc::Sender<WorkerMessage>,
) where
    R: ClipRenderer + 'static,
{
    if messages.send(WorkerMessage::Ready).await.is_err() {
        return;
    }
    info!("execution context ready");

    let composer = Arc::new(if config.capture_thumbnails {
        ClipComposer::new(renderer)
    } else {
        ClipComposer::without_thumbnails(renderer)
    });
    // Bounds concurrent decode+encode work across all jobs.
    let compose_slots = Arc::new(Semaphore::new(config.batch_size));
    let config = Arc::new(config);

    while let Some(command) = commands.recv().await {
        let messages = messages.clone();
        match command {
            ContextCommand::ProbeMetadata {
                op_id,
                job_id,
                path,
            } => {
                tokio::spawn(async move {
                    let result = probe_video(&path).await;
                    send_result(&messages, op_id, job_id, None, result.map(|metadata| {
                        CompletePayload::Metadata { metadata }
                    }))
                    .await;
                });
            }
            ContextCommand::DetectScenes {
                op_id,
                job_id,
                video,
                config: detection,
            } => {
                let vision = Arc::clone(&vision);
                let config = Arc::clone(&config);
                tokio::spawn(async move {
                    let result =
                        run_detection(&config, &vision, &video, &detection, &op_id, &job_id, &messages)
                            .await;
                    send_result(&messages, op_id, job_id, Some(StepId::DetectScenes), result)
                        .await;
                });
            }
            ContextCommand::ComposeClip {
                op_id,
                job_id,
                source,
                source_meta,
                scene,
                platform,
                preserve_audio,
            } => {
                let composer = Arc::clone(&composer);
                let slots = Arc::clone(&compose_slots);
                let config = Arc::clone(&config);
                tokio::spawn(async move {
                    // Closed semaphore means shutdown; drop the work.
                    let Ok(_permit) = slots.acquire().await else {
                        return;
                    };
                    let options = ComposeOptions {
                        preserve_audio,
                        output_dir: config.work_dir.join(job_id.as_str()),
                    };
                    let progress_sink = messages.clone();
                    let (progress_op, progress_job) = (op_id.clone(), job_id.clone());
                    let result = composer
                        .compose(
                            &source,
                            &source_meta,
                            &scene,
                            &platform,
                            &options,
                            move |percentage, message| {
                                let _ = progress_sink.try_send(WorkerMessage::Progress {
                                    id: progress_op.clone(),
                                    job_id: progress_job.clone(),
                                    step_id: Some(StepId::GenerateClips),
                                    percentage,
                                    message,
                                });
                            },
                        )
                        .await;
                    send_result(
                        &messages,
                        op_id,
                        job_id,
                        Some(StepId::GenerateClips),
                        result.map(|clip| CompletePayload::Clip {
                            clip: Box::new(clip),
                        }),
                    )
                    .await;
                });
            }
        }
    }
    warn!("execution context command channel closed, shutting down");
}

/// Sample the source, run the analyzers, fuse, materialize, and capture per
/// scene thumbnails.
async fn run_detection(
    config: &PipelineConfig,
    vision: &Arc<dyn VisionProvider>,
    video: &VideoFile,
    detection: &SceneDetectionConfig,
    op_id: &str,
    job_id: &JobId,
    messages: &mpsc::Sender<WorkerMessage>,
) -> Result<CompletePayload, clipforge_engine::EngineError> {
    let progress = |percentage: f64, message: &str| {
        let _ = messages.try_send(WorkerMessage::Progress {
            id: op_id.to_string(),
            job_id: job_id.clone(),
            step_id: Some(StepId::DetectScenes),
            percentage,
            message: message.to_string(),
        });
    };

    progress(5.0, "sampling source media");
    let media = Arc::new(
        sample_media(
            &video.path,
            video.duration,
            config.frame_stride,
            config.audio_stride,
        )
        .await?,
    );

    progress(35.0, "running signal analyzers");
    let results = analyzers::run_analyzers(Arc::clone(&media), detection, vision.as_ref()).await;

    progress(70.0, "fusing boundary candidates");
    let refined = fusion::fuse_and_refine(&results, detection, video.duration);

    progress(80.0, "materializing scenes");
    let counter = resolve_face_counter(vision.as_ref());
    let mut scenes = materialize(&refined, &media, detection, counter.as_ref());

    if config.capture_thumbnails {
        progress(90.0, "capturing scene thumbnails");
        let thumb_dir = config.work_dir.join(job_id.as_str()).join("thumbs");
        tokio::fs::create_dir_all(&thumb_dir).await?;
        for scene in &mut scenes {
            let path = thumb_dir.join(format!("scene_{:02}.jpg", scene.id));
            match capture_thumbnail(&video.path, &path, scene.midpoint()).await {
                Ok(()) => scene.thumbnail = Some(path),
                // A failed thumbnail is cosmetic; the scene stands without it.
                Err(err) => warn!(scene = scene.id, error = %err, "thumbnail capture failed"),
            }
        }
    }

    info!(
        job_id = %job_id,
        scenes = scenes.len(),
        "scene detection finished"
    );
    Ok(CompletePayload::Scenes { scenes })
}

async fn send_result(
    messages: &mpsc::Sender<WorkerMessage>,
    op_id: String,
    job_id: JobId,
    step_id: Option<StepId>,
    result: Result<CompletePayload, clipforge_engine::EngineError>,
) {
    let message = match result {
        Ok(data) => WorkerMessage::Complete {
            id: op_id,
            job_id,
            step_id,
            data,
        },
        Err(err) => {
            error!(op = %op_id, error = %err, "operation failed");
            WorkerMessage::Error {
                id: op_id,
                job_id,
                step_id,
                error: err.to_string(),
            }
        }
    };
    let _ = messages.send(message).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipforge_engine::NullRenderer;
    use clipforge_engine::vision::NoVision;
    use clipforge_models::find_preset;
    use std::collections::BTreeMap;

    fn test_config() -> PipelineConfig {
        PipelineConfig {
            work_dir: std::env::temp_dir().join("clipforge-test"),
            capture_thumbnails: false,
            ..PipelineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_context_sends_ready_first() {
        let (_dispatcher, mut messages) =
            spawn_context(test_config(), NullRenderer, Arc::new(NoVision));
        let first = messages.recv().await.unwrap();
        assert!(matches!(first, WorkerMessage::Ready));
    }

    #[tokio::test]
    async fn test_compose_command_yields_clip_complete() {
        let (dispatcher, mut messages) =
            spawn_context(test_config(), NullRenderer, Arc::new(NoVision));
        assert!(matches!(messages.recv().await.unwrap(), WorkerMessage::Ready));

        let job_id = JobId::new();
        let scene = DetectedScene {
            id: 1,
            start_time: 10.0,
            end_time: 25.0,
            duration: 15.0,
            confidence: 0.7,
            detection_methods: BTreeMap::new(),
            context_score: 1.0,
            narrative_importance: 0.5,
            viral_potential: 0.8,
            speakers: Vec::new(),
            dominant_colors: Vec::new(),
            motion_level: Default::default(),
            audio_features: Default::default(),
            thumbnail: None,
        };
        dispatcher
            .dispatch(ContextCommand::ComposeClip {
                op_id: "op-1".into(),
                job_id: job_id.clone(),
                source: PathBuf::from("/tmp/source.mp4"),
                source_meta: VideoMetadata {
                    duration: 120.0,
                    width: 1920,
                    height: 1080,
                    fps: 30.0,
                    bitrate: 8_000_000,
                    format: "mp4".into(),
                    size: 1_000_000,
                },
                scene,
                platform: find_preset("tiktok").unwrap(),
                preserve_audio: true,
            })
            .await
            .unwrap();

        // Progress messages stream first, then the completion.
        loop {
            match messages.recv().await.unwrap() {
                WorkerMessage::Progress { id, .. } => assert_eq!(id, "op-1"),
                WorkerMessage::Complete { id, step_id, data, .. } => {
                    assert_eq!(id, "op-1");
                    assert_eq!(step_id, Some(StepId::GenerateClips));
                    assert!(matches!(data, CompletePayload::Clip { .. }));
                    break;
                }
                other => panic!("unexpected message: {other:?}"),
            }
        }
    }
}
