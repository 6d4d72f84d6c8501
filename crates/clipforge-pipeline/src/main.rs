//! Pipeline binary: processes one source video into platform clips.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use clipforge_engine::{probe_video, FfmpegRenderer, NoVision};
use clipforge_models::{SceneDetectionConfig, VideoFile, VideoId};
use clipforge_pipeline::{
    metrics, spawn_context, Orchestrator, PipelineConfig, TracingNotifier,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env()
        .add_directive("clipforge=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting clipforge-pipeline");

    let _metrics = metrics::init_metrics();
    let config = PipelineConfig::from_env();
    info!("Pipeline config: {:?}", config);

    let mut args = std::env::args().skip(1);
    let Some(source) = args.next().map(PathBuf::from) else {
        error!("usage: clipforge-pipeline <source-video> [platform ...]");
        std::process::exit(2);
    };
    let platforms: Vec<String> = {
        let selected: Vec<String> = args.collect();
        if selected.is_empty() {
            vec!["tiktok".to_string(), "youtube-shorts".to_string()]
        } else {
            selected
        }
    };

    let metadata = probe_video(&source)
        .await
        .with_context(|| format!("failed to probe {}", source.display()))?;
    let video = VideoFile {
        id: VideoId::new(),
        name: source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "source".to_string()),
        size: metadata.size,
        duration: metadata.duration,
        path: source,
        format: metadata.format.clone(),
    };

    let handshake_timeout = config.handshake_timeout;
    let (dispatcher, mut messages) =
        spawn_context(config.clone(), FfmpegRenderer, Arc::new(NoVision));
    Orchestrator::await_ready(&mut messages, handshake_timeout)
        .await
        .context("execution context failed to start")?;

    let mut orchestrator =
        Orchestrator::new(config, Arc::new(dispatcher), Arc::new(TracingNotifier));

    let job_id = orchestrator
        .submit(video, SceneDetectionConfig::default(), platforms)
        .await
        .context("submit rejected")?;

    // Drive the state machine until the job reaches a terminal status.
    while let Some(message) = messages.recv().await {
        if let Err(e) = orchestrator.handle_message(message).await {
            error!("Failed to apply message: {}", e);
        }
        let Some(job) = orchestrator.job(&job_id) else {
            break;
        };
        if job.status.is_terminal() {
            info!(
                job_id = %job_id,
                status = %job.status,
                clips = job.clips.len(),
                progress = job.progress(),
                "job finished"
            );
            for clip in &job.clips {
                info!(
                    clip = %clip.id,
                    status = %clip.status,
                    quality = clip.quality_score,
                    output = ?clip.output,
                    "clip result"
                );
            }
            break;
        }
    }
    Ok(())
}
