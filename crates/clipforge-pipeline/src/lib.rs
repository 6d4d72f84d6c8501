//! Job orchestration pipeline.
//!
//! Wires the engine into an asynchronous job state machine: jobs move
//! through `queued -> processing -> {completed | failed | cancelled}` with
//! two fixed sequential steps (detect-scenes, generate-clips), all media
//! work running in an isolated execution context that talks back purely via
//! correlated messages.

pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod notify;
pub mod orchestrator;

pub use config::PipelineConfig;
pub use context::{spawn_context, ContextCommand, ContextDispatcher, Dispatcher};
pub use error::{PipelineError, PipelineResult};
pub use logging::JobLogger;
pub use notify::{Notifier, NullNotifier, TracingNotifier};
pub use orchestrator::Orchestrator;
