//! Pipeline error types.

use thiserror::Error;

pub type PipelineResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Rejected synchronously before any async dispatch; never retried.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Handshake timeout or context crash; fails the active step, no
    /// automatic retry.
    #[error("Execution context unavailable: {0}")]
    ContextUnavailable(String),

    /// An analyzer, fusion, or composer call raised during a step.
    #[error("Step execution failed: {0}")]
    StepExecution(String),

    #[error("Unknown job: {0}")]
    UnknownJob(String),

    #[error("Job is not retryable: {0}")]
    NotRetryable(String),

    #[error("Unknown platform preset: {0}")]
    UnknownPlatform(String),

    #[error("Engine error: {0}")]
    Engine(#[from] clipforge_engine::EngineError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn context_unavailable(msg: impl Into<String>) -> Self {
        Self::ContextUnavailable(msg.into())
    }

    pub fn step_execution(msg: impl Into<String>) -> Self {
        Self::StepExecution(msg.into())
    }

    /// Whether the caller can fix the request and resubmit.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::UnknownPlatform(_))
    }

    /// Whether explicit `retry` may recover the job.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StepExecution(_) | Self::Engine(_) | Self::Io(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_is_not_retryable() {
        let err = PipelineError::validation("unsupported container");
        assert!(err.is_validation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_step_errors_are_retryable() {
        assert!(PipelineError::step_execution("fusion panicked").is_retryable());
        assert!(!PipelineError::context_unavailable("no ready signal").is_retryable());
    }
}
