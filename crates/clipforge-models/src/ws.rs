//! Message protocol between the orchestrator and the execution context.
//!
//! Tagged envelopes correlated by operation id. The orchestrator never
//! blocks on these; it mutates job state only when a message arrives, and
//! fences messages for jobs that were cancelled in the meantime.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::clip::GeneratedClip;
use crate::job::{JobId, StepId};
use crate::scene::DetectedScene;
use crate::video::VideoMetadata;

/// Payload of a `complete` message, specific to what finished.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompletePayload {
    /// Source metadata extraction finished
    Metadata { metadata: VideoMetadata },
    /// Scene detection finished
    Scenes { scenes: Vec<DetectedScene> },
    /// One clip composition finished
    Clip { clip: Box<GeneratedClip> },
}

/// Message envelope from the execution context.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerMessage {
    /// Handshake: the context is up and consuming commands.
    Ready,

    /// Progress update for an in-flight operation.
    Progress {
        /// Operation id the update belongs to
        id: String,
        #[serde(rename = "jobId")]
        job_id: JobId,
        /// Step the operation belongs to
        #[serde(rename = "stepId", skip_serializing_if = "Option::is_none")]
        step_id: Option<StepId>,
        /// Percentage (0-100)
        percentage: f64,
        /// Human-readable phase description
        message: String,
    },

    /// An operation finished successfully.
    Complete {
        /// Operation id
        id: String,
        #[serde(rename = "jobId")]
        job_id: JobId,
        #[serde(rename = "stepId", skip_serializing_if = "Option::is_none")]
        step_id: Option<StepId>,
        /// What finished
        data: CompletePayload,
    },

    /// An operation failed.
    Error {
        /// Operation id
        id: String,
        #[serde(rename = "jobId")]
        job_id: JobId,
        #[serde(rename = "stepId", skip_serializing_if = "Option::is_none")]
        step_id: Option<StepId>,
        /// Human-readable failure description
        error: String,
    },
}

impl WorkerMessage {
    /// The job this message belongs to, if any (handshakes carry none).
    pub fn job_id(&self) -> Option<&JobId> {
        match self {
            WorkerMessage::Ready => None,
            WorkerMessage::Progress { job_id, .. }
            | WorkerMessage::Complete { job_id, .. }
            | WorkerMessage::Error { job_id, .. } => Some(job_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_serialization_shape() {
        let msg = WorkerMessage::Progress {
            id: "op-1".into(),
            job_id: JobId::from_string("job-1"),
            step_id: Some(StepId::DetectScenes),
            percentage: 42.0,
            message: "analyzing".into(),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["jobId"], "job-1");
        assert_eq!(json["stepId"], "detect-scenes");
    }

    #[test]
    fn test_ready_has_no_job() {
        assert!(WorkerMessage::Ready.job_id().is_none());
    }

    #[test]
    fn test_error_round_trip() {
        let msg = WorkerMessage::Error {
            id: "op-2".into(),
            job_id: JobId::from_string("job-2"),
            step_id: None,
            error: "decoder crashed".into(),
        };
        let json = serde_json::to_string(&msg).unwrap();
        let back: WorkerMessage = serde_json::from_str(&json).unwrap();
        assert_eq!(back.job_id().unwrap().as_str(), "job-2");
    }
}
