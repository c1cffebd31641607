//! Job wire model.
//!
//! These types mirror the backend's JSON shapes for jobs and their results.
//! A job's result is mutated server-side while the job runs; the client only
//! re-fetches it, so every field tolerates being absent mid-stream.

use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Sentinel payload carried by the synthetic result of a user-stopped job.
pub const STOP_PAYLOAD: &str = "STOP";

/// Lifecycle status reported by the backend for a job or sub-task.
///
/// FINISHED, FAILED and STOPPED are terminal; anything else keeps the
/// poll loop alive. Status strings the client does not know decode to
/// [`JobStatus::Unknown`], which is non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Created,
    Running,
    Finished,
    Failed,
    Stopped,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    /// Whether the backend will never change this status again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished | Self::Failed | Self::Stopped)
    }
}

/// A single chat message as the backend serializes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub assigned_expert_name: Option<String>,
    #[serde(default)]
    pub attached_messages: Option<Vec<AttachedMessage>>,
}

/// Reference to a file uploaded out-of-band, attached to an instruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedMessage {
    pub file_id: String,
    pub message_type: String,
}

/// Execution metrics the backend reports alongside a job result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobMetrics {
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub tokens: Option<u64>,
}

/// Descriptor of the delegated job behind one thinking sub-task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubTaskJob {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub assigned_expert_name: Option<String>,
}

/// One expert-delegated sub-task inside a job's `thinking` list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubTaskResult {
    #[serde(default)]
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub metrics: Option<JobMetrics>,
    #[serde(default)]
    pub job: Option<SubTaskJob>,
}

/// The backend's current view of a job (the `answer` object).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobResult {
    #[serde(default)]
    pub message: Option<ChatMessage>,
    #[serde(default)]
    pub metrics: Option<JobMetrics>,
    #[serde(default)]
    pub thinking: Vec<SubTaskResult>,
}

impl JobResult {
    /// Status from metrics, defaulting to CREATED while the backend has not
    /// reported one yet.
    pub fn status(&self) -> JobStatus {
        self.metrics
            .as_ref()
            .and_then(|m| m.status)
            .unwrap_or(JobStatus::Created)
    }
}

/// The user side of a historical job record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default)]
    pub message: Option<ChatMessage>,
}

/// One question/answer pair from a session's message history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(default)]
    pub question: Option<QuestionRecord>,
    #[serde(default)]
    pub answer: Option<JobResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminality() {
        assert!(JobStatus::Finished.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Stopped.is_terminal());
        assert!(!JobStatus::Created.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(!JobStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_status_wire_form() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Finished).unwrap(),
            "\"FINISHED\""
        );
        let status: JobStatus = serde_json::from_str("\"RUNNING\"").unwrap();
        assert_eq!(status, JobStatus::Running);
    }

    #[test]
    fn test_unknown_status_is_non_terminal() {
        let status: JobStatus = serde_json::from_str("\"PAUSED\"").unwrap();
        assert_eq!(status, JobStatus::Unknown);
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_partial_result_decodes() {
        // Mid-stream responses regularly omit metrics and thinking entirely.
        let result: JobResult = serde_json::from_str(r#"{"message": {"payload": "hi"}}"#).unwrap();
        assert_eq!(result.status(), JobStatus::Created);
        assert!(result.thinking.is_empty());
        assert_eq!(result.message.unwrap().payload.as_deref(), Some("hi"));
    }

    #[test]
    fn test_result_status_reads_metrics() {
        let result: JobResult =
            serde_json::from_str(r#"{"metrics": {"status": "RUNNING", "duration": 1.5}}"#).unwrap();
        assert_eq!(result.status(), JobStatus::Running);
    }
}
