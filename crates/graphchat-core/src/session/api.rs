//! Session API trait and chat request types.

use super::model::Session;
use crate::error::Result;
use crate::job::{AttachedMessage, ChatMessage, JobRecord};
use async_trait::async_trait;

/// The instruction part of a chat submission.
#[derive(Debug, Clone, serde::Serialize)]
pub struct InstructionMessage {
    pub payload: String,
    pub message_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_expert_name: Option<String>,
}

impl InstructionMessage {
    /// A plain text instruction with no expert pre-assignment.
    pub fn text(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            message_type: "TEXT".to_string(),
            assigned_expert_name: None,
        }
    }
}

/// Body of `POST /api/sessions/{id}/chat`.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChatRequest {
    pub instruction_message: InstructionMessage,
    /// Files uploaded out-of-band, referenced by id.
    pub attached_messages: Vec<AttachedMessage>,
}

/// An abstract backend for session lifecycle and chat submission.
///
/// Defines the contract the application layer depends on, decoupling it from
/// the concrete HTTP transport.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Lists sessions, most recent last as the backend returns them.
    async fn list_sessions(&self, page: u32, size: u32) -> Result<Vec<Session>>;

    /// Creates a session with the given name.
    async fn create_session(&self, name: &str) -> Result<Session>;

    /// Fetches a session by id.
    async fn get_session(&self, session_id: &str) -> Result<Session>;

    /// Renames a session.
    async fn rename_session(&self, session_id: &str, name: &str) -> Result<Session>;

    /// Deletes a session.
    async fn delete_session(&self, session_id: &str) -> Result<()>;

    /// Submits a chat instruction, returning the message record that carries
    /// the assigned job id.
    async fn chat(&self, session_id: &str, request: ChatRequest) -> Result<ChatMessage>;

    /// Fetches the full question/answer history of a session.
    async fn session_messages(&self, session_id: &str) -> Result<Vec<JobRecord>>;

    /// Fetches the id of the session's latest job, if any.
    async fn latest_job_id(&self, session_id: &str) -> Result<Option<String>>;
}
