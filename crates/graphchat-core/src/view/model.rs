//! Flat view records consumed by front ends.

use crate::job::JobStatus;
use crate::thinking::ThinkEntry;
use serde::{Deserialize, Serialize};

/// Which side of the conversation a view entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageRole {
    /// The user's own submission.
    User,
    /// The assistant's answer.
    Assistant,
}

/// One renderable entry in the message list.
///
/// Produced by the transformer on every poll tick and for every history
/// record; the front end re-renders from these without touching wire types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageView {
    pub role: MessageRole,
    pub payload: String,
    pub session_id: Option<String>,
    pub job_id: Option<String>,
    pub status: JobStatus,
    pub thinking: Vec<ThinkEntry>,
    /// True once no further updates will arrive for this entry (history
    /// entries are born complete).
    pub complete: bool,
}

/// One row in the session picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionItem {
    pub id: String,
    pub name: String,
}
