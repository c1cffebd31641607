//! Client-side view of one expert-delegated sub-task.

use crate::job::JobStatus;
use serde::{Deserialize, Serialize};

/// Locally merged state of one thinking sub-task.
///
/// Keyed by the sub-task's own id, not the parent job's. The payload stays
/// empty until the sub-task reaches FINISHED; the UI renders the gap as a
/// loading placeholder.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThinkEntry {
    /// The sub-task's own unique id.
    pub task_id: String,
    pub status: Option<JobStatus>,
    pub goal: Option<String>,
    pub payload: Option<String>,
    pub assigned_expert_name: Option<String>,
}
