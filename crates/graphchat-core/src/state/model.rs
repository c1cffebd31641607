//! Persisted client state.

use serde::{Deserialize, Serialize};

/// Client-local state that must survive process restarts.
///
/// The stop flag outlives any in-memory component: the control that sets it
/// may be gone by the time the poll loop reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientState {
    /// Set by an explicit user stop action; consumed by the poll loop.
    #[serde(default)]
    pub stop_requested: bool,
    /// Session restored on the next launch.
    #[serde(default)]
    pub active_session_id: Option<String>,
}
