//! Session domain model.

use serde::{Deserialize, Serialize};

/// A conversation on the backend.
///
/// Created on the user's first submission (or explicitly via "new
/// conversation"); renamed and deleted through direct backend calls. The id
/// is immutable once created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Creation time as the backend reports it.
    #[serde(default)]
    pub timestamp: Option<String>,
    /// Knowledgebase bound to this session, if any.
    #[serde(default)]
    pub knowledgebase_id: Option<String>,
}
