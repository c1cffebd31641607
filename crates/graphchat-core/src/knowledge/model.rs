//! Knowledgebase wire model.

use serde::{Deserialize, Serialize};

/// A file registered in a knowledgebase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub r#type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub time_stamp: Option<u64>,
}

/// A knowledgebase as the backend serializes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Knowledgebase {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub knowledge_type: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub file_count: Option<u64>,
    #[serde(default)]
    pub files: Option<Vec<FileRecord>>,
}

/// The backend groups knowledgebases into one global plus per-session locals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgebaseCatalog {
    #[serde(default)]
    pub global_knowledge_base: Option<Knowledgebase>,
    #[serde(default)]
    pub local_knowledge_base: Option<Vec<Knowledgebase>>,
}
