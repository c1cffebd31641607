//! Knowledgebase API trait.

use super::model::{Knowledgebase, KnowledgebaseCatalog};
use crate::error::Result;
use async_trait::async_trait;

/// Backend operations on knowledgebases and their files.
#[async_trait]
pub trait KnowledgebaseApi: Send + Sync {
    /// Lists the global knowledgebase and the per-session local ones.
    async fn list_knowledgebases(&self) -> Result<KnowledgebaseCatalog>;

    /// Fetches a knowledgebase by id.
    async fn get_knowledgebase(&self, knowledgebase_id: &str) -> Result<Knowledgebase>;

    /// Creates a knowledgebase, optionally bound to a session.
    async fn create_knowledgebase(
        &self,
        name: &str,
        knowledge_type: &str,
        session_id: Option<&str>,
    ) -> Result<Knowledgebase>;

    /// Updates a knowledgebase's name and description.
    async fn edit_knowledgebase(
        &self,
        knowledgebase_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Knowledgebase>;

    /// Deletes a knowledgebase.
    async fn delete_knowledgebase(&self, knowledgebase_id: &str) -> Result<()>;

    /// Uploads raw file content, returning the backend-assigned file id.
    ///
    /// The returned id is what chat submissions reference via
    /// `attached_messages`.
    async fn upload_file(&self, file_name: &str, content: Vec<u8>) -> Result<String>;

    /// Loads an uploaded file into a knowledgebase with the given config.
    async fn load_file(
        &self,
        knowledgebase_id: &str,
        file_id: &str,
        config: serde_json::Value,
    ) -> Result<()>;

    /// Removes a file from a knowledgebase.
    async fn delete_file(&self, knowledgebase_id: &str, file_id: &str) -> Result<()>;
}
