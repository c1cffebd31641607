//! Graph database API trait.

use super::model::{GraphDb, GraphDbSpec};
use crate::error::Result;
use async_trait::async_trait;

/// Backend CRUD for graph database configurations.
#[async_trait]
pub trait GraphDbApi: Send + Sync {
    /// Lists all configured graph databases.
    async fn list_graphdbs(&self) -> Result<Vec<GraphDb>>;

    /// Fetches a graph database configuration by id.
    async fn get_graphdb(&self, graphdb_id: &str) -> Result<GraphDb>;

    /// Registers a new graph database.
    async fn create_graphdb(&self, spec: GraphDbSpec) -> Result<GraphDb>;

    /// Updates an existing graph database configuration.
    async fn update_graphdb(&self, graphdb_id: &str, spec: GraphDbSpec) -> Result<GraphDb>;

    /// Removes a graph database configuration.
    async fn delete_graphdb(&self, graphdb_id: &str) -> Result<()>;
}
