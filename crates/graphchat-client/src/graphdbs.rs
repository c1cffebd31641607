//! Graph database endpoints.

use crate::http::BackendClient;
use async_trait::async_trait;
use graphchat_core::error::Result;
use graphchat_core::graphdb::{GraphDb, GraphDbApi, GraphDbSpec};

#[async_trait]
impl GraphDbApi for BackendClient {
    async fn list_graphdbs(&self) -> Result<Vec<GraphDb>> {
        let request = self.http().get(self.url("/api/graphdbs"));
        Ok(self.send(request).await?.unwrap_or_default())
    }

    async fn get_graphdb(&self, graphdb_id: &str) -> Result<GraphDb> {
        let request = self
            .http()
            .get(self.url(&format!("/api/graphdbs/{graphdb_id}")));
        self.send_expecting(request).await
    }

    async fn create_graphdb(&self, spec: GraphDbSpec) -> Result<GraphDb> {
        let request = self.http().post(self.url("/api/graphdbs")).json(&spec);
        self.send_expecting(request).await
    }

    async fn update_graphdb(&self, graphdb_id: &str, spec: GraphDbSpec) -> Result<GraphDb> {
        let request = self
            .http()
            .put(self.url(&format!("/api/graphdbs/{graphdb_id}")))
            .json(&spec);
        self.send_expecting(request).await
    }

    async fn delete_graphdb(&self, graphdb_id: &str) -> Result<()> {
        let request = self
            .http()
            .delete(self.url(&format!("/api/graphdbs/{graphdb_id}")));
        self.send_unit(request).await
    }
}
