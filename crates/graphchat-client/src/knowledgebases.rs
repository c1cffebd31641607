//! Knowledgebase endpoints.

use crate::http::BackendClient;
use async_trait::async_trait;
use graphchat_core::error::{GraphChatError, Result};
use graphchat_core::knowledge::{Knowledgebase, KnowledgebaseApi, KnowledgebaseCatalog};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct UploadData {
    #[serde(default)]
    file_id: Option<String>,
}

#[async_trait]
impl KnowledgebaseApi for BackendClient {
    async fn list_knowledgebases(&self) -> Result<KnowledgebaseCatalog> {
        let request = self.http().get(self.url("/api/knowledgebases"));
        Ok(self.send(request).await?.unwrap_or_default())
    }

    async fn get_knowledgebase(&self, knowledgebase_id: &str) -> Result<Knowledgebase> {
        let request = self
            .http()
            .get(self.url(&format!("/api/knowledgebases/{knowledgebase_id}")));
        self.send_expecting(request).await
    }

    async fn create_knowledgebase(
        &self,
        name: &str,
        knowledge_type: &str,
        session_id: Option<&str>,
    ) -> Result<Knowledgebase> {
        let request = self
            .http()
            .post(self.url("/api/knowledgebases"))
            .json(&json!({
                "name": name,
                "knowledge_type": knowledge_type,
                "session_id": session_id,
            }));
        self.send_expecting(request).await
    }

    async fn edit_knowledgebase(
        &self,
        knowledgebase_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Knowledgebase> {
        let request = self
            .http()
            .put(self.url(&format!("/api/knowledgebases/{knowledgebase_id}")))
            .json(&json!({ "name": name, "description": description }));
        self.send_expecting(request).await
    }

    async fn delete_knowledgebase(&self, knowledgebase_id: &str) -> Result<()> {
        let request = self
            .http()
            .delete(self.url(&format!("/api/knowledgebases/{knowledgebase_id}")));
        self.send_unit(request).await
    }

    async fn upload_file(&self, file_name: &str, content: Vec<u8>) -> Result<String> {
        tracing::debug!("[KnowledgebaseApi] uploading '{}'", file_name);
        let part = Part::bytes(content).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let request = self.http().post(self.url("/api/files")).multipart(form);
        let data: UploadData = self.send_expecting(request).await?;
        data.file_id
            .ok_or_else(|| GraphChatError::backend("upload response carried no file id"))
    }

    async fn load_file(
        &self,
        knowledgebase_id: &str,
        file_id: &str,
        config: serde_json::Value,
    ) -> Result<()> {
        let request = self
            .http()
            .post(self.url(&format!(
                "/api/knowledgebases/{knowledgebase_id}/files/{file_id}"
            )))
            .json(&json!({ "config": config }));
        self.send_unit(request).await
    }

    async fn delete_file(&self, knowledgebase_id: &str, file_id: &str) -> Result<()> {
        let request = self.http().delete(self.url(&format!(
            "/api/knowledgebases/{knowledgebase_id}/files/{file_id}"
        )));
        self.send_unit(request).await
    }
}
