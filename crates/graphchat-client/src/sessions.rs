//! Session endpoints.

use crate::http::BackendClient;
use async_trait::async_trait;
use graphchat_core::error::Result;
use graphchat_core::job::{ChatMessage, JobRecord};
use graphchat_core::session::{ChatRequest, Session, SessionApi};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize)]
struct JobIdData {
    #[serde(default)]
    id: Option<String>,
}

#[async_trait]
impl SessionApi for BackendClient {
    async fn list_sessions(&self, page: u32, size: u32) -> Result<Vec<Session>> {
        let request = self
            .http()
            .get(self.url("/api/sessions"))
            .query(&[("page", page), ("size", size)]);
        Ok(self.send(request).await?.unwrap_or_default())
    }

    async fn create_session(&self, name: &str) -> Result<Session> {
        tracing::debug!("[SessionApi] creating session '{}'", name);
        let request = self
            .http()
            .post(self.url("/api/sessions"))
            .json(&json!({ "name": name }));
        self.send_expecting(request).await
    }

    async fn get_session(&self, session_id: &str) -> Result<Session> {
        let request = self
            .http()
            .get(self.url(&format!("/api/sessions/{session_id}")));
        self.send_expecting(request).await
    }

    async fn rename_session(&self, session_id: &str, name: &str) -> Result<Session> {
        let request = self
            .http()
            .put(self.url(&format!("/api/sessions/{session_id}")))
            .json(&json!({ "name": name }));
        self.send_expecting(request).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        let request = self
            .http()
            .delete(self.url(&format!("/api/sessions/{session_id}")));
        self.send_unit(request).await
    }

    async fn chat(&self, session_id: &str, request: ChatRequest) -> Result<ChatMessage> {
        tracing::debug!("[SessionApi] submitting instruction to session {}", session_id);
        let request = self
            .http()
            .post(self.url(&format!("/api/sessions/{session_id}/chat")))
            .json(&request);
        self.send_expecting(request).await
    }

    async fn session_messages(&self, session_id: &str) -> Result<Vec<JobRecord>> {
        let request = self
            .http()
            .get(self.url(&format!("/api/sessions/{session_id}/messages")));
        Ok(self.send(request).await?.unwrap_or_default())
    }

    async fn latest_job_id(&self, session_id: &str) -> Result<Option<String>> {
        let request = self
            .http()
            .get(self.url(&format!("/api/sessions/{session_id}/job_id")));
        let data: Option<JobIdData> = self.send(request).await?;
        Ok(data.and_then(|d| d.id))
    }
}
