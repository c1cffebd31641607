//! Job endpoints.

use crate::http::BackendClient;
use async_trait::async_trait;
use graphchat_core::error::Result;
use graphchat_core::job::{JobApi, JobRecord, JobResult};

#[async_trait]
impl JobApi for BackendClient {
    async fn job_result(&self, job_id: &str) -> Result<JobResult> {
        let request = self
            .http()
            .get(self.url(&format!("/api/jobs/{job_id}/message")));
        let record: Option<JobRecord> = self.send(request).await?;

        // Early in a job's life the record may not carry an answer yet; an
        // empty result reads as CREATED and keeps the poll loop going.
        Ok(record.and_then(|r| r.answer).unwrap_or_default())
    }
}
