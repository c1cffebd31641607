//! Job API trait.

use super::model::JobResult;
use crate::error::Result;
use async_trait::async_trait;

/// Read access to a job's evolving result.
///
/// The poll loop depends on this trait rather than a concrete HTTP client so
/// it can be exercised against scripted in-memory backends in tests.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Fetches the backend's current result for the given job.
    ///
    /// Called once per poll cycle. Implementations must not cache: the whole
    /// point of the call is observing server-side mutation of the result.
    async fn job_result(&self, job_id: &str) -> Result<JobResult>;
}
