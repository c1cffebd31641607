//! Job domain: wire types for backend jobs and their evolving results.

pub mod api;
pub mod model;

pub use api::JobApi;
pub use model::{
    AttachedMessage, ChatMessage, JobMetrics, JobRecord, JobResult, JobStatus, QuestionRecord,
    SubTaskJob, SubTaskResult, STOP_PAYLOAD,
};
