//! The job result poll loop.
//!
//! The backend exposes no streaming transport; a job's result is re-fetched
//! at a fixed interval until it reaches a terminal status. The loop merges
//! thinking sub-task updates as it goes, so every emitted view is a superset
//! of the previous one, and it stops cooperatively: cancellation is observed
//! between fetches, never by aborting an in-flight request.

use graphchat_core::error::Result;
use graphchat_core::job::{JobApi, JobResult, JobStatus, STOP_PAYLOAD};
use graphchat_core::state::StateRepository;
use graphchat_core::thinking::{merge_entries, ThinkEntry};
use graphchat_core::view::{message_view, MessageRole, MessageView};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Tuning for the poll loop.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Delay between a response and the next fetch.
    pub interval: Duration,
    /// Transient fetch failures tolerated within one cycle before the job is
    /// surfaced as failed.
    pub max_transient_retries: u32,
    /// Ceiling on poll cycles, so a job that never terminates cannot keep
    /// the loop alive forever.
    pub max_cycles: u32,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(500),
            max_transient_retries: 3,
            max_cycles: 2400,
        }
    }
}

/// One progress or terminal update from a poll loop.
///
/// `job_id` is the id the loop was started for, letting the consumer discard
/// updates that no longer match its active job.
#[derive(Debug, Clone)]
pub struct JobUpdate {
    pub job_id: String,
    pub view: MessageView,
}

/// Polls one job at a time to completion.
#[derive(Clone)]
pub struct JobPoller {
    api: Arc<dyn JobApi>,
    state: Arc<dyn StateRepository>,
    config: PollerConfig,
}

enum Fetched {
    Result(JobResult),
    Failed(String),
}

impl JobPoller {
    pub fn new(
        api: Arc<dyn JobApi>,
        state: Arc<dyn StateRepository>,
        config: PollerConfig,
    ) -> Self {
        Self { api, state, config }
    }

    /// Runs the poll loop for `job_id` until it produces a terminal view.
    ///
    /// Progress views are sent through `updates` on every cycle; the terminal
    /// view is both sent and returned, and is produced exactly once. Callers
    /// must not run two loops for the same job id concurrently.
    ///
    /// The loop ends when:
    /// - the fetched status is terminal (FINISHED/FAILED/STOPPED),
    /// - `cancel` fires or the persisted stop flag is set, yielding a
    ///   synthetic STOPPED view whose payload is the `"STOP"` sentinel,
    /// - transient fetch errors exhaust their retry budget or a semantic
    ///   (4xx/backend) error occurs, yielding a synthetic FAILED view,
    /// - the cycle ceiling is hit, yielding a synthetic FAILED view.
    pub async fn run(
        &self,
        job_id: &str,
        cancel: CancellationToken,
        updates: mpsc::UnboundedSender<JobUpdate>,
    ) -> MessageView {
        let mut last_known: Option<JobResult> = None;
        let mut merged_thinking: Vec<ThinkEntry> = Vec::new();

        for cycle in 0..self.config.max_cycles {
            if self.stop_requested(&cancel).await {
                tracing::info!("[JobPoller] job {} stopped by user", job_id);
                let view = self.stopped_view(job_id, last_known.as_ref(), &merged_thinking);
                let _ = updates.send(JobUpdate {
                    job_id: job_id.to_string(),
                    view: view.clone(),
                });
                return view;
            }

            let result = match self.fetch_with_retry(job_id).await {
                Fetched::Result(result) => result,
                Fetched::Failed(message) => {
                    let view = self.failed_view(job_id, last_known.as_ref(), &merged_thinking, message);
                    let _ = updates.send(JobUpdate {
                        job_id: job_id.to_string(),
                        view: view.clone(),
                    });
                    return view;
                }
            };

            // message_view only returns None for an absent answer.
            let mut view = message_view(Some(&result)).expect("answer is present");
            merged_thinking = merge_entries(&merged_thinking, &view.thinking);
            view.thinking = merged_thinking.clone();
            if view.job_id.is_none() {
                view.job_id = Some(job_id.to_string());
            }

            let status = view.status;
            last_known = Some(result);

            let _ = updates.send(JobUpdate {
                job_id: job_id.to_string(),
                view: view.clone(),
            });

            if status.is_terminal() {
                tracing::debug!(
                    "[JobPoller] job {} reached {} after {} cycles",
                    job_id,
                    status,
                    cycle + 1
                );
                return view;
            }

            // Fixed delay before the next fetch; a cancellation during the
            // wait takes effect at the next cycle top.
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }

        tracing::warn!(
            "[JobPoller] job {} exceeded {} poll cycles, giving up",
            job_id,
            self.config.max_cycles
        );
        let view = self.failed_view(
            job_id,
            last_known.as_ref(),
            &merged_thinking,
            format!("job did not finish within {} poll cycles", self.config.max_cycles),
        );
        let _ = updates.send(JobUpdate {
            job_id: job_id.to_string(),
            view: view.clone(),
        });
        view
    }

    /// Checks both stop channels at the top of a cycle.
    ///
    /// The persisted flag is consumed here (read-and-clear), so honoring a
    /// stop for this job cannot block the next one.
    async fn stop_requested(&self, cancel: &CancellationToken) -> bool {
        let flag = match self.state.take_stop_flag().await {
            Ok(flag) => flag,
            Err(e) => {
                tracing::warn!("[JobPoller] failed to read stop flag: {}", e);
                false
            }
        };
        flag || cancel.is_cancelled()
    }

    /// One cycle's fetch, retrying transient failures up to the budget.
    async fn fetch_with_retry(&self, job_id: &str) -> Fetched {
        let mut attempt = 0;
        loop {
            match self.fetch(job_id).await {
                Ok(result) => return Fetched::Result(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_transient_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "[JobPoller] transient fetch error for job {} (attempt {}/{}): {}",
                        job_id,
                        attempt,
                        self.config.max_transient_retries,
                        e
                    );
                    tokio::time::sleep(self.config.interval).await;
                }
                Err(e) => {
                    tracing::error!("[JobPoller] fetch failed for job {}: {}", job_id, e);
                    return Fetched::Failed(e.to_string());
                }
            }
        }
    }

    async fn fetch(&self, job_id: &str) -> Result<JobResult> {
        self.api.job_result(job_id).await
    }

    /// Synthetic result for a user-stopped job: the `"STOP"` sentinel payload
    /// with session/job identity copied from the last-known answer.
    fn stopped_view(
        &self,
        job_id: &str,
        last_known: Option<&JobResult>,
        merged_thinking: &[ThinkEntry],
    ) -> MessageView {
        let mut view = self.synthetic_view(job_id, last_known, merged_thinking);
        view.payload = STOP_PAYLOAD.to_string();
        view.status = JobStatus::Stopped;
        view
    }

    fn failed_view(
        &self,
        job_id: &str,
        last_known: Option<&JobResult>,
        merged_thinking: &[ThinkEntry],
        message: String,
    ) -> MessageView {
        let mut view = self.synthetic_view(job_id, last_known, merged_thinking);
        view.payload = message;
        view.status = JobStatus::Failed;
        view
    }

    fn synthetic_view(
        &self,
        job_id: &str,
        last_known: Option<&JobResult>,
        merged_thinking: &[ThinkEntry],
    ) -> MessageView {
        let mut view = message_view(last_known).unwrap_or(MessageView {
            role: MessageRole::Assistant,
            payload: String::new(),
            session_id: None,
            job_id: None,
            status: JobStatus::Created,
            thinking: Vec::new(),
            complete: false,
        });
        if view.job_id.is_none() {
            view.job_id = Some(job_id.to_string());
        }
        view.thinking = merged_thinking.to_vec();
        view.complete = true;
        view
    }
}
