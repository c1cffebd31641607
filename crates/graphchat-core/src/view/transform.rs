//! Pure transformations from wire types to view records.
//!
//! Poll responses are partial while a job runs, so every extraction here is
//! null-safe: a missing field degrades to an empty value, never a panic.
//! All functions are deterministic and side-effect free, safe to call on
//! every poll tick.

use super::model::{MessageRole, MessageView, SessionItem};
use crate::job::{ChatMessage, JobRecord, JobResult, JobStatus, SubTaskResult};
use crate::session::Session;
use crate::thinking::ThinkEntry;

/// Maps a raw job result to its flat view record.
///
/// Returns `None` for an absent answer (nothing to show yet).
pub fn message_view(answer: Option<&JobResult>) -> Option<MessageView> {
    let answer = answer?;
    let status = answer.status();

    Some(MessageView {
        role: MessageRole::Assistant,
        payload: payload_of(answer.message.as_ref()),
        session_id: answer.message.as_ref().and_then(|m| m.session_id.clone()),
        job_id: job_id_of(answer),
        status,
        thinking: think_entries(&answer.thinking),
        complete: status.is_terminal(),
    })
}

/// Maps a session's question/answer history to view entries.
///
/// Each record yields the question (when present) followed by the answer;
/// both are marked complete, since history is terminal by definition.
pub fn history_views(records: &[JobRecord]) -> Vec<MessageView> {
    let mut views = Vec::new();

    for record in records {
        if let Some(message) = record.question.as_ref().and_then(|q| q.message.as_ref()) {
            views.push(MessageView {
                role: MessageRole::User,
                payload: payload_of(Some(message)),
                session_id: message.session_id.clone(),
                job_id: message.job_id.clone(),
                status: JobStatus::Finished,
                thinking: Vec::new(),
                complete: true,
            });
        }

        if let Some(mut view) = message_view(record.answer.as_ref()) {
            view.complete = true;
            views.push(view);
        }
    }

    views
}

/// Maps a backend session page to picker rows, most recent first.
pub fn session_items(sessions: &[Session]) -> Vec<SessionItem> {
    sessions
        .iter()
        .map(|session| SessionItem {
            id: session.id.clone().unwrap_or_default(),
            name: session.name.clone().unwrap_or_default(),
        })
        .rev()
        .collect()
}

/// Extracts thinking entries from a result's sub-task list.
///
/// A sub-task's payload is only surfaced once that sub-task is FINISHED;
/// until then the entry carries an empty payload and the UI shows a loading
/// placeholder. Sub-tasks without an id cannot be merged and are skipped.
fn think_entries(thinking: &[SubTaskResult]) -> Vec<ThinkEntry> {
    thinking
        .iter()
        .filter_map(|sub_task| {
            let task_id = sub_task.job.as_ref()?.id.clone()?;
            let status = sub_task.metrics.as_ref().and_then(|m| m.status);

            let payload = if status == Some(JobStatus::Finished) {
                sub_task.message.as_ref().and_then(|m| m.payload.clone())
            } else {
                None
            };

            Some(ThinkEntry {
                task_id,
                status,
                goal: sub_task.job.as_ref().and_then(|j| j.goal.clone()),
                payload,
                assigned_expert_name: sub_task
                    .message
                    .as_ref()
                    .and_then(|m| m.assigned_expert_name.clone())
                    .or_else(|| {
                        sub_task
                            .job
                            .as_ref()
                            .and_then(|j| j.assigned_expert_name.clone())
                    }),
            })
        })
        .collect()
}

fn payload_of(message: Option<&ChatMessage>) -> String {
    message
        .and_then(|m| m.payload.clone())
        .unwrap_or_default()
}

fn job_id_of(answer: &JobResult) -> Option<String> {
    answer
        .message
        .as_ref()
        .and_then(|m| m.job_id.clone())
        .or_else(|| answer.metrics.as_ref().and_then(|m| m.job_id.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{JobMetrics, QuestionRecord, SubTaskJob};

    fn answer(status: JobStatus, payload: &str) -> JobResult {
        JobResult {
            message: Some(ChatMessage {
                payload: Some(payload.to_string()),
                session_id: Some("s-1".to_string()),
                job_id: Some("j-1".to_string()),
                role: Some("SYSTEM".to_string()),
                ..Default::default()
            }),
            metrics: Some(JobMetrics {
                status: Some(status),
                ..Default::default()
            }),
            thinking: Vec::new(),
        }
    }

    fn sub_task(id: &str, status: JobStatus, payload: &str) -> SubTaskResult {
        SubTaskResult {
            message: Some(ChatMessage {
                payload: Some(payload.to_string()),
                ..Default::default()
            }),
            metrics: Some(JobMetrics {
                status: Some(status),
                ..Default::default()
            }),
            job: Some(SubTaskJob {
                id: Some(id.to_string()),
                goal: Some(format!("goal of {id}")),
                assigned_expert_name: Some("Graph Analysis Expert".to_string()),
            }),
        }
    }

    #[test]
    fn test_none_in_none_out() {
        assert!(message_view(None).is_none());
    }

    #[test]
    fn test_answer_maps_to_flat_view() {
        let view = message_view(Some(&answer(JobStatus::Running, "partial"))).unwrap();
        assert_eq!(view.role, MessageRole::Assistant);
        assert_eq!(view.payload, "partial");
        assert_eq!(view.session_id.as_deref(), Some("s-1"));
        assert_eq!(view.job_id.as_deref(), Some("j-1"));
        assert_eq!(view.status, JobStatus::Running);
        assert!(!view.complete);
    }

    #[test]
    fn test_empty_answer_degrades_instead_of_panicking() {
        let view = message_view(Some(&JobResult::default())).unwrap();
        assert_eq!(view.payload, "");
        assert_eq!(view.status, JobStatus::Created);
        assert!(view.thinking.is_empty());
    }

    #[test]
    fn test_unfinished_subtask_payload_is_withheld() {
        let mut result = answer(JobStatus::Running, "");
        result.thinking = vec![
            sub_task("t1", JobStatus::Running, "draft output"),
            sub_task("t2", JobStatus::Finished, "final output"),
        ];

        let view = message_view(Some(&result)).unwrap();
        assert_eq!(view.thinking.len(), 2);
        assert_eq!(view.thinking[0].payload, None);
        assert_eq!(view.thinking[1].payload.as_deref(), Some("final output"));
        assert_eq!(view.thinking[0].goal.as_deref(), Some("goal of t1"));
    }

    #[test]
    fn test_subtask_without_id_is_skipped() {
        let mut result = answer(JobStatus::Running, "");
        let mut orphan = sub_task("t1", JobStatus::Running, "");
        orphan.job.as_mut().unwrap().id = None;
        result.thinking = vec![orphan, sub_task("t2", JobStatus::Running, "")];

        let view = message_view(Some(&result)).unwrap();
        assert_eq!(view.thinking.len(), 1);
        assert_eq!(view.thinking[0].task_id, "t2");
    }

    #[test]
    fn test_history_record_yields_question_then_answer() {
        let record = JobRecord {
            question: Some(QuestionRecord {
                message: Some(ChatMessage {
                    payload: Some("what is a graph?".to_string()),
                    role: Some("USER".to_string()),
                    ..Default::default()
                }),
            }),
            answer: Some(answer(JobStatus::Finished, "a set of nodes and edges")),
        };

        let views = history_views(&[record]);
        assert_eq!(views.len(), 2);
        assert_eq!(views[0].role, MessageRole::User);
        assert_eq!(views[0].payload, "what is a graph?");
        assert!(views[0].complete);
        assert_eq!(views[1].role, MessageRole::Assistant);
        assert!(views[1].complete);
    }

    #[test]
    fn test_history_tolerates_missing_halves() {
        let record = JobRecord {
            question: None,
            answer: Some(answer(JobStatus::Failed, "")),
        };
        let views = history_views(&[record]);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].status, JobStatus::Failed);
    }

    #[test]
    fn test_session_items_reverse_to_most_recent_first() {
        let sessions = vec![
            Session {
                id: Some("old".to_string()),
                name: Some("first".to_string()),
                ..Default::default()
            },
            Session {
                id: Some("new".to_string()),
                name: Some("second".to_string()),
                ..Default::default()
            },
        ];

        let items = session_items(&sessions);
        assert_eq!(items[0].id, "new");
        assert_eq!(items[1].id, "old");
    }
}
