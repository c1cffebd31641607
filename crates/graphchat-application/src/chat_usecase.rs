//! Chat use case: orchestrates session lifecycle, chat submission and the
//! poll loop, and feeds view updates to the front end.

use crate::poller::{JobPoller, JobUpdate, PollerConfig};
use graphchat_core::error::{GraphChatError, Result};
use graphchat_core::job::{AttachedMessage, JobApi, JobStatus};
use graphchat_core::session::{ChatRequest, InstructionMessage, SessionApi};
use graphchat_core::state::StateRepository;
use graphchat_core::view::{history_views, session_items, MessageRole, MessageView, SessionItem};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use tokio_util::sync::CancellationToken;

/// How many sessions the picker shows.
const SESSION_PAGE_SIZE: u32 = 10;

/// Longest session name derived from the first submission.
const SESSION_NAME_LIMIT: usize = 30;

/// Events delivered to the front end's message list.
#[derive(Debug, Clone)]
pub enum ChatEvent {
    /// The user's own submission, echoed locally before the backend answers.
    Question(MessageView),
    /// A progress view from the poll loop.
    AnswerUpdate(JobUpdate),
    /// The terminal view; no further events follow for this job.
    AnswerFinal(JobUpdate),
}

struct ActiveJob {
    job_id: String,
    cancel: CancellationToken,
}

/// Orchestrates the request/response cycle of the chat UI.
///
/// One instance drives one message list: it creates or selects sessions,
/// submits instructions, runs the poll loop in a background task, and tags
/// and filters updates so a stale poller can never write into a newly
/// selected session's view.
pub struct ChatUseCase {
    sessions: Arc<dyn SessionApi>,
    jobs: Arc<dyn JobApi>,
    state: Arc<dyn StateRepository>,
    poller_config: PollerConfig,
    active: Arc<RwLock<Option<ActiveJob>>>,
    events: mpsc::UnboundedSender<ChatEvent>,
}

impl ChatUseCase {
    /// Creates the use case and the event stream the front end consumes.
    pub fn new(
        sessions: Arc<dyn SessionApi>,
        jobs: Arc<dyn JobApi>,
        state: Arc<dyn StateRepository>,
        poller_config: PollerConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ChatEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                sessions,
                jobs,
                state,
                poller_config,
                active: Arc::new(RwLock::new(None)),
                events,
            },
            receiver,
        )
    }

    /// Submits a chat instruction, returning the job id being polled.
    ///
    /// Creates a session first when none is active. Rejects the submission
    /// while another job is still in flight; the poll protocol does not
    /// permit two concurrent loops for one message list.
    pub async fn submit(
        &self,
        text: &str,
        attachments: Vec<AttachedMessage>,
    ) -> Result<String> {
        if text.trim().is_empty() {
            return Err(GraphChatError::execution("cannot submit an empty message"));
        }
        if self.active.read().await.is_some() {
            return Err(GraphChatError::execution(
                "a job is already in flight for this conversation",
            ));
        }

        let session_id = match self.state.get_active_session().await {
            Some(id) => id,
            None => {
                let session = self.sessions.create_session(&session_name(text)).await?;
                let id = session
                    .id
                    .ok_or_else(|| GraphChatError::backend("created session carried no id"))?;
                self.state.set_active_session(id.clone()).await?;
                id
            }
        };

        self.emit(ChatEvent::Question(MessageView {
            role: MessageRole::User,
            payload: text.to_string(),
            session_id: Some(session_id.clone()),
            job_id: None,
            status: JobStatus::Finished,
            thinking: Vec::new(),
            complete: true,
        }));

        let request = ChatRequest {
            instruction_message: InstructionMessage::text(text),
            attached_messages: attachments,
        };
        let message = self.sessions.chat(&session_id, request).await?;
        let job_id = message
            .job_id
            .or(message.id)
            .ok_or_else(|| GraphChatError::backend("chat response carried no job id"))?;

        self.start_polling(job_id.clone()).await;
        Ok(job_id)
    }

    /// Requests a stop of the in-flight job.
    ///
    /// Sets the persisted flag (so the request outlives whichever control
    /// triggered it) and cancels the active poll loop's token. A stop with
    /// no job in flight is a no-op; setting the flag then would strand it
    /// and kill the next job instead.
    pub async fn stop(&self) -> Result<()> {
        let active = self.active.read().await;
        let Some(active_job) = active.as_ref() else {
            tracing::debug!("[ChatUseCase] stop requested with no job in flight");
            return Ok(());
        };
        self.state.request_stop().await?;
        active_job.cancel.cancel();
        Ok(())
    }

    /// Selects a prior session and returns its seeded message list.
    ///
    /// History is terminal, so no poll loop is started; any loop still
    /// running for the previous session is cancelled and its late updates
    /// are discarded by the job-id filter.
    pub async fn select_session(&self, session_id: &str) -> Result<Vec<MessageView>> {
        self.cancel_active().await;

        let session = self.sessions.get_session(session_id).await?;
        let id = session
            .id
            .ok_or_else(|| GraphChatError::not_found("Session", session_id))?;
        self.state.set_active_session(id.clone()).await?;

        let records = self.sessions.session_messages(&id).await?;
        Ok(history_views(&records))
    }

    /// Starts a fresh conversation: the next submission creates a session.
    pub async fn new_conversation(&self) -> Result<()> {
        self.cancel_active().await;
        self.state.clear_active_session().await
    }

    /// Restores the last selected session on launch, if one is persisted.
    pub async fn restore_session(&self) -> Result<Option<(String, Vec<MessageView>)>> {
        let Some(session_id) = self.state.get_active_session().await else {
            return Ok(None);
        };

        match self.select_session(&session_id).await {
            Ok(views) => Ok(Some((session_id, views))),
            Err(e) if e.is_not_found() => {
                // The session is gone (deleted elsewhere); forget it.
                self.state.clear_active_session().await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// The most recent sessions, newest first.
    pub async fn list_sessions(&self) -> Result<Vec<SessionItem>> {
        let sessions = self.sessions.list_sessions(1, SESSION_PAGE_SIZE).await?;
        Ok(session_items(&sessions))
    }

    pub async fn rename_session(&self, session_id: &str, name: &str) -> Result<()> {
        self.sessions.rename_session(session_id, name).await?;
        Ok(())
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.sessions.delete_session(session_id).await?;
        if self.state.get_active_session().await.as_deref() == Some(session_id) {
            self.cancel_active().await;
            self.state.clear_active_session().await?;
        }
        Ok(())
    }

    /// Whether the UI should offer a "continue" action: only when the last
    /// entry in the list is a user-stopped answer.
    pub fn can_continue(messages: &[MessageView]) -> bool {
        messages
            .last()
            .is_some_and(|view| view.status == JobStatus::Stopped)
    }

    async fn start_polling(&self, job_id: String) {
        let cancel = CancellationToken::new();
        {
            let mut active = self.active.write().await;
            *active = Some(ActiveJob {
                job_id: job_id.clone(),
                cancel: cancel.clone(),
            });
        }

        let poller = JobPoller::new(
            self.jobs.clone(),
            self.state.clone(),
            self.poller_config.clone(),
        );
        let active = self.active.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let (updates_tx, mut updates_rx) = mpsc::unbounded_channel::<JobUpdate>();

            let loop_handle = {
                let poller = poller.clone();
                let job_id = job_id.clone();
                tokio::spawn(async move { poller.run(&job_id, cancel, updates_tx).await })
            };

            while let Some(update) = updates_rx.recv().await {
                // Discard late updates from a loop whose job is no longer
                // active (the user switched sessions mid-poll).
                let is_current = active
                    .read()
                    .await
                    .as_ref()
                    .is_some_and(|a| a.job_id == update.job_id);
                if !is_current {
                    tracing::debug!(
                        "[ChatUseCase] discarding stale update for job {}",
                        update.job_id
                    );
                    continue;
                }
                if update.view.complete {
                    let _ = events.send(ChatEvent::AnswerFinal(update));
                } else {
                    let _ = events.send(ChatEvent::AnswerUpdate(update));
                }
            }

            let _ = loop_handle.await;

            // Release the in-flight guard if it is still ours.
            let mut active = active.write().await;
            if active.as_ref().is_some_and(|a| a.job_id == job_id) {
                *active = None;
            }
        });
    }

    async fn cancel_active(&self) {
        let mut active = self.active.write().await;
        if let Some(active_job) = active.take() {
            tracing::debug!(
                "[ChatUseCase] cancelling poll loop for job {}",
                active_job.job_id
            );
            active_job.cancel.cancel();
        }
    }

    fn emit(&self, event: ChatEvent) {
        let _ = self.events.send(event);
    }
}

/// Derives a session name from the first submission, original casing kept.
fn session_name(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= SESSION_NAME_LIMIT {
        return trimmed.to_string();
    }
    trimmed.chars().take(SESSION_NAME_LIMIT).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphchat_core::job::{ChatMessage, JobMetrics, JobRecord, JobResult, QuestionRecord};
    use graphchat_core::session::Session;
    use graphchat_core::state::ClientState;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct MockSessionApi {
        created: Mutex<Vec<String>>,
        chat_requests: Mutex<Vec<ChatRequest>>,
        history: Mutex<Vec<JobRecord>>,
    }

    #[async_trait::async_trait]
    impl SessionApi for MockSessionApi {
        async fn list_sessions(&self, _page: u32, _size: u32) -> Result<Vec<Session>> {
            Ok(vec![
                Session {
                    id: Some("old".to_string()),
                    name: Some("older chat".to_string()),
                    ..Default::default()
                },
                Session {
                    id: Some("new".to_string()),
                    name: Some("newer chat".to_string()),
                    ..Default::default()
                },
            ])
        }

        async fn create_session(&self, name: &str) -> Result<Session> {
            self.created.lock().unwrap().push(name.to_string());
            Ok(Session {
                id: Some("s-created".to_string()),
                name: Some(name.to_string()),
                ..Default::default()
            })
        }

        async fn get_session(&self, session_id: &str) -> Result<Session> {
            if session_id == "missing" {
                return Err(GraphChatError::not_found("Session", session_id));
            }
            Ok(Session {
                id: Some(session_id.to_string()),
                ..Default::default()
            })
        }

        async fn rename_session(&self, session_id: &str, name: &str) -> Result<Session> {
            Ok(Session {
                id: Some(session_id.to_string()),
                name: Some(name.to_string()),
                ..Default::default()
            })
        }

        async fn delete_session(&self, _session_id: &str) -> Result<()> {
            Ok(())
        }

        async fn chat(&self, _session_id: &str, request: ChatRequest) -> Result<ChatMessage> {
            self.chat_requests.lock().unwrap().push(request);
            Ok(ChatMessage {
                job_id: Some("j-1".to_string()),
                ..Default::default()
            })
        }

        async fn session_messages(&self, _session_id: &str) -> Result<Vec<JobRecord>> {
            Ok(self.history.lock().unwrap().clone())
        }

        async fn latest_job_id(&self, _session_id: &str) -> Result<Option<String>> {
            Ok(None)
        }
    }

    struct FinishedJobApi;

    #[async_trait::async_trait]
    impl JobApi for FinishedJobApi {
        async fn job_result(&self, job_id: &str) -> Result<JobResult> {
            Ok(JobResult {
                message: Some(ChatMessage {
                    payload: Some("answer".to_string()),
                    job_id: Some(job_id.to_string()),
                    ..Default::default()
                }),
                metrics: Some(JobMetrics {
                    status: Some(JobStatus::Finished),
                    ..Default::default()
                }),
                thinking: Vec::new(),
            })
        }
    }

    /// Never finishes; keeps the in-flight guard held.
    struct RunningJobApi;

    #[async_trait::async_trait]
    impl JobApi for RunningJobApi {
        async fn job_result(&self, _job_id: &str) -> Result<JobResult> {
            Ok(JobResult {
                metrics: Some(JobMetrics {
                    status: Some(JobStatus::Running),
                    ..Default::default()
                }),
                ..Default::default()
            })
        }
    }

    #[derive(Default)]
    struct MemoryStateRepository {
        state: Mutex<ClientState>,
    }

    #[async_trait::async_trait]
    impl StateRepository for MemoryStateRepository {
        async fn save_state(&self, state: ClientState) -> Result<()> {
            *self.state.lock().unwrap() = state;
            Ok(())
        }

        async fn get_state(&self) -> Result<ClientState> {
            Ok(self.state.lock().unwrap().clone())
        }

        async fn request_stop(&self) -> Result<()> {
            self.state.lock().unwrap().stop_requested = true;
            Ok(())
        }

        async fn take_stop_flag(&self) -> Result<bool> {
            let mut state = self.state.lock().unwrap();
            let requested = state.stop_requested;
            state.stop_requested = false;
            Ok(requested)
        }

        async fn get_active_session(&self) -> Option<String> {
            self.state.lock().unwrap().active_session_id.clone()
        }

        async fn set_active_session(&self, session_id: String) -> Result<()> {
            self.state.lock().unwrap().active_session_id = Some(session_id);
            Ok(())
        }

        async fn clear_active_session(&self) -> Result<()> {
            self.state.lock().unwrap().active_session_id = None;
            Ok(())
        }
    }

    fn fast_config() -> PollerConfig {
        PollerConfig {
            interval: Duration::from_millis(1),
            max_transient_retries: 1,
            max_cycles: 50,
        }
    }

    fn usecase(
        sessions: Arc<MockSessionApi>,
        jobs: Arc<dyn JobApi>,
    ) -> (ChatUseCase, mpsc::UnboundedReceiver<ChatEvent>) {
        ChatUseCase::new(
            sessions,
            jobs,
            Arc::new(MemoryStateRepository::default()),
            fast_config(),
        )
    }

    #[tokio::test]
    async fn test_submit_creates_session_and_polls_to_completion() {
        let sessions = Arc::new(MockSessionApi::default());
        let (usecase, mut events) = usecase(sessions.clone(), Arc::new(FinishedJobApi));

        let job_id = usecase.submit("what is a graph?", Vec::new()).await.unwrap();
        assert_eq!(job_id, "j-1");
        assert_eq!(sessions.created.lock().unwrap().as_slice(), ["what is a graph?"]);

        let question = events.recv().await.unwrap();
        let ChatEvent::Question(view) = question else {
            panic!("expected question first");
        };
        assert_eq!(view.role, MessageRole::User);
        assert_eq!(view.payload, "what is a graph?");

        let final_event = events.recv().await.unwrap();
        let ChatEvent::AnswerFinal(update) = final_event else {
            panic!("expected terminal answer");
        };
        assert_eq!(update.view.status, JobStatus::Finished);
        assert_eq!(update.view.payload, "answer");
    }

    #[tokio::test]
    async fn test_submit_reuses_active_session() {
        let sessions = Arc::new(MockSessionApi::default());
        let state = Arc::new(MemoryStateRepository::default());
        state.set_active_session("s-existing".to_string()).await.unwrap();

        let (usecase, _events) = ChatUseCase::new(
            sessions.clone(),
            Arc::new(FinishedJobApi),
            state,
            fast_config(),
        );

        usecase.submit("follow-up", Vec::new()).await.unwrap();
        assert!(sessions.created.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_attachments_are_plumbed_into_the_request() {
        let sessions = Arc::new(MockSessionApi::default());
        let (usecase, _events) = usecase(sessions.clone(), Arc::new(FinishedJobApi));

        let attachments = vec![AttachedMessage {
            file_id: "f-1".to_string(),
            message_type: "FILE".to_string(),
        }];
        usecase.submit("summarize the file", attachments).await.unwrap();

        let requests = sessions.chat_requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].attached_messages.len(), 1);
        assert_eq!(requests[0].attached_messages[0].file_id, "f-1");
        assert_eq!(requests[0].instruction_message.payload, "summarize the file");
    }

    #[tokio::test]
    async fn test_second_submit_is_rejected_while_job_in_flight() {
        let sessions = Arc::new(MockSessionApi::default());
        let (usecase, _events) = usecase(sessions, Arc::new(RunningJobApi));

        usecase.submit("first", Vec::new()).await.unwrap();
        let err = usecase.submit("second", Vec::new()).await.unwrap_err();
        assert!(matches!(err, GraphChatError::Execution(_)));

        usecase.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_select_session_seeds_history_without_polling() {
        let sessions = Arc::new(MockSessionApi::default());
        *sessions.history.lock().unwrap() = vec![JobRecord {
            question: Some(QuestionRecord {
                message: Some(ChatMessage {
                    payload: Some("old question".to_string()),
                    ..Default::default()
                }),
            }),
            answer: Some(JobResult {
                message: Some(ChatMessage {
                    payload: Some("old answer".to_string()),
                    ..Default::default()
                }),
                metrics: Some(JobMetrics {
                    status: Some(JobStatus::Finished),
                    ..Default::default()
                }),
                thinking: Vec::new(),
            }),
        }];

        let (usecase, mut events) = usecase(sessions, Arc::new(FinishedJobApi));
        let views = usecase.select_session("s-old").await.unwrap();

        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.complete));
        // Seeding history emits no poll events.
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_list_sessions_newest_first() {
        let sessions = Arc::new(MockSessionApi::default());
        let (usecase, _events) = usecase(sessions, Arc::new(FinishedJobApi));

        let items = usecase.list_sessions().await.unwrap();
        assert_eq!(items[0].id, "new");
        assert_eq!(items[1].id, "old");
    }

    #[tokio::test]
    async fn test_restore_session_clears_deleted_sessions() {
        let sessions = Arc::new(MockSessionApi::default());
        let state = Arc::new(MemoryStateRepository::default());
        state.set_active_session("missing".to_string()).await.unwrap();

        let (usecase, _events) = ChatUseCase::new(
            sessions,
            Arc::new(FinishedJobApi),
            state.clone(),
            fast_config(),
        );

        let restored = usecase.restore_session().await.unwrap();
        assert!(restored.is_none());
        assert!(state.get_active_session().await.is_none());
    }

    #[tokio::test]
    async fn test_stop_without_active_job_leaves_flag_clear() {
        let sessions = Arc::new(MockSessionApi::default());
        let state = Arc::new(MemoryStateRepository::default());
        let (usecase, _events) = ChatUseCase::new(
            sessions,
            Arc::new(FinishedJobApi),
            state.clone(),
            fast_config(),
        );

        usecase.stop().await.unwrap();
        assert!(!state.get_state().await.unwrap().stop_requested);
    }

    #[tokio::test]
    async fn test_stop_produces_stop_sentinel_event() {
        let sessions = Arc::new(MockSessionApi::default());
        let (usecase, mut events) = usecase(sessions, Arc::new(RunningJobApi));

        usecase.submit("long question", Vec::new()).await.unwrap();

        // Skip the locally echoed question, then wait for the first poll
        // update before stopping.
        let _question = events.recv().await.unwrap();
        let _first_update = events.recv().await.unwrap();
        usecase.stop().await.unwrap();

        loop {
            match events.recv().await.unwrap() {
                ChatEvent::AnswerFinal(update) => {
                    assert_eq!(update.view.status, JobStatus::Stopped);
                    assert_eq!(update.view.payload, "STOP");
                    break;
                }
                ChatEvent::AnswerUpdate(_) => continue,
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[test]
    fn test_can_continue_only_after_stopped_tail() {
        let stopped = MessageView {
            role: MessageRole::Assistant,
            payload: "STOP".to_string(),
            session_id: None,
            job_id: None,
            status: JobStatus::Stopped,
            thinking: Vec::new(),
            complete: true,
        };
        let finished = MessageView {
            status: JobStatus::Finished,
            ..stopped.clone()
        };

        assert!(ChatUseCase::can_continue(&[finished.clone(), stopped.clone()]));
        assert!(!ChatUseCase::can_continue(&[stopped, finished]));
        assert!(!ChatUseCase::can_continue(&[]));
    }

    #[test]
    fn test_session_name_truncates_on_char_boundary() {
        assert_eq!(session_name("short prompt"), "short prompt");
        let long = "a".repeat(40);
        assert_eq!(session_name(&long).chars().count(), 30);
    }
}
