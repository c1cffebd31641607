//! File-backed client state repository.

use crate::paths::GraphChatPaths;
use crate::state_file::StateFile;
use graphchat_core::error::{GraphChatError, Result};
use graphchat_core::state::{ClientState, StateRepository};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Client state repository persisting to `~/.graphchat/state.toml`.
///
/// State is cached in memory and written through on every mutation. All
/// mutations run under one async mutex, which is what makes
/// [`take_stop_flag`](StateRepository::take_stop_flag) an atomic
/// read-and-clear from the poll loop's point of view.
#[derive(Clone)]
pub struct FileStateRepository {
    state: Arc<Mutex<ClientState>>,
    file: Arc<StateFile>,
}

impl FileStateRepository {
    /// Creates a repository over the default state file location.
    pub fn new() -> Result<Self> {
        Self::with_path(GraphChatPaths::state_file()?)
    }

    /// Creates a repository over an explicit state file path.
    pub fn with_path(path: PathBuf) -> Result<Self> {
        let file = StateFile::new(path);
        let initial = file.load()?;

        Ok(Self {
            state: Arc::new(Mutex::new(initial)),
            file: Arc::new(file),
        })
    }

    async fn persist(&self, state: ClientState) -> Result<()> {
        let file = self.file.clone();
        tokio::task::spawn_blocking(move || file.save(&state))
            .await
            .map_err(|e| GraphChatError::internal(format!("state save task failed: {e}")))?
    }
}

#[async_trait::async_trait]
impl StateRepository for FileStateRepository {
    async fn save_state(&self, state: ClientState) -> Result<()> {
        {
            let mut cached = self.state.lock().await;
            *cached = state.clone();
        }
        self.persist(state).await
    }

    async fn get_state(&self) -> Result<ClientState> {
        Ok(self.state.lock().await.clone())
    }

    async fn request_stop(&self) -> Result<()> {
        tracing::debug!("[FileStateRepository] stop requested");
        let state = {
            let mut cached = self.state.lock().await;
            cached.stop_requested = true;
            cached.clone()
        };
        self.persist(state).await
    }

    async fn take_stop_flag(&self) -> Result<bool> {
        // Read and clear under one lock so a stop aimed at the current job
        // cannot linger and kill the next one.
        let (requested, state) = {
            let mut cached = self.state.lock().await;
            let requested = cached.stop_requested;
            cached.stop_requested = false;
            (requested, cached.clone())
        };

        if requested {
            self.persist(state).await?;
        }
        Ok(requested)
    }

    async fn get_active_session(&self) -> Option<String> {
        self.state.lock().await.active_session_id.clone()
    }

    async fn set_active_session(&self, session_id: String) -> Result<()> {
        let state = {
            let mut cached = self.state.lock().await;
            cached.active_session_id = Some(session_id);
            cached.clone()
        };
        self.persist(state).await
    }

    async fn clear_active_session(&self) -> Result<()> {
        let state = {
            let mut cached = self.state.lock().await;
            cached.active_session_id = None;
            cached.clone()
        };
        self.persist(state).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repository(temp_dir: &TempDir) -> FileStateRepository {
        FileStateRepository::with_path(temp_dir.path().join("state.toml")).unwrap()
    }

    #[tokio::test]
    async fn test_take_stop_flag_clears_it() {
        let temp_dir = TempDir::new().unwrap();
        let repo = repository(&temp_dir);

        repo.request_stop().await.unwrap();
        assert!(repo.take_stop_flag().await.unwrap());
        // Consumed: a second read sees it cleared.
        assert!(!repo.take_stop_flag().await.unwrap());
    }

    #[tokio::test]
    async fn test_stop_flag_survives_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.toml");

        let repo = FileStateRepository::with_path(path.clone()).unwrap();
        repo.request_stop().await.unwrap();

        // A fresh repository over the same file observes the pending stop.
        let reloaded = FileStateRepository::with_path(path).unwrap();
        assert!(reloaded.take_stop_flag().await.unwrap());
    }

    #[tokio::test]
    async fn test_active_session_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let repo = repository(&temp_dir);

        assert!(repo.get_active_session().await.is_none());
        repo.set_active_session("s-1".to_string()).await.unwrap();
        assert_eq!(repo.get_active_session().await.as_deref(), Some("s-1"));

        repo.clear_active_session().await.unwrap();
        assert!(repo.get_active_session().await.is_none());
    }
}
