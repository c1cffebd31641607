//! Atomic persistence of the client state file.
//!
//! Writes go through a temporary file, fsync and rename, under an exclusive
//! lock, so a concurrent client process never observes a torn state file.

use fs2::FileExt;
use graphchat_core::error::{GraphChatError, Result};
use graphchat_core::state::ClientState;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

/// Handle to the on-disk client state file.
pub struct StateFile {
    path: PathBuf,
}

impl StateFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Loads the persisted state.
    ///
    /// A missing or empty file reads as the default state rather than an
    /// error; first launch has nothing on disk yet.
    pub fn load(&self) -> Result<ClientState> {
        if !self.path.exists() {
            return Ok(ClientState::default());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(ClientState::default());
        }

        Ok(toml::from_str(&content)?)
    }

    /// Saves the state atomically: tmp file, fsync, rename.
    pub fn save(&self, state: &ClientState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let _lock = FileLock::acquire(&self.path)?;

        let serialized = toml::to_string_pretty(state)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(serialized.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| GraphChatError::state("state path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| GraphChatError::state("state path has no file name"))?;
        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

/// Exclusive lock guard for the state file, released on drop.
struct FileLock {
    #[allow(dead_code)]
    file: File,
    lock_path: PathBuf,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self> {
        let lock_path = path.with_extension("lock");

        if let Some(parent) = lock_path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()
            .map_err(|e| GraphChatError::state(format!("failed to acquire state lock: {e}")))?;

        Ok(FileLock { file, lock_path })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        // Unlock is automatic when the file handle is dropped
        let _ = fs::remove_file(&self.lock_path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_default() {
        let temp_dir = TempDir::new().unwrap();
        let state_file = StateFile::new(temp_dir.path().join("state.toml"));

        let state = state_file.load().unwrap();
        assert_eq!(state, ClientState::default());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let state_file = StateFile::new(temp_dir.path().join("state.toml"));

        let state = ClientState {
            stop_requested: true,
            active_session_id: Some("s-42".to_string()),
        };
        state_file.save(&state).unwrap();

        let loaded = state_file.load().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("state.toml");
        let state_file = StateFile::new(path.clone());

        state_file.save(&ClientState::default()).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join(".state.toml.tmp").exists());
    }
}
