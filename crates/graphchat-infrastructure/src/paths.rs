//! Path management for graphchat client files.
//!
//! All client-local files live under a single directory:
//!
//! ```text
//! ~/.graphchat/
//! └── state.toml    # persisted client state
//! ```

use graphchat_core::error::{GraphChatError, Result};
use std::path::PathBuf;

const APP_DIR: &str = ".graphchat";
const STATE_FILE: &str = "state.toml";

/// Unified path resolution for graphchat.
pub struct GraphChatPaths;

impl GraphChatPaths {
    /// Returns the graphchat directory under the user's home.
    pub fn app_dir() -> Result<PathBuf> {
        dirs::home_dir()
            .map(|home| home.join(APP_DIR))
            .ok_or_else(|| GraphChatError::config("cannot determine home directory"))
    }

    /// Returns the path of the persisted client state file.
    pub fn state_file() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join(STATE_FILE))
    }
}
