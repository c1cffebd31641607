//! Client state repository trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::state::model::ClientState;

/// Repository for persisted client state.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Saves the full client state.
    async fn save_state(&self, state: ClientState) -> Result<()>;

    async fn get_state(&self) -> Result<ClientState>;

    /// Requests that the active poll loop stop.
    async fn request_stop(&self) -> Result<()>;

    /// Consumes the stop flag: returns its value and clears it in the same
    /// operation.
    ///
    /// The clear must be atomic with the read, so a stop aimed at one job can
    /// never leak into a poller started afterwards.
    async fn take_stop_flag(&self) -> Result<bool>;

    async fn get_active_session(&self) -> Option<String>;

    async fn set_active_session(&self, session_id: String) -> Result<()>;

    async fn clear_active_session(&self) -> Result<()>;
}
