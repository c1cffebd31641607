//! Application layer: the poll loop and the chat use case that wires it to
//! the backend API traits and persisted client state.

pub mod chat_usecase;
pub mod poller;

pub use chat_usecase::{ChatEvent, ChatUseCase};
pub use poller::{JobPoller, JobUpdate, PollerConfig};
