//! File-backed infrastructure for graphchat.
//!
//! Persists the small client state (stop flag, last selected session) that
//! must outlive both individual components and the process itself.

pub mod paths;
pub mod state_file;
pub mod state_repository;

pub use state_repository::FileStateRepository;
