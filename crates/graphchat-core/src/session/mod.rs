//! Session domain: conversations that accumulate jobs over time.

pub mod api;
pub mod model;

pub use api::{ChatRequest, InstructionMessage, SessionApi};
pub use model::Session;
