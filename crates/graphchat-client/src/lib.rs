//! HTTP bindings for the graphchat backend.
//!
//! One [`BackendClient`] implements every API trait from `graphchat-core`
//! against the backend's REST contract; the application layer only ever sees
//! the traits.

pub mod config;
pub mod graphdbs;
pub mod http;
pub mod jobs;
pub mod knowledgebases;
pub mod sessions;

pub use config::ClientConfig;
pub use http::BackendClient;
