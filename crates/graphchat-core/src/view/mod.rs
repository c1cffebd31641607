//! View model: flat, render-ready records derived from raw job results.

pub mod model;
pub mod transform;

pub use model::{MessageRole, MessageView, SessionItem};
pub use transform::{history_views, message_view, session_items};
