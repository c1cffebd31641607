pub mod api;
pub mod model;

pub use api::GraphDbApi;
pub use model::{GraphDb, GraphDbSpec};
