pub mod api;
pub mod model;

pub use api::KnowledgebaseApi;
pub use model::{FileRecord, Knowledgebase, KnowledgebaseCatalog};
