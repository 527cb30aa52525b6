//! Structure templates: file format, anchor indexing and caching

pub mod format;
pub mod indexer;
pub mod cache;

pub use cache::TemplateCache;
pub use format::TemplateFile;
pub use indexer::{Template, index};
