// src/extractors/mod.rs
pub mod query;
pub mod rules;

// Re-export key extraction types for convenience
pub use query::Query;
pub use rules::{EndSearch, ExtractRule};
