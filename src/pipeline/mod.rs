// src/pipeline/mod.rs
//! Loader → parser → formatter, driven per target by the orchestrator.
pub mod formatter;
pub mod loader;
pub mod orchestrator;
pub mod parser;

#[cfg(test)]
pub(crate) mod fixtures;

pub use loader::PageLoader;
pub use orchestrator::{partition, record_count, Scraper};
