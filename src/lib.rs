// src/lib.rs
//! Template-driven scraping of insurance carrier sites.
//!
//! Each supported carrier has a declarative template mapping agent, customer
//! and policy fields to selectors. [`Scraper::scrape`] loads every page of
//! each enabled section, extracts field values and returns typed records per
//! carrier.
pub mod config;
pub mod extractors;
pub mod fetch;
pub mod models;
pub mod pipeline;
pub mod storage;
pub mod template;
pub mod utils;

pub use config::ScrapeConfig;
pub use fetch::{HttpFetcher, PageFetcher};
pub use models::{CarrierOutput, ScrapeTarget};
pub use pipeline::Scraper;
pub use template::{Carrier, SectionKey, TemplateRegistry};
pub use utils::error::{AppError, ScrapeError};
