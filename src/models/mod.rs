// src/models/mod.rs
pub mod output;
pub mod page;
pub mod records;

pub use output::{CarrierOutput, OutputData, OutputRecord, ScrapeTarget, SegmentFailure};
pub use page::{HtmlSegment, ParsedData, ParsedField, ParsedPage};
pub use records::{Agent, Customer, DomainRecord, Policy, RecordKind};
