// src/models/page.rs
use serde::Serialize;

use crate::template::{Carrier, SectionKey};

/// The root fragment of one fetched page, handed from the loader to the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HtmlSegment {
    pub carrier: Carrier,
    pub section: SectionKey,
    /// Inner HTML of the section root; empty when the root was not on the page.
    pub html: String,
    /// Zero-based page index.
    pub page: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedField {
    pub name: String,
    pub value: Option<String>,
}

impl ParsedField {
    pub fn new(name: &str, value: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            value: value.map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParsedData {
    Record(Vec<ParsedField>),
    List(Vec<Vec<ParsedField>>),
}

/// Normalized field values pulled from one segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedPage {
    pub carrier: Carrier,
    pub section: SectionKey,
    pub page: usize,
    pub data: ParsedData,
}
