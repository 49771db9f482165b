// src/utils/error.rs
use thiserror::Error;

use crate::template::{Carrier, SectionKey};

// Define specific error types for different parts of the pipeline
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Network request failed: {0}")]
    Network(#[from] reqwest::Error), // Automatically convert reqwest errors

    #[error("HTTP error {status} for {url}")]
    Http { status: reqwest::StatusCode, url: String },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("Unknown extraction rule: {0}")]
    UnknownRule(String),

    #[error("Extraction rule '{rule}' could not find marker '{marker}'")]
    MarkerNotFound { rule: String, marker: String },

    #[error("Section {0} has no item selector")]
    NotAList(SectionKey),
}

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Unknown carrier: {0}")]
    UnknownCarrier(String),

    #[error("No template registered for carrier {0}")]
    MissingTemplate(Carrier),

    #[error("Carrier {carrier} has no schema for section {section}")]
    MissingSchema { carrier: Carrier, section: SectionKey },

    #[error("Invalid template for {carrier}: {reason}")]
    InvalidTemplate { carrier: Carrier, reason: String },

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractError),
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error), // Automatically convert IO errors

    #[error("Scrape failed: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Data processing failed: {0}")]
    Processing(String),
}
