// src/config.rs
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::models::ScrapeTarget;
use crate::template::Carrier;
use crate::utils::error::AppError;

/// Pages followed per section before pagination stops.
pub const DEFAULT_MAX_PAGES: usize = 50;
pub const DEFAULT_USER_AGENT: &str = concat!("carrier_scraper/", env!("CARGO_PKG_VERSION"));

/// Runtime knobs for the fetcher and loader.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub max_pages: usize,
    pub user_agent: String,
    /// No timeout when `None`; a hung fetch then blocks its section.
    pub request_timeout: Option<Duration>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_pages: DEFAULT_MAX_PAGES,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InputFile {
    input: Vec<ScrapeTarget>,
}

/// Reads targets from a JSON file shaped `{"input": [{"carrier", "customerId"}]}`.
pub fn load_targets<P: AsRef<Path>>(path: P) -> Result<Vec<ScrapeTarget>, AppError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)?;
    let file: InputFile = serde_json::from_str(&raw)
        .map_err(|e| AppError::Config(format!("Invalid input file {}: {}", path.display(), e)))?;
    tracing::debug!("Loaded {} targets from {}", file.input.len(), path.display());
    Ok(file.input)
}

/// Parses a `CARRIER:ID` command-line target.
pub fn parse_target(arg: &str) -> Result<ScrapeTarget, String> {
    match arg.split_once(':') {
        Some((carrier, id)) if !carrier.trim().is_empty() && !id.trim().is_empty() => {
            Ok(ScrapeTarget::new(carrier.trim(), id.trim()))
        }
        _ => Err(format!("expected CARRIER:ID, got '{}'", arg)),
    }
}

/// Parses a `CARRIER=URL` base url override.
pub fn parse_base_url(arg: &str) -> Result<(Carrier, String), String> {
    let (carrier, url) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected CARRIER=URL, got '{}'", arg))?;
    let carrier: Carrier = carrier.parse().map_err(|e| format!("{}", e))?;
    reqwest::Url::parse(url.trim()).map_err(|e| format!("invalid url '{}': {}", url, e))?;
    Ok((carrier, url.trim().to_string()))
}
