// src/main.rs
use std::path::PathBuf;
use std::time::Duration;

use carrier_scraper::config::{self, ScrapeConfig, DEFAULT_MAX_PAGES, DEFAULT_USER_AGENT};
use carrier_scraper::pipeline::partition;
use carrier_scraper::storage::OutputWriter;
use carrier_scraper::template::Carrier;
use carrier_scraper::utils::{self, AppError};
use carrier_scraper::{HttpFetcher, ScrapeTarget, Scraper, TemplateRegistry};
use clap::Parser;

/// Command Line Interface for the carrier scraper
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file listing targets: {"input": [{"carrier": ..., "customerId": ...}]}
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Extra target as CARRIER:ID (repeatable)
    #[arg(short, long = "target", value_parser = config::parse_target)]
    targets: Vec<ScrapeTarget>,

    /// Override a carrier's base url as CARRIER=URL (repeatable)
    #[arg(long = "base-url", value_parser = config::parse_base_url)]
    base_urls: Vec<(Carrier, String)>,

    /// Maximum pages followed per paginated section
    #[arg(long, env = "CARRIER_SCRAPER_MAX_PAGES", default_value_t = DEFAULT_MAX_PAGES)]
    max_pages: usize,

    /// Per-request timeout in seconds (no timeout when omitted)
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// User-Agent header sent to carrier sites
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Output directory for the JSON result (stdout only when omitted)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Debug mode - save every loaded HTML segment under <output-dir>/debug
    #[arg(short, long)]
    debug: bool,

    /// Log pipeline detail for this crate when RUST_LOG is unset
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Parse CLI Arguments
    let args = Args::parse();

    // 2. Setup Logging (RUST_LOG overrides --verbose)
    utils::logging::setup_logging(args.verbose);
    tracing::debug!("Starting with args: {:?}", args);

    // 3. Collect targets
    let mut targets = match &args.input {
        Some(path) => config::load_targets(path)?,
        None => Vec::new(),
    };
    targets.extend(args.targets.iter().cloned());
    if targets.is_empty() {
        return Err(AppError::Config("No targets given; use --input or --target".to_string()));
    }

    // 4. Templates and overrides
    let mut registry = TemplateRegistry::builtin();
    for (carrier, url) in &args.base_urls {
        registry.set_base_url(*carrier, url)?;
    }
    let carriers: Vec<_> = registry.carriers().map(|c| c.as_str()).collect();
    tracing::debug!("Registered carriers: {}", carriers.join(", "));

    // 5. Build the pipeline
    let scrape_config = ScrapeConfig {
        max_pages: args.max_pages,
        user_agent: args.user_agent.clone(),
        request_timeout: args.timeout_secs.map(Duration::from_secs),
    };
    let fetcher = HttpFetcher::new(&scrape_config)?;
    let writer = args.output_dir.as_ref().map(OutputWriter::new).transpose()?;

    let mut scraper = Scraper::new(registry, fetcher, scrape_config);
    if args.debug {
        match &writer {
            Some(writer) => scraper = scraper.with_segment_writer(writer.clone()),
            None => tracing::warn!("--debug has no effect without --output-dir"),
        }
    }

    // 6. Scrape every target
    tracing::info!("Scraping {} targets", targets.len());
    let results = scraper.scrape(&targets).await;
    let (outputs, errors) = partition(results);

    // 7. Emit results
    let json = serde_json::to_string_pretty(&outputs)
        .map_err(|e| AppError::Processing(format!("Failed to serialize output: {}", e)))?;
    println!("{}", json);

    if let Some(writer) = &writer {
        match writer.save_output(&outputs) {
            Ok(path) => tracing::info!("Saved output to: {}", path.display()),
            Err(e) => tracing::error!("Failed to save output: {}", e),
        }
    }

    tracing::info!("Processing finished. Success: {}, Failures: {}", outputs.len(), errors.len());

    if outputs.is_empty() && !errors.is_empty() {
        return Err(AppError::Processing(format!("All {} targets failed", errors.len())));
    }

    Ok(())
}
