// src/utils/logging.rs
use tracing_subscriber::{fmt, EnvFilter};

/// Filter used when `RUST_LOG` is unset. Verbose runs log pipeline detail
/// (page loads, item counts, coercion drops) for this crate only.
fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "info,carrier_scraper=debug"
    } else {
        "info"
    }
}

/// Installs the global subscriber. `RUST_LOG` wins over `verbose`.
///
/// Everything goes to stderr; stdout is reserved for the scraped JSON.
pub fn setup_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .init();

    tracing::debug!("Logging to stderr (verbose: {})", verbose);
}
