// src/pipeline/orchestrator.rs
use crate::config::ScrapeConfig;
use crate::fetch::PageFetcher;
use crate::models::{CarrierOutput, HtmlSegment, OutputData, ScrapeTarget};
use crate::pipeline::{formatter, parser, PageLoader};
use crate::storage::OutputWriter;
use crate::template::{SectionKey, TemplateRegistry};
use crate::utils::error::ScrapeError;

/// Drives loader, parser and formatter for a batch of targets.
pub struct Scraper<F> {
    registry: TemplateRegistry,
    fetcher: F,
    config: ScrapeConfig,
    segment_writer: Option<OutputWriter>,
}

impl<F: PageFetcher> Scraper<F> {
    pub fn new(registry: TemplateRegistry, fetcher: F, config: ScrapeConfig) -> Self {
        Self {
            registry,
            fetcher,
            config,
            segment_writer: None,
        }
    }

    /// Dumps every loaded segment through `writer` for debugging.
    pub fn with_segment_writer(mut self, writer: OutputWriter) -> Self {
        self.segment_writer = Some(writer);
        self
    }

    /// Scrapes each target in order. A failing target yields its error without
    /// affecting the others.
    pub async fn scrape(&self, targets: &[ScrapeTarget]) -> Vec<Result<CarrierOutput, ScrapeError>> {
        let mut results = Vec::with_capacity(targets.len());
        for target in targets {
            tracing::info!("Scraping {} for {}", target.carrier, target.entity_id);
            let result = self.scrape_target(target).await;
            match &result {
                Ok(output) if output.failures.is_empty() => {
                    tracing::info!("Finished {} for {}", target.carrier, target.entity_id)
                }
                Ok(output) => tracing::warn!(
                    "Finished {} for {} with {} failures",
                    target.carrier,
                    target.entity_id,
                    output.failures.len()
                ),
                Err(e) => tracing::error!("Failed to scrape {} for {}: {}", target.carrier, target.entity_id, e),
            }
            results.push(result);
        }
        results
    }

    async fn scrape_target(&self, target: &ScrapeTarget) -> Result<CarrierOutput, ScrapeError> {
        let template = self.registry.lookup(&target.carrier)?;
        let loader = PageLoader::new(&self.registry, &self.fetcher, self.config.max_pages);
        let mut output = CarrierOutput::new(template.carrier, &template.sections);

        for &section in &template.sections {
            let schema = template.schema(section)?;

            let segments = match loader.load(&target.carrier, section, &target.entity_id).await {
                Ok(segments) => segments,
                Err(ScrapeError::Fetch(e)) => {
                    tracing::error!("Failed to load {} {}: {}", template.carrier, section, e);
                    output.record_failure(section, None, e.to_string());
                    continue;
                }
                Err(e) => return Err(e),
            };

            let mut parsed = Vec::with_capacity(segments.len());
            for segment in &segments {
                self.dump_segment(segment);
                match parser::parse(segment, schema) {
                    Ok(page) => parsed.push(page),
                    Err(e) => {
                        tracing::warn!(
                            "Skipping {} {} page {}: {}",
                            template.carrier,
                            section,
                            segment.page,
                            e
                        );
                        output.record_failure(section, Some(segment.page), e.to_string());
                    }
                }
            }

            let records = formatter::format(&parsed, schema, schema.is_list());
            tracing::debug!("{} {}: {} output records", template.carrier, section, records.len());
            output.extend_section(section, records);
        }

        Ok(output)
    }

    fn dump_segment(&self, segment: &HtmlSegment) {
        if let Some(writer) = &self.segment_writer {
            if let Err(e) = writer.save_segment(segment) {
                tracing::warn!("Failed to save debug segment: {}", e);
            }
        }
    }
}

/// Splits scrape results into outputs and per-target errors.
pub fn partition(
    results: Vec<Result<CarrierOutput, ScrapeError>>,
) -> (Vec<CarrierOutput>, Vec<ScrapeError>) {
    let mut outputs = Vec::new();
    let mut errors = Vec::new();
    for result in results {
        match result {
            Ok(output) => outputs.push(output),
            Err(e) => errors.push(e),
        }
    }
    (outputs, errors)
}

/// Total number of output records gathered for a section.
pub fn record_count(output: &CarrierOutput, section: SectionKey) -> usize {
    output
        .section(section)
        .unwrap_or_default()
        .iter()
        .map(|entry| match &entry.data {
            OutputData::List(records) => records.len(),
            OutputData::Record(_) => 1,
        })
        .sum()
}
