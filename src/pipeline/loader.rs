// src/pipeline/loader.rs
use std::collections::HashSet;

use reqwest::Url;
use scraper::Html;

use crate::extractors::Query;
use crate::fetch::PageFetcher;
use crate::models::HtmlSegment;
use crate::template::{SectionKey, TemplateRegistry};
use crate::utils::error::{FetchError, ScrapeError};

/// Fetches a section's pages and cuts out the section root of each.
///
/// Holds only borrowed, read-only context; every `load` call is independent.
pub struct PageLoader<'a, F> {
    registry: &'a TemplateRegistry,
    fetcher: &'a F,
    max_pages: usize,
}

/// What the loader keeps from one fetched page.
struct PageContent {
    root_html: String,
    next_href: Option<String>,
}

impl<'a, F: PageFetcher> PageLoader<'a, F> {
    pub fn new(registry: &'a TemplateRegistry, fetcher: &'a F, max_pages: usize) -> Self {
        Self {
            registry,
            fetcher,
            max_pages: max_pages.max(1),
        }
    }

    /// Loads every page of `section` for `entity_id`, in page order.
    ///
    /// A fetch failure on any page fails the whole section. Pagination stops
    /// when no next link is found, when a link points at a page already
    /// fetched, or after `max_pages` pages.
    pub async fn load(
        &self,
        carrier_id: &str,
        section: SectionKey,
        entity_id: &str,
    ) -> Result<Vec<HtmlSegment>, ScrapeError> {
        let template = self.registry.lookup(carrier_id)?;
        let schema = template.schema(section)?;

        let root = Query::parse(&schema.root_selector)?;
        let next = match (schema.is_paginated, schema.page_selector.as_deref()) {
            (true, Some(selector)) => Some(Query::parse(selector)?),
            (true, None) => {
                return Err(ScrapeError::InvalidTemplate {
                    carrier: template.carrier,
                    reason: format!("{} is paginated but declares no page selector", section),
                })
            }
            (false, _) => None,
        };

        let mut url = section_url(&template.base_url, &schema.url, entity_id)?;
        let mut visited = HashSet::new();
        let mut segments = Vec::new();

        loop {
            visited.insert(url.to_string());
            tracing::info!("Loading {} {} page {}: {}", template.carrier, section, segments.len(), url);

            let body = self.fetcher.fetch(url.as_str()).await?;
            let content = read_page(&body, &root, next.as_ref());
            if content.root_html.is_empty() {
                tracing::debug!("No '{}' root on {}", root.source(), url);
            }

            segments.push(HtmlSegment {
                carrier: template.carrier,
                section,
                html: content.root_html,
                page: segments.len(),
            });

            let Some(href) = content.next_href else {
                break;
            };
            if segments.len() >= self.max_pages {
                tracing::warn!(
                    "Stopping {} {} pagination at the {} page limit",
                    template.carrier,
                    section,
                    self.max_pages
                );
                break;
            }
            let next_url = resolve_link(&template.base_url, &href)?;
            if visited.contains(next_url.as_str()) {
                tracing::warn!("Next link {} was already fetched, stopping pagination", next_url);
                break;
            }
            url = next_url;
        }

        tracing::debug!("Loaded {} pages for {} {}", segments.len(), template.carrier, section);
        Ok(segments)
    }
}

/// Builds the first URL of a section: base url, path, `:id` substituted.
pub fn section_url(base_url: &str, path: &str, entity_id: &str) -> Result<Url, FetchError> {
    let raw = format!("{}{}", base_url.trim_end_matches('/'), path.replace(":id", entity_id));
    Url::parse(&raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })
}

fn resolve_link(base_url: &str, href: &str) -> Result<Url, FetchError> {
    let invalid = |reason: String| FetchError::InvalidUrl {
        url: href.to_string(),
        reason,
    };
    let base = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    base.join(href).map_err(|e| invalid(e.to_string()))
}

// Sync on purpose: `Html` is not `Send` and must not live across an await.
fn read_page(body: &str, root: &Query, next: Option<&Query>) -> PageContent {
    let document = Html::parse_document(body);
    let context = document.root_element();

    let root_html = root
        .first(context)
        .map(|element| element.inner_html())
        .unwrap_or_default();

    let next_href = next
        .and_then(|query| query.first(context))
        .and_then(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .map(str::to_string);

    PageContent { root_html, next_href }
}
