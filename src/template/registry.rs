// src/template/registry.rs
use std::collections::{BTreeMap, HashMap};

use crate::models::records::RecordKind;
use crate::template::{Carrier, CarrierTemplate, FieldRule, SectionKey, SectionSchema};
use crate::utils::error::ScrapeError;

const DEFAULT_BASE_URL: &str = "https://scraping-interview.onrender.com";

/// Maps carriers to their templates. The single source of truth for selectors
/// and record builders.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<Carrier, CarrierTemplate>,
}

impl TemplateRegistry {
    /// An empty registry. Every carrier lookup fails with `MissingTemplate`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the templates of every supported carrier.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for template in [mock_indemnity(), placeholder_carrier()] {
            registry
                .insert(template)
                .expect("builtin carrier templates must validate");
        }
        registry
    }

    /// Validates and registers a template, replacing any previous one for the carrier.
    pub fn insert(&mut self, template: CarrierTemplate) -> Result<(), ScrapeError> {
        template.validate()?;
        tracing::debug!(
            "Registered template for {} ({} sections)",
            template.carrier,
            template.sections.len()
        );
        self.templates.insert(template.carrier, template);
        Ok(())
    }

    /// Resolves an opaque carrier id to its template.
    pub fn lookup(&self, carrier_id: &str) -> Result<&CarrierTemplate, ScrapeError> {
        let carrier: Carrier = carrier_id.parse()?;
        self.get(carrier)
    }

    pub fn get(&self, carrier: Carrier) -> Result<&CarrierTemplate, ScrapeError> {
        self.templates
            .get(&carrier)
            .ok_or(ScrapeError::MissingTemplate(carrier))
    }

    /// Points a registered carrier at a different host, e.g. a staging mirror.
    pub fn set_base_url(&mut self, carrier: Carrier, base_url: &str) -> Result<(), ScrapeError> {
        let template = self
            .templates
            .get_mut(&carrier)
            .ok_or(ScrapeError::MissingTemplate(carrier))?;
        tracing::info!("Overriding base url for {}: {}", carrier, base_url);
        template.base_url = base_url.trim_end_matches('/').to_string();
        Ok(())
    }

    /// Registered carriers, in declaration order.
    pub fn carriers(&self) -> impl Iterator<Item = Carrier> + '_ {
        Carrier::ALL
            .into_iter()
            .filter(|carrier| self.templates.contains_key(carrier))
    }
}

fn mock_indemnity() -> CarrierTemplate {
    let url = "/mock_indemnity/:id";
    let agent = SectionSchema {
        url: url.to_string(),
        is_paginated: false,
        page_selector: None,
        root_selector: ".agent-detail".to_string(),
        item_selector: None,
        fields: vec![
            FieldRule::new("name", ".value-name"),
            FieldRule::new("producerCode", ".value-producerCode"),
            FieldRule::new("agencyName", ".value-agencyName"),
            FieldRule::new("agencyCode", ".value-agencyCode"),
        ],
        record: RecordKind::Agent,
    };
    let customer = SectionSchema {
        url: url.to_string(),
        is_paginated: false,
        page_selector: None,
        root_selector: ".customer-detail".to_string(),
        item_selector: None,
        fields: vec![
            FieldRule::new("name", ".value-name"),
            FieldRule::new("id", ".value-id"),
            FieldRule::new("email", ".value-email"),
            FieldRule::new("address", ".value-address"),
        ],
        record: RecordKind::Customer,
    };
    let policies = SectionSchema {
        url: url.to_string(),
        is_paginated: false,
        page_selector: None,
        root_selector: ".policy-ul".to_string(),
        item_selector: Some(".list-group-item".to_string()),
        fields: vec![
            FieldRule::new("id", ".id"),
            FieldRule::new("premium", ".premium"),
            FieldRule::new("status", ".status"),
            FieldRule::new("effectiveDate", ".effectiveDate"),
            FieldRule::new("terminationDate", ".terminationDate"),
            FieldRule::new("lastPaymentDate", ".lastPaymentDate"),
        ],
        record: RecordKind::Policy,
    };

    CarrierTemplate {
        carrier: Carrier::MockIndemnity,
        base_url: DEFAULT_BASE_URL.to_string(),
        sections: vec![SectionKey::Agent, SectionKey::Customer, SectionKey::Policies],
        schemas: BTreeMap::from([
            (SectionKey::Agent, agent),
            (SectionKey::Customer, customer),
            (SectionKey::Policies, policies),
        ]),
    }
}

// Placeholder Carrier lays values out as label/span pairs and packs several
// policy facts into the collapsed row that follows each policy row.
fn placeholder_carrier() -> CarrierTemplate {
    let url = "/placeholder_carrier/:id/policies/1";
    let agent = SectionSchema {
        url: url.to_string(),
        is_paginated: false,
        page_selector: None,
        root_selector: ".agency-details".to_string(),
        item_selector: None,
        fields: vec![
            FieldRule::new("name", "[for=name]+"),
            FieldRule::new("producerCode", "[for=producerCode]+"),
            FieldRule::new("agencyName", "[for=agencyName]+"),
            FieldRule::new("agencyCode", "[for=agencyCode]+"),
        ],
        record: RecordKind::Agent,
    };
    let customer = SectionSchema {
        url: url.to_string(),
        is_paginated: false,
        page_selector: None,
        root_selector: ".customer-details".to_string(),
        item_selector: None,
        fields: vec![
            FieldRule::new("name", "[for=name]+"),
            FieldRule::new("id", r#"label:contains("Id")+"#),
            FieldRule::new("email", r#"label:contains("Email") <"#).with_extract("placeholder.email"),
            FieldRule::new("address", r#"div:contains("Address:")"#).with_extract("placeholder.address"),
        ],
        record: RecordKind::Customer,
    };
    let policies = SectionSchema {
        url: url.to_string(),
        is_paginated: true,
        page_selector: Some(r#"a:contains("Next")"#.to_string()),
        root_selector: ".policy-details".to_string(),
        item_selector: Some("table > tbody > tr:not(.collapse)".to_string()),
        fields: vec![
            FieldRule::new("id", ":nth-child(1)"),
            FieldRule::new("premium", ":nth-child(2)"),
            FieldRule::new("status", ":nth-child(3)"),
            FieldRule::new("effectiveDate", ":nth-child(4)"),
            FieldRule::new("terminationDate", ":nth-child(5)"),
            FieldRule::new("lastPaymentDate", "+").with_extract("placeholder.last_payment_date"),
            FieldRule::new("commissionRate", "+").with_extract("placeholder.commission_rate"),
            FieldRule::new("numberInsured", "+").with_extract("placeholder.number_insured"),
        ],
        record: RecordKind::Policy,
    };

    CarrierTemplate {
        carrier: Carrier::PlaceholderCarrier,
        base_url: DEFAULT_BASE_URL.to_string(),
        sections: vec![SectionKey::Agent, SectionKey::Customer, SectionKey::Policies],
        schemas: BTreeMap::from([
            (SectionKey::Agent, agent),
            (SectionKey::Customer, customer),
            (SectionKey::Policies, policies),
        ]),
    }
}
