// src/template/mod.rs
//! Declarative per-carrier scraping templates.
//!
//! A template is plain data: URLs, selector strings, names of deep-extraction
//! rules and the record kind each section builds. Nothing below the registry
//! hardcodes a selector.

pub mod registry;

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::extractors::{query::Query, rules};
use crate::models::records::RecordKind;
use crate::utils::error::ScrapeError;

pub use registry::TemplateRegistry;

/// The fixed set of supported carriers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Carrier {
    MockIndemnity,
    PlaceholderCarrier,
}

impl Carrier {
    pub const ALL: [Carrier; 2] = [Carrier::MockIndemnity, Carrier::PlaceholderCarrier];

    pub fn as_str(&self) -> &'static str {
        match self {
            Carrier::MockIndemnity => "MOCK_INDEMNITY",
            Carrier::PlaceholderCarrier => "PLACEHOLDER_CARRIER",
        }
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Carrier {
    type Err = ScrapeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Carrier::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ScrapeError::UnknownCarrier(s.to_string()))
    }
}

/// A logical category of data on a carrier's site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKey {
    Agent,
    Customer,
    Policies,
}

impl SectionKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Agent => "agent",
            SectionKey::Customer => "customer",
            SectionKey::Policies => "policies",
        }
    }

    /// Only the policies section may be represented as a list.
    pub fn allows_list(&self) -> bool {
        matches!(self, SectionKey::Policies)
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Locates one field's value inside the root or item context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    pub selector: String,
    /// Name of a deep-extraction rule applied to the selected element's inner HTML.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extract: Option<String>,
}

impl FieldRule {
    pub fn new(name: &str, selector: &str) -> Self {
        Self {
            name: name.to_string(),
            selector: selector.to_string(),
            extract: None,
        }
    }

    pub fn with_extract(mut self, rule: &str) -> Self {
        self.extract = Some(rule.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSchema {
    /// Path relative to the carrier's base URL; `:id` is replaced by the entity id.
    pub url: String,
    pub is_paginated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_selector: Option<String>,
    pub root_selector: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_selector: Option<String>,
    pub fields: Vec<FieldRule>,
    pub record: RecordKind,
}

impl SectionSchema {
    pub fn is_list(&self) -> bool {
        self.item_selector.is_some()
    }

    fn validate(&self, section: SectionKey) -> Result<(), String> {
        if self.is_paginated && self.page_selector.is_none() {
            return Err(format!("{} is paginated but declares no page selector", section));
        }
        if self.is_list() && !section.allows_list() {
            return Err(format!("{} cannot be a list section", section));
        }
        if section.allows_list() && !self.is_list() {
            return Err(format!("{} requires an item selector", section));
        }

        let mut selectors = vec![self.root_selector.as_str()];
        selectors.extend(self.page_selector.as_deref());
        selectors.extend(self.item_selector.as_deref());

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(format!("{} declares field '{}' twice", section, field.name));
            }
            if let Some(rule) = &field.extract {
                rules::lookup(rule).map_err(|e| format!("{}.{}: {}", section, field.name, e))?;
            }
            selectors.push(field.selector.as_str());
        }

        for selector in selectors {
            Query::parse(selector).map_err(|e| format!("{}: {}", section, e))?;
        }
        Ok(())
    }
}

/// Everything needed to fetch and extract one carrier's sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarrierTemplate {
    pub carrier: Carrier,
    pub base_url: String,
    /// Enabled sections, in the order they are scraped.
    pub sections: Vec<SectionKey>,
    pub schemas: BTreeMap<SectionKey, SectionSchema>,
}

impl CarrierTemplate {
    pub fn schema(&self, section: SectionKey) -> Result<&SectionSchema, ScrapeError> {
        self.schemas.get(&section).ok_or(ScrapeError::MissingSchema {
            carrier: self.carrier,
            section,
        })
    }

    pub fn validate(&self) -> Result<(), ScrapeError> {
        let invalid = |reason: String| ScrapeError::InvalidTemplate {
            carrier: self.carrier,
            reason,
        };

        if self.base_url.trim().is_empty() {
            return Err(invalid("base url is empty".to_string()));
        }
        let mut enabled = HashSet::new();
        for section in &self.sections {
            if !enabled.insert(*section) {
                return Err(invalid(format!("section {} enabled twice", section)));
            }
            self.schema(*section)?.validate(*section).map_err(invalid)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer_schema() -> SectionSchema {
        SectionSchema {
            url: "/c/:id".to_string(),
            is_paginated: false,
            page_selector: None,
            root_selector: ".customer".to_string(),
            item_selector: None,
            fields: vec![FieldRule::new("name", ".v-name"), FieldRule::new("id", ".v-id")],
            record: RecordKind::Customer,
        }
    }

    fn template_with(section: SectionKey, schema: SectionSchema) -> CarrierTemplate {
        CarrierTemplate {
            carrier: Carrier::MockIndemnity,
            base_url: "http://localhost".to_string(),
            sections: vec![section],
            schemas: BTreeMap::from([(section, schema)]),
        }
    }

    #[test]
    fn carrier_ids_parse_case_insensitively() {
        assert_eq!("MOCK_INDEMNITY".parse::<Carrier>().unwrap(), Carrier::MockIndemnity);
        assert_eq!("placeholder_carrier".parse::<Carrier>().unwrap(), Carrier::PlaceholderCarrier);
        assert!(matches!(
            "ACME_MUTUAL".parse::<Carrier>(),
            Err(ScrapeError::UnknownCarrier(id)) if id == "ACME_MUTUAL"
        ));
    }

    #[test]
    fn valid_template_passes() {
        let template = template_with(SectionKey::Customer, customer_schema());
        assert!(template.validate().is_ok());
    }

    #[test]
    fn enabled_section_without_schema_is_rejected() {
        let mut template = template_with(SectionKey::Customer, customer_schema());
        template.sections.push(SectionKey::Agent);
        assert!(matches!(
            template.validate(),
            Err(ScrapeError::MissingSchema { section: SectionKey::Agent, .. })
        ));
    }

    #[test]
    fn paginated_schema_needs_page_selector() {
        let mut schema = customer_schema();
        schema.is_paginated = true;
        let template = template_with(SectionKey::Customer, schema);
        assert!(matches!(template.validate(), Err(ScrapeError::InvalidTemplate { .. })));
    }

    #[test]
    fn only_policies_may_be_a_list() {
        let mut schema = customer_schema();
        schema.item_selector = Some("li".to_string());
        let template = template_with(SectionKey::Customer, schema);
        assert!(matches!(template.validate(), Err(ScrapeError::InvalidTemplate { .. })));
    }

    #[test]
    fn duplicate_fields_and_unknown_rules_are_rejected() {
        let mut schema = customer_schema();
        schema.fields.push(FieldRule::new("name", ".other"));
        assert!(template_with(SectionKey::Customer, schema).validate().is_err());

        let mut schema = customer_schema();
        schema.fields[0] = FieldRule::new("name", ".v-name").with_extract("no.such.rule");
        assert!(template_with(SectionKey::Customer, schema).validate().is_err());
    }

    #[test]
    fn broken_selector_is_rejected() {
        let mut schema = customer_schema();
        schema.root_selector = "div[".to_string();
        assert!(template_with(SectionKey::Customer, schema).validate().is_err());
    }
}
