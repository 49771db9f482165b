// src/models/output.rs
use serde::{Deserialize, Serialize};

use crate::models::records::DomainRecord;
use crate::template::{Carrier, SectionKey};

/// One carrier/entity pair to scrape, as read from the input file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeTarget {
    pub carrier: String,
    #[serde(rename = "customerId", alias = "entityId")]
    pub entity_id: String,
}

impl ScrapeTarget {
    pub fn new(carrier: &str, entity_id: &str) -> Self {
        Self {
            carrier: carrier.to_string(),
            entity_id: entity_id.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OutputData {
    Record(DomainRecord),
    List(Vec<DomainRecord>),
}

/// Typed data found on one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputRecord {
    pub page: usize,
    pub data: OutputData,
}

/// A page (or a whole section, when `page` is `None`) that produced no output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentFailure {
    pub section: SectionKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    pub reason: String,
}

/// Everything scraped for one target. Only enabled sections are present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CarrierOutput {
    pub carrier: Carrier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent: Option<Vec<OutputRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer: Option<Vec<OutputRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policies: Option<Vec<OutputRecord>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SegmentFailure>,
}

impl CarrierOutput {
    pub fn new(carrier: Carrier, enabled: &[SectionKey]) -> Self {
        let slot = |key: SectionKey| enabled.contains(&key).then(Vec::new);
        Self {
            carrier,
            agent: slot(SectionKey::Agent),
            customer: slot(SectionKey::Customer),
            policies: slot(SectionKey::Policies),
            failures: Vec::new(),
        }
    }

    pub fn section(&self, key: SectionKey) -> Option<&[OutputRecord]> {
        match key {
            SectionKey::Agent => self.agent.as_deref(),
            SectionKey::Customer => self.customer.as_deref(),
            SectionKey::Policies => self.policies.as_deref(),
        }
    }

    /// Appends records to an enabled section. Disabled sections stay absent.
    pub fn extend_section(&mut self, key: SectionKey, records: Vec<OutputRecord>) {
        let slot = match key {
            SectionKey::Agent => &mut self.agent,
            SectionKey::Customer => &mut self.customer,
            SectionKey::Policies => &mut self.policies,
        };
        match slot {
            Some(existing) => existing.extend(records),
            None => tracing::warn!("Dropping {} records for disabled section {}", records.len(), key),
        }
    }

    pub fn record_failure(&mut self, section: SectionKey, page: Option<usize>, reason: String) {
        self.failures.push(SegmentFailure { section, page, reason });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::records::Customer;

    #[test]
    fn only_enabled_sections_serialize() {
        let mut output = CarrierOutput::new(Carrier::MockIndemnity, &[SectionKey::Customer]);
        output.extend_section(
            SectionKey::Customer,
            vec![OutputRecord {
                page: 0,
                data: OutputData::Record(DomainRecord::Customer(Customer {
                    name: Some("Jane".to_string()),
                    ..Customer::default()
                })),
            }],
        );
        output.extend_section(SectionKey::Agent, Vec::new());

        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "carrier": "MOCK_INDEMNITY",
                "customer": [{ "page": 0, "data": { "name": "Jane" } }]
            })
        );
    }

    #[test]
    fn failures_serialize_when_present() {
        let mut output = CarrierOutput::new(Carrier::PlaceholderCarrier, &[SectionKey::Policies]);
        output.record_failure(SectionKey::Policies, Some(1), "marker missing".to_string());
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["policies"], serde_json::json!([]));
        assert_eq!(json["failures"][0]["page"], 1);
    }

    #[test]
    fn target_reads_customer_id_or_entity_id() {
        let a: ScrapeTarget =
            serde_json::from_str(r#"{"carrier":"MOCK_INDEMNITY","customerId":"a0dfjw9a"}"#).unwrap();
        let b: ScrapeTarget =
            serde_json::from_str(r#"{"carrier":"MOCK_INDEMNITY","entityId":"a0dfjw9a"}"#).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, ScrapeTarget::new("MOCK_INDEMNITY", "a0dfjw9a"));
    }
}
