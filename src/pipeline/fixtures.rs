// src/pipeline/fixtures.rs
//! Templates and HTML shared by the pipeline tests.
use std::collections::BTreeMap;

use crate::models::RecordKind;
use crate::template::{Carrier, CarrierTemplate, FieldRule, SectionKey, SectionSchema, TemplateRegistry};

pub const BASE: &str = "http://carrier.test";

/// MOCK_INDEMNITY stand-in: a flat customer section and a paginated policy list.
pub fn template() -> CarrierTemplate {
    let customer = SectionSchema {
        url: "/c/:id".to_string(),
        is_paginated: false,
        page_selector: None,
        root_selector: ".customer".to_string(),
        item_selector: None,
        fields: vec![FieldRule::new("name", ".v-name"), FieldRule::new("id", ".v-id")],
        record: RecordKind::Customer,
    };
    let policies = SectionSchema {
        url: "/c/:id/policies".to_string(),
        is_paginated: true,
        page_selector: Some(r#"a:contains("Next")"#.to_string()),
        root_selector: ".policies".to_string(),
        item_selector: Some("li.policy".to_string()),
        fields: vec![FieldRule::new("id", ".id"), FieldRule::new("premium", ".premium")],
        record: RecordKind::Policy,
    };
    CarrierTemplate {
        carrier: Carrier::MockIndemnity,
        base_url: BASE.to_string(),
        sections: vec![SectionKey::Customer, SectionKey::Policies],
        schemas: BTreeMap::from([(SectionKey::Customer, customer), (SectionKey::Policies, policies)]),
    }
}

pub fn registry() -> TemplateRegistry {
    let mut registry = TemplateRegistry::new();
    registry.insert(template()).unwrap();
    registry
}

pub fn customer_html(name: &str, id: &str) -> String {
    format!(
        r#"<div class="customer"><dd class="v-name">{}</dd><dd class="v-id">{}</dd></div>"#,
        name, id
    )
}

pub fn policy_items(ids: &[&str]) -> String {
    ids.iter()
        .map(|id| {
            format!(
                r#"<li class="policy"><span class="id">{}</span><span class="premium">100</span></li>"#,
                id
            )
        })
        .collect()
}

pub fn policy_page(ids: &[&str], next: Option<&str>) -> String {
    let next = next
        .map(|href| format!(r#"<a href="{}">Next</a>"#, href))
        .unwrap_or_default();
    format!(
        r#"<html><body><ul class="policies">{}</ul>{}</body></html>"#,
        policy_items(ids),
        next
    )
}

/// Inner HTML of Placeholder Carrier's `.customer-details` block.
pub const PLACEHOLDER_CUSTOMER: &str = r#"
    <div><label for="name">Name:</label><span>Jane Doe</span></div>
    <div><label>Customer Id:</label><span>f02dkl4e</span></div>
    <div><label>Email:</label>jane@example.com<div>Address: 12 Oak St, Springfield</div></div>
"#;

pub const PLACEHOLDER_AGENT: &str = r#"
    <div><label for="name">Name:</label><span>Pat Agent</span></div>
    <div><label for="producerCode">Producer Code:</label><span>PC-7</span></div>
    <div><label for="agencyName">Agency:</label><span>Acme Agency</span></div>
    <div><label for="agencyCode">Agency Code:</label><span>AG-3</span></div>
"#;

/// Inner HTML of Placeholder Carrier's `.policy-details` block; rows are (id, last payment date).
pub fn placeholder_policy_table(rows: &[(&str, &str)]) -> String {
    let body: String = rows
        .iter()
        .map(|(id, paid)| {
            format!(
                r#"<tr><td>{}</td><td>$1,000.00</td><td>Active</td><td>2021-01-01</td><td>2022-01-01</td></tr>
                   <tr class="collapse"><td colspan="5"><div>Last Payment Date: {}<br>Commission Rate: 10%<br>Number of Insureds: 2</div></td></tr>"#,
                id, paid
            )
        })
        .collect();
    format!(
        r#"<table><thead><tr><th>Id</th><th>Premium</th><th>Status</th><th>Effective</th><th>Termination</th></tr></thead><tbody>{}</tbody></table>"#,
        body
    )
}

/// A full Placeholder Carrier page carrying every section.
pub fn placeholder_page(rows: &[(&str, &str)], next: Option<&str>) -> String {
    let next = next
        .map(|href| format!(r#"<a class="page-link" href="{}">Next</a>"#, href))
        .unwrap_or_default();
    format!(
        r#"<html><body>
            <div class="agency-details">{}</div>
            <div class="customer-details">{}</div>
            <div class="policy-details">{}</div>
            <nav>{}</nav>
        </body></html>"#,
        PLACEHOLDER_AGENT,
        PLACEHOLDER_CUSTOMER,
        placeholder_policy_table(rows),
        next
    )
}
