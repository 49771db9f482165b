// src/models/records.rs
//! Typed domain records built from parsed fields.
//!
//! Each record starts out empty and takes every parsed field whose trimmed
//! value is non-empty. Coercion happens while building: a value that cannot be
//! coerced is dropped, and `None` fields are left out of the serialized record.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::page::ParsedField;

static NON_NUMERIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9.\-]").expect("Failed to compile NON_NUMERIC_RE"));

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// Names the builder a section uses for its records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Agent,
    Customer,
    Policy,
}

impl RecordKind {
    pub fn build(&self, fields: &[ParsedField]) -> DomainRecord {
        match self {
            RecordKind::Agent => DomainRecord::Agent(Agent::with_parsed_fields(fields)),
            RecordKind::Customer => DomainRecord::Customer(Customer::with_parsed_fields(fields)),
            RecordKind::Policy => DomainRecord::Policy(Policy::with_parsed_fields(fields)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainRecord {
    Agent(Agent),
    Customer(Customer),
    Policy(Policy),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agency_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub producer_code: Option<String>,
}

impl Agent {
    pub fn with_parsed_fields(fields: &[ParsedField]) -> Self {
        Self {
            agency_code: text(fields, "agencyCode"),
            agency_name: text(fields, "agencyName"),
            name: text(fields, "name"),
            producer_code: text(fields, "producerCode"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl Customer {
    pub fn with_parsed_fields(fields: &[ParsedField]) -> Self {
        Self {
            name: text(fields, "name"),
            id: text(fields, "id"),
            email: text(fields, "email"),
            address: text(fields, "address"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Policy {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effective_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub termination_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_payment_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commission_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub number_insured: Option<u32>,
}

impl Policy {
    pub fn with_parsed_fields(fields: &[ParsedField]) -> Self {
        Self {
            id: text(fields, "id"),
            premium: coerce(fields, "premium", parse_amount),
            status: text(fields, "status"),
            effective_date: coerce(fields, "effectiveDate", parse_date),
            termination_date: coerce(fields, "terminationDate", parse_date),
            last_payment_date: coerce(fields, "lastPaymentDate", parse_date),
            commission_rate: text(fields, "commissionRate"),
            number_insured: coerce(fields, "numberInsured", parse_count),
        }
    }
}

// --- Field helpers ---

/// The trimmed, non-empty value of a named field.
fn text(fields: &[ParsedField], name: &str) -> Option<String> {
    raw(fields, name).map(str::to_string)
}

fn raw<'a>(fields: &'a [ParsedField], name: &str) -> Option<&'a str> {
    fields
        .iter()
        .find(|f| f.name == name)
        .and_then(|f| f.value.as_deref())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

fn coerce<T>(fields: &[ParsedField], name: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    let value = raw(fields, name)?;
    let parsed = parse(value);
    if parsed.is_none() {
        tracing::warn!("Dropping field '{}': could not coerce '{}'", name, value);
    }
    parsed
}

/// Parses money-like text such as `$1,234.50`.
pub fn parse_amount(value: &str) -> Option<f64> {
    let cleaned = NON_NUMERIC_RE.replace_all(value, "");
    if !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn parse_count(value: &str) -> Option<u32> {
    value.replace(',', "").trim().parse().ok()
}

/// Parses the date layouts carrier sites use; timestamps keep only their date.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|d| d.date_naive()))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
                .map(|d| d.date())
        })
}
