// src/extractors/rules.rs
use crate::utils::error::ExtractError;

/// Which occurrence of the end marker closes the slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndSearch {
    First,
    Last,
}

/// A named slicing recipe applied to an element's inner HTML when selectors
/// alone cannot isolate a value.
///
/// The value runs from just after `start` to the chosen occurrence of `end`,
/// searched only after `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractRule {
    pub name: &'static str,
    pub start: &'static str,
    pub end: &'static str,
    pub end_search: EndSearch,
    /// Keep the end marker in the value (e.g. a trailing `%`).
    pub include_end: bool,
    pub trim: bool,
}

impl ExtractRule {
    pub fn apply(&self, raw: &str) -> Result<String, ExtractError> {
        let begin = raw
            .find(self.start)
            .ok_or_else(|| self.missing(self.start))?
            + self.start.len();
        let rest = &raw[begin..];

        let end = match self.end_search {
            EndSearch::First => rest.find(self.end),
            EndSearch::Last => rest.rfind(self.end),
        }
        .ok_or_else(|| self.missing(self.end))?;

        let stop = if self.include_end { end + self.end.len() } else { end };
        let value = &rest[..stop];
        Ok(if self.trim { value.trim() } else { value }.to_string())
    }

    fn missing(&self, marker: &str) -> ExtractError {
        ExtractError::MarkerNotFound {
            rule: self.name.to_string(),
            marker: marker.to_string(),
        }
    }
}

const RULES: &[ExtractRule] = &[
    ExtractRule {
        name: "placeholder.email",
        start: "Email:</label>",
        end: "<div>Address:",
        end_search: EndSearch::First,
        include_end: false,
        trim: true,
    },
    ExtractRule {
        name: "placeholder.address",
        start: "Address: ",
        end: "</div>",
        end_search: EndSearch::Last,
        include_end: false,
        trim: true,
    },
    ExtractRule {
        name: "placeholder.last_payment_date",
        start: "Last Payment Date: ",
        end: "<br>",
        end_search: EndSearch::First,
        include_end: false,
        trim: true,
    },
    ExtractRule {
        name: "placeholder.commission_rate",
        start: "Commission Rate: ",
        end: "%",
        end_search: EndSearch::First,
        include_end: true,
        trim: true,
    },
    ExtractRule {
        name: "placeholder.number_insured",
        start: "Number of Insureds: ",
        end: "</div>",
        end_search: EndSearch::Last,
        include_end: false,
        trim: true,
    },
];

/// Resolves a rule by its stable name.
pub fn lookup(name: &str) -> Result<&'static ExtractRule, ExtractError> {
    RULES
        .iter()
        .find(|rule| rule.name == name)
        .ok_or_else(|| ExtractError::UnknownRule(name.to_string()))
}

pub fn all() -> &'static [ExtractRule] {
    RULES
}
