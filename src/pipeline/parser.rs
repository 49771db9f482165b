// src/pipeline/parser.rs
use scraper::{ElementRef, Html};

use crate::extractors::{query::Query, rules, ExtractRule};
use crate::models::{HtmlSegment, ParsedData, ParsedField, ParsedPage};
use crate::template::{SectionKey, SectionSchema};
use crate::utils::error::ExtractError;

/// A field rule with its selector compiled and extraction rule resolved.
struct CompiledField<'s> {
    name: &'s str,
    query: Query,
    rule: Option<&'static ExtractRule>,
}

/// Extracts normalized field values from one segment.
///
/// Agent and customer segments yield one field sequence; policy segments
/// yield one per item, in document order. Every declared field is present in
/// each sequence, with `None` where its element was not found.
pub fn parse(segment: &HtmlSegment, schema: &SectionSchema) -> Result<ParsedPage, ExtractError> {
    let fields = compile(schema)?;
    let fragment = Html::parse_fragment(&segment.html);
    let root = fragment.root_element();

    let data = match segment.section {
        SectionKey::Agent | SectionKey::Customer => ParsedData::Record(extract_fields(root, &fields)?),
        SectionKey::Policies => {
            let item_selector = schema
                .item_selector
                .as_deref()
                .ok_or(ExtractError::NotAList(segment.section))?;
            let items = Query::parse(item_selector)?.select(root);
            tracing::debug!(
                "{} {} page {}: {} items",
                segment.carrier,
                segment.section,
                segment.page,
                items.len()
            );
            ParsedData::List(
                items
                    .into_iter()
                    .map(|item| extract_fields(item, &fields))
                    .collect::<Result<Vec<_>, _>>()?,
            )
        }
    };

    Ok(ParsedPage {
        carrier: segment.carrier,
        section: segment.section,
        page: segment.page,
        data,
    })
}

fn compile(schema: &SectionSchema) -> Result<Vec<CompiledField<'_>>, ExtractError> {
    schema
        .fields
        .iter()
        .map(|field| {
            Ok(CompiledField {
                name: field.name.as_str(),
                query: Query::parse(&field.selector)?,
                rule: field.extract.as_deref().map(rules::lookup).transpose()?,
            })
        })
        .collect()
}

fn extract_fields(context: ElementRef<'_>, fields: &[CompiledField<'_>]) -> Result<Vec<ParsedField>, ExtractError> {
    fields
        .iter()
        .map(|field| {
            let raw = field.query.first(context).map(|element| element.inner_html());
            let value = match (raw, field.rule) {
                (Some(html), Some(rule)) => Some(rule.apply(&html)?),
                (raw, _) => raw,
            };
            Ok(ParsedField {
                name: field.name.to_string(),
                value,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::fixtures;
    use crate::template::{Carrier, TemplateRegistry};

    fn segment(section: SectionKey, html: &str) -> HtmlSegment {
        HtmlSegment {
            carrier: Carrier::MockIndemnity,
            section,
            html: html.to_string(),
            page: 0,
        }
    }

    fn values(fields: &[ParsedField]) -> Vec<(&str, Option<&str>)> {
        fields.iter().map(|f| (f.name.as_str(), f.value.as_deref())).collect()
    }

    #[test]
    fn single_record_section() {
        let template = fixtures::template();
        let schema = template.schema(SectionKey::Customer).unwrap();
        let seg = segment(
            SectionKey::Customer,
            r#"<div><dd class="v-name">Jane</dd><dd class="v-id">42</dd></div>"#,
        );

        let parsed = parse(&seg, schema).unwrap();
        assert_eq!(parsed.section, SectionKey::Customer);
        match parsed.data {
            ParsedData::Record(fields) => {
                assert_eq!(values(&fields), vec![("name", Some("Jane")), ("id", Some("42"))]);
            }
            other => panic!("expected a record, got {:?}", other),
        }
    }

    #[test]
    fn absent_fields_are_kept_as_none() {
        let template = fixtures::template();
        let schema = template.schema(SectionKey::Customer).unwrap();
        let parsed = parse(&segment(SectionKey::Customer, ""), schema).unwrap();
        assert_eq!(
            parsed.data,
            ParsedData::Record(vec![ParsedField::new("name", None), ParsedField::new("id", None)])
        );
    }

    #[test]
    fn list_section_yields_items_in_order() {
        let template = fixtures::template();
        let schema = template.schema(SectionKey::Policies).unwrap();
        let html = fixtures::policy_items(&["first", "second", "third"]);
        let parsed = parse(&segment(SectionKey::Policies, &html), schema).unwrap();

        let ParsedData::List(items) = parsed.data else {
            panic!("expected a list");
        };
        let ids: Vec<_> = items.iter().map(|item| item[0].value.as_deref()).collect();
        assert_eq!(ids, vec![Some("first"), Some("second"), Some("third")]);
        assert!(items.iter().all(|item| item.len() == schema.fields.len()));
    }

    #[test]
    fn list_fields_stay_inside_their_item() {
        let template = fixtures::template();
        let schema = template.schema(SectionKey::Policies).unwrap();
        // Second item has no premium; it must not borrow the first item's.
        let html = r#"<li class="policy"><span class="id">a</span><span class="premium">10</span></li>
                      <li class="policy"><span class="id">b</span></li>"#;
        let ParsedData::List(items) = parse(&segment(SectionKey::Policies, html), schema).unwrap().data else {
            panic!("expected a list");
        };
        assert_eq!(items[0][1].value.as_deref(), Some("10"));
        assert_eq!(items[1][1].value, None);
    }

    #[test]
    fn placeholder_customer_uses_deep_extraction() {
        let registry = TemplateRegistry::builtin();
        let template = registry.get(Carrier::PlaceholderCarrier).unwrap();
        let schema = template.schema(SectionKey::Customer).unwrap();
        let seg = HtmlSegment {
            carrier: Carrier::PlaceholderCarrier,
            section: SectionKey::Customer,
            html: fixtures::PLACEHOLDER_CUSTOMER.to_string(),
            page: 0,
        };

        let ParsedData::Record(fields) = parse(&seg, schema).unwrap().data else {
            panic!("expected a record");
        };
        assert_eq!(
            values(&fields),
            vec![
                ("name", Some("Jane Doe")),
                ("id", Some("f02dkl4e")),
                ("email", Some("jane@example.com")),
                ("address", Some("12 Oak St, Springfield")),
            ]
        );
    }

    #[test]
    fn placeholder_policies_read_the_detail_row() {
        let registry = TemplateRegistry::builtin();
        let template = registry.get(Carrier::PlaceholderCarrier).unwrap();
        let schema = template.schema(SectionKey::Policies).unwrap();
        let seg = HtmlSegment {
            carrier: Carrier::PlaceholderCarrier,
            section: SectionKey::Policies,
            html: fixtures::placeholder_policy_table(&[("P-1", "2021-06-01"), ("P-2", "2021-07-01")]),
            page: 0,
        };

        let ParsedData::List(items) = parse(&seg, schema).unwrap().data else {
            panic!("expected a list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(
            values(&items[1]),
            vec![
                ("id", Some("P-2")),
                ("premium", Some("$1,000.00")),
                ("status", Some("Active")),
                ("effectiveDate", Some("2021-01-01")),
                ("terminationDate", Some("2022-01-01")),
                ("lastPaymentDate", Some("2021-07-01")),
                ("commissionRate", Some("10%")),
                ("numberInsured", Some("2")),
            ]
        );
    }

    #[test]
    fn missing_marker_fails_the_segment() {
        let registry = TemplateRegistry::builtin();
        let template = registry.get(Carrier::PlaceholderCarrier).unwrap();
        let schema = template.schema(SectionKey::Policies).unwrap();
        let html = fixtures::placeholder_policy_table(&[("P-1", "2021-06-01")])
            .replace("Commission Rate: 10%", "Commission: n/a");
        let seg = HtmlSegment {
            carrier: Carrier::PlaceholderCarrier,
            section: SectionKey::Policies,
            html,
            page: 3,
        };
        assert!(matches!(
            parse(&seg, schema),
            Err(ExtractError::MarkerNotFound { rule, .. }) if rule == "placeholder.commission_rate"
        ));
    }

    #[test]
    fn unrelated_markup_does_not_change_values() {
        let template = fixtures::template();
        let schema = template.schema(SectionKey::Customer).unwrap();
        let plain = parse(
            &segment(SectionKey::Customer, r#"<dd class="v-name">Jane</dd><dd class="v-id">42</dd>"#),
            schema,
        )
        .unwrap();
        let noisy = parse(
            &segment(
                SectionKey::Customer,
                r#"<nav><a href="/">Home</a></nav><dd class="v-name">Jane</dd><p>ad</p><dd class="v-id">42</dd>"#,
            ),
            schema,
        )
        .unwrap();
        assert_eq!(plain, noisy);
    }
}
