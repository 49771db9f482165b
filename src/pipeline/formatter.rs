// src/pipeline/formatter.rs
use crate::models::{OutputData, OutputRecord, ParsedData, ParsedField, ParsedPage};
use crate::template::SectionSchema;

/// Turns parsed pages into typed records, one output entry per page.
///
/// List sections produce one record per item; single-record sections one
/// record per page. Entries are numbered by their position in `parsed_pages`;
/// pages that failed to parse upstream leave no gap.
pub fn format(parsed_pages: &[ParsedPage], schema: &SectionSchema, is_list: bool) -> Vec<OutputRecord> {
    parsed_pages
        .iter()
        .enumerate()
        .map(|(index, page)| {
            let build = |fields: &[ParsedField]| schema.record.build(fields);
            let data = match (&page.data, is_list) {
                (ParsedData::List(items), true) => OutputData::List(items.iter().map(|f| build(f)).collect()),
                (ParsedData::Record(fields), false) => OutputData::Record(build(fields)),
                (ParsedData::Record(fields), true) => OutputData::List(vec![build(fields)]),
                (ParsedData::List(items), false) => {
                    tracing::warn!(
                        "{} page {} parsed as a list for a single-record section",
                        page.section,
                        page.page
                    );
                    OutputData::List(items.iter().map(|f| build(f)).collect())
                }
            };
            OutputRecord { page: index, data }
        })
        .collect()
}
