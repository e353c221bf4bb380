use crate::model::TextbookRecord;
use std::collections::HashSet;

/// Removes records whose identity key was already seen
///
/// The first occurrence in input order is kept. Absent slots (`None`) are
/// skipped with a warning; plain records can be passed directly.
pub fn dedupe<I>(records: I) -> Vec<TextbookRecord>
where
    I: IntoIterator,
    I::Item: Into<Option<TextbookRecord>>,
{
    let mut seen = HashSet::new();
    let mut unique = Vec::new();

    for (position, slot) in records.into_iter().enumerate() {
        let Some(record) = slot.into() else {
            tracing::warn!("Skipping absent record at position {}", position);
            continue;
        };

        if seen.insert(record.identity_key()) {
            unique.push(record);
        }
    }

    unique
}
