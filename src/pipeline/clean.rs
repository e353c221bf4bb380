use crate::model::TextbookRecord;

/// Returns true if the record names its province, city and title
///
/// District, grade, version and URL may be empty.
pub fn is_complete(record: &TextbookRecord) -> bool {
    !record.province.trim().is_empty()
        && !record.city.trim().is_empty()
        && !record.subject.trim().is_empty()
}

/// Drops incomplete records, keeping the order of the rest
pub fn clean(mut records: Vec<TextbookRecord>) -> Vec<TextbookRecord> {
    let before = records.len();
    records.retain(is_complete);
    let after = records.len();

    if before != after {
        tracing::info!(
            "Cleaning: {} records before, {} after, removed {} invalid records",
            before,
            after,
            before - after
        );
    }

    records
}
