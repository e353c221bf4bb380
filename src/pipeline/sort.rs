use crate::model::TextbookRecord;
use std::cmp::Ordering;

/// Canonical grade order, primary school through senior high
pub const GRADE_ORDER: [&str; 12] = [
    "一年级", "二年级", "三年级", "四年级", "五年级", "六年级", "七年级", "八年级", "九年级",
    "高一", "高二", "高三",
];

/// Position of `grade` in [`GRADE_ORDER`]; unknown grades rank after all known ones
pub fn grade_rank(grade: &str) -> usize {
    GRADE_ORDER
        .iter()
        .position(|known| *known == grade)
        .unwrap_or(GRADE_ORDER.len())
}

/// Orders by province, then city, then canonical grade
pub fn compare_records(a: &TextbookRecord, b: &TextbookRecord) -> Ordering {
    a.province
        .cmp(&b.province)
        .then_with(|| a.city.cmp(&b.city))
        .then_with(|| grade_rank(&a.grade).cmp(&grade_rank(&b.grade)))
}

/// Stable sort; records equal under [`compare_records`] keep their input order
pub fn sort_records(mut records: Vec<TextbookRecord>) -> Vec<TextbookRecord> {
    records.sort_by(compare_records);
    records
}
