//! Shared in-memory result collection
//!
//! Every city worker appends the records of one district at a time. All
//! mutation goes through a single mutex so batches never interleave.

use crate::model::TextbookRecord;
use std::sync::{Mutex, MutexGuard};

/// Thread-safe append-only collection of textbook records
#[derive(Debug, Default)]
pub struct ResultAggregator {
    records: Mutex<Vec<TextbookRecord>>,
}

impl ResultAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a whole batch under one lock acquisition
    ///
    /// Records of the batch end up contiguous and in the order given.
    pub fn append_batch(&self, batch: Vec<TextbookRecord>) {
        if batch.is_empty() {
            return;
        }
        self.lock().extend(batch);
    }

    /// Returns a copy of everything appended so far
    ///
    /// Intended to be called once every producer has been joined.
    pub fn snapshot(&self) -> Vec<TextbookRecord> {
        self.lock().clone()
    }

    /// Consumes the aggregator and returns its records without copying
    pub fn into_records(self) -> Vec<TextbookRecord> {
        self.records
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panicking producer cannot leave a half-written batch behind (extend
    // happens under the lock), so a poisoned guard still holds valid data.
    fn lock(&self) -> MutexGuard<'_, Vec<TextbookRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn record(city: &str, n: usize) -> TextbookRecord {
        TextbookRecord {
            province: "江苏".to_string(),
            city: city.to_string(),
            district: format!("{}区", n),
            grade: "一年级".to_string(),
            subject: format!("语文{}", n),
            version: "人教版".to_string(),
            book_url: format!("http://example.com/book/{}", n),
        }
    }

    #[test]
    fn test_append_and_snapshot_preserve_order() {
        let aggregator = ResultAggregator::new();
        aggregator.append_batch(vec![record("南京", 1), record("南京", 2)]);
        aggregator.append_batch(vec![record("苏州", 3)]);

        let snapshot = aggregator.snapshot();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot[0].subject, "语文1");
        assert_eq!(snapshot[1].subject, "语文2");
        assert_eq!(snapshot[2].city, "苏州");
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let aggregator = ResultAggregator::new();
        aggregator.append_batch(Vec::new());
        assert!(aggregator.is_empty());
        assert_eq!(aggregator.len(), 0);
    }

    #[test]
    fn test_concurrent_appends_lose_nothing() {
        let aggregator = Arc::new(ResultAggregator::new());
        let workers = 16;
        let batches_per_worker = 25;
        let batch_size = 7;

        let handles: Vec<_> = (0..workers)
            .map(|w| {
                let aggregator = Arc::clone(&aggregator);
                thread::spawn(move || {
                    for b in 0..batches_per_worker {
                        let city = format!("城市{}", w);
                        let batch = (0..batch_size)
                            .map(|i| record(&city, b * batch_size + i))
                            .collect();
                        aggregator.append_batch(batch);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(aggregator.len(), workers * batches_per_worker * batch_size);
    }

    #[test]
    fn test_batches_stay_contiguous() {
        let aggregator = Arc::new(ResultAggregator::new());
        let batch_size = 50;

        let handles: Vec<_> = (0..8)
            .map(|w| {
                let aggregator = Arc::clone(&aggregator);
                thread::spawn(move || {
                    let city = format!("城市{}", w);
                    aggregator.append_batch((0..batch_size).map(|i| record(&city, i)).collect());
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        let records = Arc::try_unwrap(aggregator).unwrap().into_records();
        for chunk in records.chunks(batch_size) {
            assert!(chunk.iter().all(|r| r.city == chunk[0].city));
        }
    }
}
