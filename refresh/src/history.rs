//! # Refresh History
//!
//! Bounded audit trail of processed change notifications, newest first.

use std::collections::VecDeque;

use chrono::Utc;
use parking_lot::Mutex;
use rc_core::RefreshRecord;
use utils::content_fingerprint;

pub const DEFAULT_MAX_RECORDS: usize = 20;

#[derive(Debug)]
pub struct RefreshHistory {
    records: Mutex<VecDeque<RefreshRecord>>,
    capacity: usize,
}

impl Default for RefreshHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshHistory {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_RECORDS)
    }

    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records a notification for `source_id`/`group`.
    ///
    /// The fingerprint is the SHA-256 of `payload`, or `None` for an empty
    /// payload. The oldest record is evicted once the bound is exceeded.
    pub fn add_refresh_record(&self, source_id: &str, group: &str, payload: &str) {
        let record = RefreshRecord {
            timestamp: Utc::now(),
            source_id: source_id.to_string(),
            group: group.to_string(),
            fingerprint: content_fingerprint(Some(payload)),
        };

        let mut records = self.records.lock();
        records.push_front(record);
        while records.len() > self.capacity {
            records.pop_back();
        }
    }

    /// Newest first.
    pub fn snapshot(&self) -> Vec<RefreshRecord> {
        self.records.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    #[test]
    fn test_bounded_newest_first() {
        let history = RefreshHistory::new();
        for i in 0..25 {
            history.add_refresh_record(&format!("source-{i}"), "DEFAULT_GROUP", "a=1");
        }

        let snapshot = history.snapshot();
        assert_eq!(snapshot.len(), DEFAULT_MAX_RECORDS);
        assert_eq!(snapshot[0].source_id, "source-24");
        assert_eq!(snapshot[19].source_id, "source-5");
    }

    #[test]
    fn test_fingerprint_of_empty_payload_is_none() {
        let history = RefreshHistory::new();
        history.add_refresh_record("app", "DEFAULT_GROUP", "");
        history.add_refresh_record("app", "DEFAULT_GROUP", "a=1");

        let snapshot = history.snapshot();
        assert_eq!(snapshot[0].fingerprint, content_fingerprint(Some("a=1")));
        assert!(snapshot[0].fingerprint.is_some());
        assert!(snapshot[1].fingerprint.is_none());
    }

    #[test]
    fn test_identical_payloads_are_not_deduplicated() {
        let history = RefreshHistory::with_capacity(5);
        history.add_refresh_record("app", "G", "a=1");
        history.add_refresh_record("app", "G", "a=1");

        let snapshot = history.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].fingerprint, snapshot[1].fingerprint);
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let history = RefreshHistory::with_capacity(0);
        history.add_refresh_record("a", "G", "x");
        history.add_refresh_record("b", "G", "x");
        assert_eq!(history.capacity(), 1);
        assert_eq!(history.snapshot()[0].source_id, "b");
    }

    #[test]
    fn test_concurrent_appends_respect_bound() {
        let history = Arc::new(RefreshHistory::new());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let history = history.clone();
                std::thread::spawn(move || {
                    for i in 0..50 {
                        history.add_refresh_record(&format!("{t}-{i}"), "G", "v");
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(history.len(), DEFAULT_MAX_RECORDS);
    }

    proptest! {
        #[test]
        fn prop_history_keeps_newest(capacity in 1usize..30, appends in 0usize..80) {
            let history = RefreshHistory::with_capacity(capacity);
            for i in 0..appends {
                history.add_refresh_record(&i.to_string(), "G", "v");
            }

            let snapshot = history.snapshot();
            prop_assert_eq!(snapshot.len(), appends.min(capacity));
            for (position, record) in snapshot.iter().enumerate() {
                prop_assert_eq!(&record.source_id, &(appends - 1 - position).to_string());
            }
        }
    }
}
