use super::lock;
use crate::message::ResponseRecord;
use std::collections::HashMap;
use std::sync::Mutex;

/// A record as kept by the response store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRecord {
    pub key: i64,
    pub content: String,
    pub duration: f64,
    /// UNIX timestamp in seconds.
    pub created_at: f64,
}

#[derive(Debug, Default)]
struct ResponseTable {
    count: i64,
    records: HashMap<i64, Vec<StoredRecord>>,
}

/// Store of accepted response records, grouped by job key.
#[derive(Debug, Default)]
pub struct ResponseStore {
    table: Mutex<ResponseTable>,
}

impl ResponseStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record under its job key. Returns the stored copy and the total number of
    /// records stored so far.
    pub fn append(&self, record: ResponseRecord) -> (StoredRecord, i64) {
        let stored = StoredRecord {
            key: record.key,
            content: record.content,
            duration: record.duration,
            created_at: now_timestamp(),
        };

        let mut table = lock(&self.table);
        table
            .records
            .entry(stored.key)
            .or_default()
            .push(stored.clone());
        table.count += 1;
        (stored, table.count)
    }

    /// Returns the records of one job in insertion order.
    pub fn history(&self, key: i64) -> Vec<StoredRecord> {
        lock(&self.table)
            .records
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }
}

fn now_timestamp() -> f64 {
    let now = chrono::Utc::now();
    now.timestamp() as f64 + f64::from(now.timestamp_subsec_micros()) / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(key: i64, content: &str, duration: f64) -> ResponseRecord {
        ResponseRecord {
            key,
            content: content.to_string(),
            duration,
        }
    }

    #[test]
    fn test_append_counts_all_records() {
        let store = ResponseStore::new();

        let (_, first) = store.append(record(0, "abc", 0.3));
        let (_, second) = store.append(record(1, "null", 0.0));
        let (stored, third) = store.append(record(0, "def", 0.4));

        assert_eq!((first, second, third), (1, 2, 3));
        assert_eq!(stored.key, 0);
        assert_eq!(stored.content, "def");
        assert!(stored.created_at > 0.0);
    }

    #[test]
    fn test_history_keeps_insertion_order_per_key() {
        let store = ResponseStore::new();
        store.append(record(3, "first", 0.1));
        store.append(record(4, "other", 0.2));
        store.append(record(3, "second", 0.3));

        let history: Vec<_> = store
            .history(3)
            .into_iter()
            .map(|r| (r.content, r.duration))
            .collect();

        assert_eq!(
            history,
            vec![("first".to_string(), 0.1), ("second".to_string(), 0.3)]
        );
        assert!(store.history(99).is_empty());
    }
}
