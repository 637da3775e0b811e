use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::record::BuildRecord;
use crate::store::query::SearchWindow;
use crate::store::{BuildStore, StoreResult};

/// In-memory store for tests, demos, and development.
///
/// Applies the same window semantics as the HTTP store: the cutoff follows
/// the date-math rounding of the query expression, newest-first windows sort
/// by descending timestamp, and the document cap truncates the result.
/// Records whose timestamp is missing or unparseable never match a window,
/// mirroring how the index would treat them.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    records: Arc<RwLock<Vec<BuildRecord>>>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with the given records.
    pub fn with_records(records: Vec<BuildRecord>) -> Self {
        Self {
            records: Arc::new(RwLock::new(records)),
        }
    }

    /// Adds a record to the store.
    pub async fn insert(&self, record: BuildRecord) {
        self.records.write().await.push(record);
    }

    /// Number of records currently held, regardless of window.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Removes all records.
    pub async fn clear(&self) {
        self.records.write().await.clear();
    }
}

fn parse_timestamp(record: &BuildRecord) -> Option<DateTime<Utc>> {
    record
        .timestamp
        .as_deref()
        .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
        .map(|ts| ts.with_timezone(&Utc))
}

#[async_trait]
impl BuildStore for InMemoryStore {
    async fn fetch_builds(&self, window: &SearchWindow) -> StoreResult<Vec<BuildRecord>> {
        let cutoff = window.cutoff_from(Utc::now());
        let records = self.records.read().await;

        let mut matched: Vec<(DateTime<Utc>, BuildRecord)> = records
            .iter()
            .filter_map(|record| {
                parse_timestamp(record)
                    .filter(|ts| *ts >= cutoff)
                    .map(|ts| (ts, record.clone()))
            })
            .collect();

        if window.newest_first() {
            matched.sort_by(|a, b| b.0.cmp(&a.0));
        }
        matched.truncate(window.size());

        Ok(matched.into_iter().map(|(_, record)| record).collect())
    }

    fn name(&self) -> &str {
        "in-memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record_at(id: &str, moment: DateTime<Utc>) -> BuildRecord {
        BuildRecord::new(id).with_timestamp(moment.to_rfc3339())
    }

    #[tokio::test]
    async fn test_window_excludes_old_records() {
        let now = Utc::now();
        let store = InMemoryStore::with_records(vec![
            record_at("recent", now - Duration::days(5)),
            record_at("ancient", now - Duration::days(45)),
        ]);

        let records = store
            .fetch_builds(&SearchWindow::training_days(30))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].build_id.as_deref(), Some("recent"));
    }

    #[tokio::test]
    async fn test_records_without_valid_timestamp_never_match() {
        let now = Utc::now();
        let store = InMemoryStore::with_records(vec![
            BuildRecord::new("no-timestamp"),
            BuildRecord::new("garbage").with_timestamp("yesterday-ish"),
            record_at("valid", now - Duration::hours(1)),
        ]);

        let records = store
            .fetch_builds(&SearchWindow::training_days(30))
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].build_id.as_deref(), Some("valid"));
    }

    #[tokio::test]
    async fn test_realtime_window_sorts_newest_first() {
        let now = Utc::now();
        let store = InMemoryStore::with_records(vec![
            record_at("middle", now - Duration::hours(5)),
            record_at("newest", now - Duration::hours(1)),
            record_at("oldest", now - Duration::hours(20)),
        ]);

        let records = store
            .fetch_builds(&SearchWindow::realtime_hours(24))
            .await
            .unwrap();

        let ids: Vec<_> = records
            .iter()
            .map(|r| r.build_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, ["newest", "middle", "oldest"]);
    }

    #[tokio::test]
    async fn test_size_cap_keeps_newest() {
        let now = Utc::now();
        let store = InMemoryStore::with_records(vec![
            record_at("a", now - Duration::hours(3)),
            record_at("b", now - Duration::hours(2)),
            record_at("c", now - Duration::hours(1)),
        ]);

        let window = SearchWindow::realtime_hours(24).with_size(2);
        let records = store.fetch_builds(&window).await.unwrap();

        let ids: Vec<_> = records
            .iter()
            .map(|r| r.build_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, ["c", "b"]);
    }

    #[tokio::test]
    async fn test_insert_and_clear() {
        let store = InMemoryStore::new();
        assert!(store.is_empty().await);

        store.insert(BuildRecord::new("b-1")).await;
        store.insert(BuildRecord::new("b-2")).await;
        assert_eq!(store.len().await, 2);

        store.clear().await;
        assert!(store.is_empty().await);
    }
}
