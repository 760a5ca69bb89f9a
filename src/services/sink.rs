use anyhow::Result;

use crate::dataset::Row;
use crate::db::Store;
use crate::models::{PersonRecord, TitleRecord};

/// Destination of a bulk load.
#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    /// Collection name, for logs.
    fn collection(&self) -> &str;

    /// Persists `rows` in one bulk operation and returns how many were stored.
    async fn insert_many(&self, rows: &[Row]) -> Result<u64>;
}

/// Writes rows into the `movies` collection.
pub struct TitleSink {
    store: Store,
}

impl TitleSink {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl RecordSink for TitleSink {
    fn collection(&self) -> &str {
        "movies"
    }

    async fn insert_many(&self, rows: &[Row]) -> Result<u64> {
        let titles: Vec<TitleRecord> = rows.iter().filter_map(TitleRecord::from_row).collect();
        self.store.insert_titles(&titles).await
    }
}

/// Writes rows into the `people` collection.
pub struct PersonSink {
    store: Store,
}

impl PersonSink {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait::async_trait]
impl RecordSink for PersonSink {
    fn collection(&self) -> &str {
        "people"
    }

    async fn insert_many(&self, rows: &[Row]) -> Result<u64> {
        let people: Vec<PersonRecord> = rows.iter().filter_map(PersonRecord::from_row).collect();
        self.store.insert_people(&people).await
    }
}
