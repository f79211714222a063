use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::id::RecordId;
use crate::store::{Collection, Document, KeysetQuery};

/// An ordered in-process collection, keyed the same way the database keys
/// its documents.
#[derive(Debug)]
pub struct MemoryCollection<D> {
    records: Arc<RwLock<BTreeMap<RecordId, D>>>,
    queries: Arc<AtomicUsize>,
}

impl<D> Clone for MemoryCollection<D> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            queries: self.queries.clone(),
        }
    }
}

impl<D: Document> Default for MemoryCollection<D> {
    fn default() -> Self {
        Self::from_records(Vec::new())
    }
}

impl<D: Document> MemoryCollection<D> {
    pub fn from_records(records: impl IntoIterator<Item = D>) -> Self {
        Self {
            records: Arc::new(RwLock::new(
                records.into_iter().map(|r| (r.id(), r)).collect(),
            )),
            queries: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Inserts or replaces the record with the same id.
    pub async fn insert(&self, record: D) {
        self.records.write().await.insert(record.id(), record);
    }

    pub async fn remove(&self, id: RecordId) -> Option<D> {
        self.records.write().await.remove(&id)
    }

    /// How many reads this collection has served.
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }

    fn count_query(&self) {
        self.queries.fetch_add(1, Ordering::Relaxed);
    }
}

impl<D: Document> Collection<D> for MemoryCollection<D> {
    async fn find_by_id(&self, id: RecordId) -> Result<Option<D>, StoreError> {
        self.count_query();
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn find_before(&self, query: KeysetQuery) -> Result<Vec<D>, StoreError> {
        self.count_query();
        let records = self.records.read().await;
        let limit = query.limit as usize;
        let page = match query.before {
            Some(before) => records.range(..before).rev().take(limit).map(|(_, r)| r.clone()).collect(),
            None => records.values().rev().take(limit).cloned().collect(),
        };
        Ok(page)
    }

    async fn find_all(&self) -> Result<Vec<D>, StoreError> {
        self.count_query();
        Ok(self.records.read().await.values().cloned().collect())
    }
}
