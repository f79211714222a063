use std::time::Duration;

use log::{info, warn};

use crate::error::Error;
use crate::id::RecordId;
use crate::store::{bounded, Collection, Document, DEFAULT_STORE_TIMEOUT};

/// Single-record reads over one collection.
#[derive(Debug, Clone)]
pub struct Lookup<C> {
    collection: C,
    timeout: Duration,
}

impl<C> Lookup<C> {
    pub fn new(collection: C) -> Self {
        Self::with_timeout(collection, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(collection: C, timeout: Duration) -> Self {
        Self {
            collection,
            timeout,
        }
    }

    pub async fn get_by_id<D>(&self, id: &str) -> Result<D, Error>
    where
        D: Document,
        C: Collection<D>,
    {
        let record_id = RecordId::decode(id).map_err(|e| {
            warn!("Rejecting id: {e}");
            Error::InvalidId(id.to_string())
        })?;

        bounded(self.timeout, self.collection.find_by_id(record_id))
            .await
            .inspect_err(|e| warn!("Lookup of {record_id} failed: {e}"))?
            .ok_or_else(|| Error::NotFound(record_id.encode()))
    }

    pub async fn list_all<D>(&self) -> Result<Vec<D>, Error>
    where
        D: Document,
        C: Collection<D>,
    {
        let records = bounded(self.timeout, self.collection.find_all())
            .await
            .inspect_err(|e| warn!("Listing failed: {e}"))?;
        info!("Retrieved {} records", records.len());
        Ok(records)
    }
}
