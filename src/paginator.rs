use std::num::NonZeroU32;
use std::time::Duration;

use log::{info, warn};

use crate::error::Error;
use crate::id::RecordId;
use crate::models::Page;
use crate::store::{bounded, Collection, Document, KeysetQuery, DEFAULT_STORE_TIMEOUT};

/// A non-zero page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimit(NonZeroU32);

impl PageLimit {
    pub const DEFAULT: u32 = 10;

    /// `None` for zero.
    pub fn new(limit: u32) -> Option<Self> {
        NonZeroU32::new(limit).map(PageLimit)
    }

    /// Raises zero to one. Never shrinks a non-zero size, so a full page
    /// always holds exactly the number of items asked for.
    pub fn at_least_one(limit: u32) -> Self {
        PageLimit(NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN))
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Default for PageLimit {
    fn default() -> Self {
        PageLimit::at_least_one(Self::DEFAULT)
    }
}

/// Keyset pagination over a collection ordered by [`RecordId`].
///
/// Each call selects records strictly older than the cursor, so records
/// inserted after the first page was served never shift later pages.
#[derive(Debug, Clone)]
pub struct Paginator<C> {
    collection: C,
    timeout: Duration,
}

impl<C> Paginator<C> {
    pub fn new(collection: C) -> Self {
        Self::with_timeout(collection, DEFAULT_STORE_TIMEOUT)
    }

    pub fn with_timeout(collection: C, timeout: Duration) -> Self {
        Self {
            collection,
            timeout,
        }
    }

    /// Fetches the page that follows `cursor`, or the newest page when the
    /// cursor is absent or empty.
    ///
    /// `has_more` only reports that the page came back full; when the final
    /// page is exactly `limit` long the caller learns about the end from one
    /// extra, empty page.
    pub async fn paginate<D>(&self, limit: PageLimit, cursor: Option<&str>) -> Result<Page<D>, Error>
    where
        D: Document,
        C: Collection<D>,
    {
        let before = match cursor.filter(|cursor| !cursor.is_empty()) {
            Some(cursor) => Some(RecordId::decode(cursor).map_err(|e| {
                warn!("Rejecting cursor: {e}");
                Error::InvalidCursor(cursor.to_string())
            })?),
            None => None,
        };

        let query = KeysetQuery {
            before,
            limit: limit.get(),
        };
        let items = bounded(self.timeout, self.collection.find_before(query))
            .await
            .inspect_err(|e| warn!("Page query {query:?} failed: {e}"))?;

        let next_cursor = items
            .last()
            .map(|item| item.id().encode())
            .unwrap_or_default();
        let has_more = items.len() == limit.get() as usize;
        info!(
            "Serving {} items after {:?}, has_more: {has_more}",
            items.len(),
            before
        );

        Ok(Page {
            items,
            next_cursor,
            has_more,
        })
    }
}
