use std::future::Future;
use std::time::Duration;

use crate::error::StoreError;
use crate::id::RecordId;

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// A record that can be addressed and ordered by its [`RecordId`].
pub trait Document: Clone + Send + Sync + 'static {
    fn id(&self) -> RecordId;
}

/// Range filter + descending sort + limit, the only shape of query the
/// paginator issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeysetQuery {
    /// Only ids strictly less than this one. `None` selects everything.
    pub before: Option<RecordId>,
    pub limit: u32,
}

/// One collection of a document store.
///
/// Implementations are cheap handles onto shared connections: cloning one
/// must not copy data, and a single handle must serve concurrent callers.
pub trait Collection<D: Document>: Clone + Send + Sync + 'static {
    /// At most one record with the given id.
    fn find_by_id(
        &self,
        id: RecordId,
    ) -> impl Future<Output = Result<Option<D>, StoreError>> + Send;
    /// Records matching `query.before`, newest first, at most `query.limit`.
    fn find_before(
        &self,
        query: KeysetQuery,
    ) -> impl Future<Output = Result<Vec<D>, StoreError>> + Send;
    fn find_all(&self) -> impl Future<Output = Result<Vec<D>, StoreError>> + Send;
}

pub(crate) async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or(Err(StoreError::TimedOut(limit)))
}
