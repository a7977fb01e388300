use crate::db::sort::SortOrder;
use crate::entity::Persistable;
use crate::error::AppError;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// Storage seam for one entity type.
///
/// Each mutating call is its own transaction: committed on success, rolled back on every
/// other exit. `Ok(None)` means "no row with that id".
#[async_trait]
pub trait EntityStore<E: Persistable>: Send + Sync {
    /// Insert a new row; the store assigns the id. Returns the row as persisted.
    async fn insert(&self, entity: E) -> Result<E, AppError>;

    async fn find_all(&self, sort: &[SortOrder]) -> Result<Vec<E>, AppError>;

    /// Lazily stream every row. Dropping the stream releases the underlying cursor.
    fn stream_all(&self, sort: Vec<SortOrder>) -> BoxStream<'static, Result<E, AppError>>;

    async fn find_by_id(&self, id: i64) -> Result<Option<E>, AppError>;

    /// Replace the row at `id` with `entity`'s columns; never inserts.
    async fn replace(&self, id: i64, entity: E) -> Result<Option<E>, AppError>;

    /// Read-merge-write the row at `id` inside one transaction.
    async fn merge(&self, id: i64, patch: E::Patch) -> Result<Option<E>, AppError>;

    /// Returns the number of rows removed (0 or 1).
    async fn delete_by_id(&self, id: i64) -> Result<u64, AppError>;

    async fn count(&self) -> Result<i64, AppError>;
}
