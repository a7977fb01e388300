//! Generic SQLite repository for any [`Persistable`] entity.
//!
//! SQL is derived from the entity's table/column metadata; values are always bound,
//! and ORDER BY columns only ever come from the entity's sortable whitelist.

use crate::db::sort::{SortOrder, order_by_clause};
use crate::db::store::EntityStore;
use crate::entity::{MergePatch, Persistable};
use crate::error::AppError;
use async_trait::async_trait;
use futures::{StreamExt, stream::BoxStream};
use sqlx::sqlite::SqliteArguments;
use sqlx::{Arguments, Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::marker::PhantomData;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

/// Rows buffered between the cursor task and a slow stream consumer.
const STREAM_BUFFER: usize = 32;

/// Takes the write lock up front, so a read-then-write transaction waits on
/// `busy_timeout` instead of failing with `SQLITE_BUSY` after another commit.
const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

pub struct SqliteRepository<E> {
    pool: SqlitePool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for SqliteRepository<E> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> SqliteRepository<E> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }
}

impl<E: Persistable> SqliteRepository<E> {
    async fn begin_write(&self) -> Result<Transaction<'static, Sqlite>, AppError> {
        Ok(self.pool.begin_with(BEGIN_WRITE).await?)
    }

    fn select_sql() -> String {
        let columns: Vec<&str> = std::iter::once("id")
            .chain(E::COLUMNS.iter().copied())
            .collect();
        format!("SELECT {} FROM {}", columns.join(", "), E::TABLE)
    }

    fn insert_sql() -> String {
        if E::COLUMNS.is_empty() {
            return format!("INSERT INTO {} DEFAULT VALUES RETURNING id", E::TABLE);
        }
        let placeholders = vec!["?"; E::COLUMNS.len()].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING id",
            E::TABLE,
            E::COLUMNS.join(", "),
            placeholders
        )
    }

    async fn fetch_in(conn: &mut SqliteConnection, id: i64) -> Result<Option<E>, AppError> {
        let sql = format!("{} WHERE id = ?", Self::select_sql());
        let row = sqlx::query_as::<_, E>(&sql)
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(row)
    }

    /// Overwrite every non-id column of row `id` with `entity`'s values.
    async fn write_columns(
        conn: &mut SqliteConnection,
        id: i64,
        entity: &E,
    ) -> Result<(), AppError> {
        if E::COLUMNS.is_empty() {
            return Ok(());
        }
        let assignments: Vec<String> = E::COLUMNS.iter().map(|c| format!("{c} = ?")).collect();
        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?",
            E::TABLE,
            assignments.join(", ")
        );

        let mut args = SqliteArguments::default();
        entity
            .encode_columns(&mut args)
            .map_err(sqlx::Error::Encode)?;
        args.add(id).map_err(sqlx::Error::Encode)?;

        sqlx::query_with::<Sqlite, _>(&sql, args)
            .execute(conn)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl<E: Persistable> EntityStore<E> for SqliteRepository<E> {
    async fn insert(&self, entity: E) -> Result<E, AppError> {
        let mut args = SqliteArguments::default();
        entity
            .encode_columns(&mut args)
            .map_err(sqlx::Error::Encode)?;

        let mut tx = self.begin_write().await?;
        let id: i64 = sqlx::query_scalar_with::<Sqlite, i64, _>(&Self::insert_sql(), args)
            .fetch_one(&mut *tx)
            .await?;
        let persisted = Self::fetch_in(&mut tx, id).await?.ok_or_else(|| {
            AppError::UnexpectedError(format!("{} id={id} vanished after insert", E::TABLE))
        })?;
        tx.commit().await?;

        debug!(table = E::TABLE, id, "db insert committed");
        Ok(persisted)
    }

    async fn find_all(&self, sort: &[SortOrder]) -> Result<Vec<E>, AppError> {
        let sql = format!("{}{}", Self::select_sql(), order_by_clause(sort));
        let rows = sqlx::query_as::<_, E>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    fn stream_all(&self, sort: Vec<SortOrder>) -> BoxStream<'static, Result<E, AppError>> {
        let (tx, rx) = mpsc::channel(STREAM_BUFFER);
        let pool = self.pool.clone();
        let sql = format!("{}{}", Self::select_sql(), order_by_clause(&sort));

        // The connection and cursor live only inside this task: they are released when the
        // rows run out, on the first storage error, or as soon as the receiver is dropped.
        tokio::spawn(async move {
            let mut conn = match pool.acquire().await {
                Ok(conn) => conn,
                Err(e) => {
                    let _ = tx.send(Err(AppError::from(e))).await;
                    return;
                }
            };

            let mut rows = sqlx::query_as::<_, E>(&sql).fetch(&mut *conn);
            let mut sent = 0usize;
            loop {
                let next = tokio::select! {
                    () = tx.closed() => {
                        debug!(table = E::TABLE, sent, "stream consumer went away; releasing cursor");
                        break;
                    }
                    next = rows.next() => next,
                };
                let Some(item) = next else {
                    debug!(table = E::TABLE, sent, "stream exhausted");
                    break;
                };

                let failed = item.is_err();
                if tx.send(item.map_err(AppError::from)).await.is_err() || failed {
                    break;
                }
                sent += 1;
            }
        });

        ReceiverStream::new(rx).boxed()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<E>, AppError> {
        let mut conn = self.pool.acquire().await?;
        Self::fetch_in(&mut conn, id).await
    }

    async fn replace(&self, id: i64, entity: E) -> Result<Option<E>, AppError> {
        let mut tx = self.begin_write().await?;
        if Self::fetch_in(&mut tx, id).await?.is_none() {
            return Ok(None);
        }
        Self::write_columns(&mut tx, id, &entity).await?;
        let persisted = Self::fetch_in(&mut tx, id).await?;
        tx.commit().await?;

        debug!(table = E::TABLE, id, "db replace committed");
        Ok(persisted)
    }

    async fn merge(&self, id: i64, patch: E::Patch) -> Result<Option<E>, AppError> {
        let mut tx = self.begin_write().await?;
        let Some(current) = Self::fetch_in(&mut tx, id).await? else {
            return Ok(None);
        };
        let merged = patch.merge_into(current);
        Self::write_columns(&mut tx, id, &merged).await?;
        let persisted = Self::fetch_in(&mut tx, id).await?;
        tx.commit().await?;

        debug!(table = E::TABLE, id, "db merge committed");
        Ok(persisted)
    }

    async fn delete_by_id(&self, id: i64) -> Result<u64, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = ?", E::TABLE);
        let mut tx = self.begin_write().await?;
        let affected = sqlx::query(&sql)
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tx.commit().await?;

        debug!(table = E::TABLE, id, affected, "db delete committed");
        Ok(affected)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let sql = format!("SELECT COUNT(*) FROM {}", E::TABLE);
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}
