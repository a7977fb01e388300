//! The generic CRUD resource: one validation-and-translation layer per entity type,
//! each operation a single call into an [`EntityStore`].
//!
//! All id validation happens here, before storage is touched.

pub mod alert;

pub use alert::{AlertKind, EntityAlert};

use crate::config::ApplicationConfig;
use crate::db::{EntityStore, SortError, SortOrder, SqliteRepository, sort::parse_sort};
use crate::entity::{MergePatch, Persistable};
use crate::error::{AppError, Result};
use crate::utils::logging::log_rest_body;
use futures::stream::BoxStream;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::debug;

/// Result of a successful create.
#[derive(Debug, Clone)]
pub struct Created<E> {
    pub entity: E,
    /// `/api/{es}/{id}`
    pub location: String,
    pub alert: EntityAlert,
}

/// Result of a successful full or partial update.
#[derive(Debug, Clone)]
pub struct Mutated<E> {
    pub entity: E,
    pub alert: EntityAlert,
}

pub struct CrudResource<E: Persistable> {
    store: Arc<dyn EntityStore<E>>,
    app: Arc<ApplicationConfig>,
}

impl<E: Persistable> Clone for CrudResource<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            app: self.app.clone(),
        }
    }
}

impl<E: Persistable> CrudResource<E> {
    pub fn new(store: impl EntityStore<E> + 'static, app: Arc<ApplicationConfig>) -> Self {
        Self {
            store: Arc::new(store),
            app,
        }
    }

    pub fn from_pool(pool: SqlitePool, app: Arc<ApplicationConfig>) -> Self {
        Self::new(SqliteRepository::<E>::new(pool), app)
    }

    pub fn application(&self) -> &ApplicationConfig {
        &self.app
    }

    /// Entity name as exposed to clients (namespaced when configured).
    pub fn entity_name(&self) -> String {
        self.app.alert_entity_name(E::ENTITY_NAME)
    }

    fn alert(&self, id: i64, kind: AlertKind) -> EntityAlert {
        EntityAlert {
            app_name: self.app.name.clone(),
            entity_name: self.entity_name(),
            id,
            kind,
        }
    }

    fn invalid(&self, error_key: &'static str, message: impl Into<String>) -> AppError {
        AppError::invalid_argument(self.entity_name(), error_key, message)
    }

    fn sort_orders(&self, query: Option<&str>) -> Result<Vec<SortOrder>> {
        parse_sort(query, E::SORTABLE)
            .map_err(|e: SortError| self.invalid("sortinvalid", e.to_string()))
    }

    /// Path id and body id must both be present and equal.
    fn check_ids(&self, path_id: i64, body_id: Option<i64>) -> Result<()> {
        match body_id {
            None => Err(self.invalid("idnull", "Invalid id")),
            Some(id) if id != path_id => Err(self.invalid("idinvalid", "Invalid ID")),
            Some(_) => Ok(()),
        }
    }

    fn persisted_id(entity: &E) -> Result<i64> {
        entity.id().ok_or_else(|| {
            AppError::UnexpectedError(format!("{} persisted without an id", E::ENTITY_NAME))
        })
    }

    pub async fn create(&self, payload: E) -> Result<Created<E>> {
        log_rest_body(E::ENTITY_NAME, "save", None, &payload);
        if payload.id().is_some() {
            return Err(self.invalid(
                "idexists",
                format!("A new {} cannot already have an ID", E::ENTITY_NAME),
            ));
        }

        let entity = self.store.insert(payload).await?;
        let id = Self::persisted_id(&entity)?;
        Ok(Created {
            location: format!("{}/{id}", E::collection_path()),
            alert: self.alert(id, AlertKind::Created),
            entity,
        })
    }

    /// Collected list, optionally ordered by `sort` parameters in `query`.
    pub async fn list(&self, query: Option<&str>) -> Result<Vec<E>> {
        debug!(entity = E::ENTITY_NAME, "REST request to get all");
        let sort = self.sort_orders(query)?;
        self.store.find_all(&sort).await
    }

    /// Lazy list; the sort is validated up front so a bad query fails before streaming.
    pub fn stream(&self, query: Option<&str>) -> Result<BoxStream<'static, Result<E>>> {
        debug!(entity = E::ENTITY_NAME, "REST request to get all as a stream");
        let sort = self.sort_orders(query)?;
        Ok(self.store.stream_all(sort))
    }

    pub async fn get(&self, id: i64) -> Result<E> {
        debug!(entity = E::ENTITY_NAME, id, "REST request to get");
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(AppError::not_found)
    }

    pub async fn update(&self, id: i64, payload: E) -> Result<Mutated<E>> {
        log_rest_body(E::ENTITY_NAME, "update", Some(id), &payload);
        self.check_ids(id, payload.id())?;

        let entity = self
            .store
            .replace(id, payload)
            .await?
            .ok_or_else(|| AppError::entity_not_found(self.entity_name()))?;
        Ok(Mutated {
            alert: self.alert(id, AlertKind::Updated),
            entity,
        })
    }

    pub async fn partial_update(&self, id: i64, patch: E::Patch) -> Result<Mutated<E>> {
        log_rest_body(E::ENTITY_NAME, "partial update", Some(id), &patch);
        self.check_ids(id, patch.id())?;

        let entity = self
            .store
            .merge(id, patch)
            .await?
            .ok_or_else(|| AppError::entity_not_found(self.entity_name()))?;
        Ok(Mutated {
            alert: self.alert(id, AlertKind::Updated),
            entity,
        })
    }

    /// Idempotent: deleting a missing id still succeeds.
    pub async fn delete(&self, id: i64) -> Result<EntityAlert> {
        debug!(entity = E::ENTITY_NAME, id, "REST request to delete");
        let removed = self.store.delete_by_id(id).await?;
        if removed == 0 {
            debug!(entity = E::ENTITY_NAME, id, "delete of absent id treated as success");
        }
        Ok(self.alert(id, AlertKind::Deleted))
    }

    pub async fn count(&self) -> Result<i64> {
        self.store.count().await
    }
}
