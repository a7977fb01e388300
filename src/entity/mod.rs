//! Entity capabilities and the concrete A, B, C, D entities.
//!
//! Every entity implements the same two capabilities:
//! - [`Identifiable`]: nullable, storage-assigned `i64` id
//! - [`Persistable`]: table/route metadata plus column encoding for the generic repository
//!
//! Nothing in the HTTP or repository layers is written per entity.

mod b;
mod simple;

pub use b::{B, BPatch};
pub use simple::{A, C, D};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sqlx::{
    FromRow,
    error::BoxDynError,
    sqlite::{SqliteArguments, SqliteRow},
};
use std::fmt::Debug;

pub trait Identifiable {
    fn id(&self) -> Option<i64>;
    fn set_id(&mut self, id: i64);
}

/// Merge-patch payload for entity `E`.
pub trait MergePatch<E> {
    /// Id carried in the patch body; must match the path id.
    fn id(&self) -> Option<i64>;

    /// Overwrite the fields present in the patch, keep the rest of `current`.
    fn merge_into(self, current: E) -> E;
}

pub trait Persistable:
    Identifiable
    + Clone
    + Debug
    + Serialize
    + DeserializeOwned
    + for<'r> FromRow<'r, SqliteRow>
    + Send
    + Sync
    + Unpin
    + 'static
{
    type Patch: MergePatch<Self> + Debug + Serialize + DeserializeOwned + Send + 'static;

    /// Lower-case entity name used in logs, alerts and problem bodies (`"a"`).
    const ENTITY_NAME: &'static str;
    /// Plural route segment (`"as"` => `/api/as`).
    const COLLECTION: &'static str;
    const TABLE: &'static str;
    /// Non-id columns, in the order [`Persistable::encode_columns`] binds them.
    const COLUMNS: &'static [&'static str];
    /// `sort` query property => column.
    const SORTABLE: &'static [(&'static str, &'static str)] = &[("id", "id")];

    fn encode_columns(&self, args: &mut SqliteArguments<'_>) -> Result<(), BoxDynError>;

    fn collection_path() -> String {
        format!("/api/{}", Self::COLLECTION)
    }
}

/// Patch body for entities that carry nothing but an id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdPatch {
    #[serde(default)]
    pub id: Option<i64>,
}

impl<E> MergePatch<E> for IdPatch {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn merge_into(self, current: E) -> E {
        current
    }
}
