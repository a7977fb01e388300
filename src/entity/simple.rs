//! Entities whose only attribute is their identifier.

use super::{IdPatch, Identifiable, Persistable};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, error::BoxDynError, sqlite::SqliteArguments};

macro_rules! id_only_entity {
    ($(#[$meta:meta])* $name:ident, entity = $entity:literal, collection = $collection:literal, table = $table:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
        pub struct $name {
            #[serde(default)]
            pub id: Option<i64>,
        }

        impl Identifiable for $name {
            fn id(&self) -> Option<i64> {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = Some(id);
            }
        }

        impl Persistable for $name {
            type Patch = IdPatch;

            const ENTITY_NAME: &'static str = $entity;
            const COLLECTION: &'static str = $collection;
            const TABLE: &'static str = $table;
            const COLUMNS: &'static [&'static str] = &[];

            fn encode_columns(&self, _args: &mut SqliteArguments<'_>) -> Result<(), BoxDynError> {
                Ok(())
            }
        }
    };
}

id_only_entity!(
    /// Entity A; B may reference it.
    A, entity = "a", collection = "as", table = "a"
);
id_only_entity!(C, entity = "c", collection = "cs", table = "c");
id_only_entity!(D, entity = "d", collection = "ds", table = "d");
