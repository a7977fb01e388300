use super::{Identifiable, MergePatch, Persistable};
use myapp_schema::{EntityRef, Patch};
use serde::{Deserialize, Serialize};
use sqlx::{
    Arguments, FromRow, Row,
    error::BoxDynError,
    sqlite::{SqliteArguments, SqliteRow},
};

/// Entity B, with an optional many-to-one reference to an [`A`](super::A).
///
/// Stored as `b.a_id`; on the wire it is `"a": { "id": .. }` or `"a": null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct B {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub a: Option<EntityRef>,
}

impl Identifiable for B {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = Some(id);
    }
}

impl<'r> FromRow<'r, SqliteRow> for B {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: i64 = row.try_get("id")?;
        let a_id: Option<i64> = row.try_get("a_id")?;
        Ok(Self {
            id: Some(id),
            a: a_id.map(EntityRef::new),
        })
    }
}

impl Persistable for B {
    type Patch = BPatch;

    const ENTITY_NAME: &'static str = "b";
    const COLLECTION: &'static str = "bs";
    const TABLE: &'static str = "b";
    const COLUMNS: &'static [&'static str] = &["a_id"];
    const SORTABLE: &'static [(&'static str, &'static str)] = &[("id", "id"), ("a.id", "a_id")];

    fn encode_columns(&self, args: &mut SqliteArguments<'_>) -> Result<(), BoxDynError> {
        args.add(self.a.map(|a| a.id))
    }
}

/// Merge-patch body for [`B`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BPatch {
    #[serde(default)]
    pub id: Option<i64>,
    /// `Absent` => do not change; `Null` => clear; `Value` => update
    #[serde(default, skip_serializing_if = "Patch::is_absent")]
    pub a: Patch<EntityRef>,
}

impl MergePatch<B> for BPatch {
    fn id(&self) -> Option<i64> {
        self.id
    }

    fn merge_into(self, current: B) -> B {
        B {
            id: current.id,
            a: self.a.apply(current.a),
        }
    }
}
