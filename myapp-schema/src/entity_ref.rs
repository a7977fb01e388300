use serde::{Deserialize, Serialize};

/// Reference to another entity by identifier, e.g. `"a": { "id": 3 }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: i64,
}

impl EntityRef {
    pub fn new(id: i64) -> Self {
        Self { id }
    }
}

impl From<i64> for EntityRef {
    fn from(id: i64) -> Self {
        Self { id }
    }
}
