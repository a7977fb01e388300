//! Structured alert metadata produced by successful mutations.
//!
//! The resource layer only records *what* happened; `server::headers` decides how it
//! travels on the wire.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Created,
    Updated,
    Deleted,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Created => "created",
            AlertKind::Updated => "updated",
            AlertKind::Deleted => "deleted",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityAlert {
    pub app_name: String,
    pub entity_name: String,
    pub id: i64,
    pub kind: AlertKind,
}

impl EntityAlert {
    /// `myApp.a.created` when translated, an English sentence otherwise.
    pub fn message(&self, enable_translation: bool) -> String {
        if enable_translation {
            return format!("{}.{}.{}", self.app_name, self.entity_name, self.kind);
        }
        match self.kind {
            AlertKind::Created => format!(
                "A new {} is created with identifier {}",
                self.entity_name, self.id
            ),
            AlertKind::Updated | AlertKind::Deleted => format!(
                "A {} is {} with identifier {}",
                self.entity_name, self.kind, self.id
            ),
        }
    }
}
