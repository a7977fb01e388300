//! SQL DDL for initializing the database schema.
//! SQLite-first design; can be adapted for other RDBMS.

/// SQLite schema includes:
/// - `a`, `c`, `d` tables (identifier only)
/// - `b` table (identifier plus optional reference to `a`)
///
/// `AUTOINCREMENT` keeps deleted ids from being handed out again.
pub const SQLITE_INIT: &str = r#"
-- ---------------------------------------------------------------------------
-- A
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS a (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL
);

-- ---------------------------------------------------------------------------
-- B (many-to-one to A, nulled when the A row goes away)
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS b (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL,
    a_id INTEGER NULL REFERENCES a(id) ON DELETE SET NULL
);

CREATE INDEX IF NOT EXISTS idx_b_a_id ON b(a_id);

-- ---------------------------------------------------------------------------
-- C
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS c (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL
);

-- ---------------------------------------------------------------------------
-- D
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS d (
    id INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL
);
"#;
