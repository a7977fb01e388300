//! Database module: pool bootstrap, schema, and the generic entity repository.
//!
//! Layout:
//! - `pool.rs`: SQLite pool options and schema application
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sort.rs`: `sort` query parameter parsing into whitelisted ORDER BY terms
//! - `store.rs`: the `EntityStore` storage seam
//! - `repository.rs`: `SqliteRepository`, the `EntityStore` implementation

pub mod pool;
pub mod repository;
pub mod schema;
pub mod sort;
pub mod store;

pub use pool::connect;
pub use repository::SqliteRepository;
pub use schema::SQLITE_INIT;
pub use sort::{Direction, SortError, SortOrder};
pub use store::EntityStore;
