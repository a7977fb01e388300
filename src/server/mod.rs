//! HTTP surface: router, middleware, extractors and per-entity routes.

pub mod extract;
pub mod headers;
pub mod negotiate;
pub mod router;
pub mod routes;

pub use router::{AppState, app_router};
