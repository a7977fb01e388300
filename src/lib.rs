pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod resource;
pub mod server;
mod utils;

pub use error::AppError;
pub use server::{AppState, app_router};
