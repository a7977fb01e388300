mod app;

pub use app::{AppError, FailureAlert};

pub type Result<T> = std::result::Result<T, AppError>;
