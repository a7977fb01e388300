pub mod entity_ref;
pub mod patch;
pub mod problem;

pub use entity_ref::EntityRef;
pub use patch::Patch;
pub use problem::{PROBLEM_JSON, PROBLEM_WITH_MESSAGE, ProblemBody};
