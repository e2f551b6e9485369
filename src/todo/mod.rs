//! To-do list storage, resolution policy, and the tools wrapping it.

pub mod outcome;
pub mod store;
pub mod tools;

pub use outcome::{OutcomeKind, OutcomePayload, TaskMatch, ToolOutcome};
pub use store::TodoStore;
pub use tools::{TodoTool, catalogue, dispatch};
