//! Shared configuration, error types, and file persistence.

pub mod config;
pub mod errors;
pub mod json_file;

pub use config::{
    AgentConfig, AgentLoopConfig, ContextConfig, DuplicatePolicy, LlmConfig, StorageConfig,
    TodoConfig,
};
pub use errors::{AgentError, AgentResult};
