//! Error types for the agent and its stores.

use thiserror::Error;

/// Agent error type.
///
/// User-facing rejections (empty task, unknown selector, ...) are not errors;
/// they are reported through [`crate::todo::ToolOutcome`]. This type covers
/// failures the caller cannot recover from by rephrasing.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Reading or writing a store file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// A store could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A name pattern failed to compile.
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// HTTP client error from Rig.
    #[error("http client error: {0}")]
    HttpClient(#[from] rig::http_client::Error),
    /// Completion error.
    #[error("completion error: {0}")]
    Completion(#[from] rig::completion::CompletionError),
}

/// Convenience result alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
