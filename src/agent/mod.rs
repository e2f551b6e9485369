//! Language-model driven agent on top of the stores.
//!
//! - `model`: completion seam and its Ollama implementation
//! - `prompt`: preamble construction, tool directive parsing, reply cleanup
//! - `todo_agent`: the turn loop driving a `ChatModel`

pub mod model;
pub mod prompt;
pub mod todo_agent;

pub use model::{ChatModel, OllamaChatModel};
pub use prompt::{ToolDirective, ToolExchange, clean_response, parse_directives};
pub use todo_agent::TodoAgent;
