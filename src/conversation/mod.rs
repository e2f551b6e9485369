//! Conversation history, the remembered user name, and name extraction.

pub mod message;
pub mod name;
pub mod store;

pub use message::{Message, Role};
pub use name::NameExtractor;
pub use store::{ConversationStore, DEFAULT_CONTEXT_WINDOW};
