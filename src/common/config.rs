//! Configuration for the agent and its stores.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::common::errors::{AgentError, AgentResult};

/// Environment variable overriding the directory holding both store files.
pub const DATA_DIR_ENV: &str = "TODOBOT_DATA_DIR";
/// Environment variable overriding the completion model name.
pub const MODEL_ENV: &str = "TODOBOT_MODEL";
/// Environment variable overriding the Ollama base URL.
pub const OLLAMA_URL_ENV: &str = "TODOBOT_OLLAMA_URL";

const TODOS_FILE: &str = "todos.json";
const CONVERSATION_FILE: &str = "conversation_history.json";

/// Top-level configuration for the agent.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Store file locations.
    pub storage: StorageConfig,
    /// Completion model settings.
    pub llm: LlmConfig,
    /// Conversation context settings.
    pub context: ContextConfig,
    /// To-do resolution policies.
    pub todo: TodoConfig,
    /// Agent loop settings.
    pub agent: AgentLoopConfig,
}

impl AgentConfig {
    /// Build the default configuration with environment overrides applied.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
            config.storage = StorageConfig::in_dir(dir);
        }
        if let Ok(model) = std::env::var(MODEL_ENV) {
            config.llm.model = model;
        }
        if let Ok(url) = std::env::var(OLLAMA_URL_ENV) {
            config.llm.base_url = Some(url);
        }

        config
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> AgentResult<()> {
        if self.context.window == 0 {
            return Err(AgentError::InvalidConfig(
                "context.window must be > 0".to_string(),
            ));
        }

        if self.agent.max_tool_rounds == 0 {
            return Err(AgentError::InvalidConfig(
                "agent.max_tool_rounds must be > 0".to_string(),
            ));
        }

        if self.llm.model.trim().is_empty() {
            return Err(AgentError::InvalidConfig(
                "llm.model must not be empty".to_string(),
            ));
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(AgentError::InvalidConfig(format!(
                "llm.temperature must be within 0.0..=2.0, got {}",
                self.llm.temperature
            )));
        }

        if self.storage.todos_path == self.storage.conversation_path {
            return Err(AgentError::InvalidConfig(
                "storage.todos_path and storage.conversation_path must differ".to_string(),
            ));
        }

        if let Some(base_url) = &self.llm.base_url {
            Url::parse(base_url)?;
        }

        Ok(())
    }
}

/// Storage configuration for the two store files.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StorageConfig {
    /// To-do list file.
    pub todos_path: PathBuf,
    /// Conversation history file.
    pub conversation_path: PathBuf,
}

impl StorageConfig {
    /// Place both store files inside `dir`.
    #[must_use]
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            todos_path: dir.join(TODOS_FILE),
            conversation_path: dir.join(CONVERSATION_FILE),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::in_dir("data")
    }
}

/// Completion model settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama completion model name.
    pub model: String,
    /// Temperature for generation.
    pub temperature: f64,
    /// Optional max tokens.
    pub max_tokens: Option<u64>,
    /// Optional custom base URL.
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "mistral:7b-instruct-q8_0".to_string(),
            temperature: 0.7,
            max_tokens: Some(1000),
            base_url: None,
        }
    }
}

/// Conversation context settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Number of recent messages rendered into the context transcript.
    pub window: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            window: crate::conversation::DEFAULT_CONTEXT_WINDOW,
        }
    }
}

/// How `add` treats a task that already exists (case-insensitively).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Reject the new task and leave the list untouched.
    #[default]
    Reject,
    /// Append the task anyway.
    Allow,
}

/// To-do resolution policies.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TodoConfig {
    /// Duplicate handling on add.
    pub duplicate_policy: DuplicatePolicy,
    /// Ask for confirmation instead of removing on a unique partial match.
    pub confirm_partial_matches: bool,
}

/// Agent loop settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AgentLoopConfig {
    /// Display name of the assistant.
    pub name: String,
    /// Maximum rounds of tool calls before forcing a final answer.
    pub max_tool_rounds: usize,
}

impl Default for AgentLoopConfig {
    fn default() -> Self {
        Self {
            name: "TodoBot".to_string(),
            max_tool_rounds: 3,
        }
    }
}
