//! Conversation message model.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Author of a message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The person using the assistant.
    Human,
    /// The assistant.
    #[serde(rename = "ai")]
    Assistant,
}

impl Role {
    /// Tag used in the conversation file (`"human"` or `"ai"`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Assistant => "ai",
        }
    }

    /// Prefix used when rendering a transcript.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Human => "User",
            Self::Assistant => "Assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "human" => Ok(Self::Human),
            "ai" => Ok(Self::Assistant),
            _ => Err(value.to_string()),
        }
    }
}

/// A single message in the history.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Author.
    pub role: Role,
    /// Text content.
    pub content: String,
}

impl Message {
    /// Build a human message.
    #[must_use]
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
        }
    }

    /// Build an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    /// Render as one transcript line, e.g. `User: hello`.
    #[must_use]
    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.role.label(), self.content)
    }
}
