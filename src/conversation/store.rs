//! File-backed conversation history with an optional remembered user name.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::conversation::message::{Message, Role};
use crate::common::errors::AgentResult;
use crate::common::json_file;

/// Default number of messages rendered by [`ConversationStore::recent_context`].
pub const DEFAULT_CONTEXT_WINDOW: usize = 6;

/// On-disk layout:
/// `{"user_name": "Name" | null, "conversations": [{"type": "human" | "ai", "content": "..."}]}`.
#[derive(Debug, Default, Deserialize)]
struct ConversationFile {
    #[serde(default)]
    user_name: Option<String>,
    #[serde(default)]
    conversations: Vec<StoredMessage>,
}

#[derive(Debug, Deserialize)]
struct StoredMessage {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    content: String,
}

#[derive(Serialize)]
struct ConversationFileRef<'a> {
    user_name: Option<&'a str>,
    conversations: Vec<StoredMessageRef<'a>>,
}

#[derive(Serialize)]
struct StoredMessageRef<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    content: &'a str,
}

/// Conversation history and user name, persisted as one JSON file.
///
/// The file is read once by [`ConversationStore::open`]; afterwards the
/// in-memory copy is authoritative and every mutation rewrites the file. A
/// failed write is returned to the caller but the in-memory change is kept,
/// so memory and disk can diverge until the next successful write.
#[derive(Debug)]
pub struct ConversationStore {
    path: PathBuf,
    user_name: Option<String>,
    messages: Vec<Message>,
}

impl ConversationStore {
    /// Load the store from `path`. A missing or malformed file starts empty.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read.
    pub fn open(path: impl Into<PathBuf>) -> AgentResult<Self> {
        let path = path.into();
        let file: ConversationFile = json_file::read_or_default(&path)?;

        let total = file.conversations.len();
        let messages: Vec<Message> = file
            .conversations
            .into_iter()
            .filter_map(|stored| match stored.kind.parse::<Role>() {
                Ok(role) => Some(Message {
                    role,
                    content: stored.content,
                }),
                Err(kind) => {
                    debug!(kind = %kind, "skipping message with unknown type");
                    None
                }
            })
            .collect();

        let user_name = file.user_name.filter(|name| !name.trim().is_empty());
        info!(
            path = %path.display(),
            messages = messages.len(),
            skipped = total - messages.len(),
            has_name = user_name.is_some(),
            "conversation history loaded"
        );

        Ok(Self {
            path,
            user_name,
            messages,
        })
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a message and persist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn append_message(&mut self, role: Role, text: impl Into<String>) -> AgentResult<()> {
        self.messages.push(Message {
            role,
            content: text.into(),
        });
        self.save()
    }

    /// Transcript of the last `window` messages, preceded by a name reminder
    /// when a name is stored. Empty when there is nothing to say.
    #[must_use]
    pub fn recent_context(&self, window: usize) -> String {
        let mut lines = Vec::new();

        if let Some(name) = &self.user_name {
            lines.push(format!("The user's name is {name}."));
        }

        let recent = self.recent_messages(window);
        if !recent.is_empty() {
            lines.push("Recent conversation:".to_string());
            lines.extend(recent.iter().map(Message::transcript_line));
        }

        lines.join("\n")
    }

    /// The last `count` messages, oldest first.
    #[must_use]
    pub fn recent_messages(&self, count: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(count);
        &self.messages[start..]
    }

    /// Overwrite the stored name and persist.
    ///
    /// Whether an existing name should be replaced is the caller's decision.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn set_user_name(&mut self, name: impl Into<String>) -> AgentResult<()> {
        let name = name.into();
        info!(name = %name, "user name stored");
        self.user_name = Some(name);
        self.save()
    }

    /// Stored user name, if any.
    #[must_use]
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Drop all messages and the stored name, then persist.
    ///
    /// # Errors
    /// Returns an error if the file cannot be written.
    pub fn clear(&mut self) -> AgentResult<()> {
        self.messages.clear();
        self.user_name = None;
        info!("conversation history cleared");
        self.save()
    }

    /// Every stored message, oldest first.
    #[must_use]
    pub fn full_history(&self) -> &[Message] {
        &self.messages
    }

    fn save(&self) -> AgentResult<()> {
        let file = ConversationFileRef {
            user_name: self.user_name.as_deref(),
            conversations: self
                .messages
                .iter()
                .map(|m| StoredMessageRef {
                    kind: m.role.as_str(),
                    content: &m.content,
                })
                .collect(),
        };
        json_file::write(&self.path, &file)
    }
}
