//! File-backed to-do list.
//!
//! Every operation re-reads the whole file, and every mutation writes the
//! whole list back. There is no lock around that cycle: two processes sharing
//! one file can lose each other's updates. If shared access is ever needed,
//! an exclusive file lock held from `load` to `save` is the place to add it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::common::config::{DuplicatePolicy, TodoConfig};
use crate::common::errors::AgentResult;
use crate::common::json_file;
use crate::todo::outcome::{OutcomeKind, OutcomePayload, TaskMatch, ToolOutcome};

const EMPTY_LIST: &str = "Your to-do list is empty!";

/// On-disk layout: `{"todos": [...]}`.
#[derive(Debug, Default, Deserialize)]
struct TodoFile {
    #[serde(default)]
    todos: Vec<String>,
}

#[derive(Serialize)]
struct TodoFileRef<'a> {
    todos: &'a [String],
}

/// Ordered to-do list persisted as one JSON file.
#[derive(Clone, Debug)]
pub struct TodoStore {
    path: PathBuf,
    config: TodoConfig,
}

impl TodoStore {
    /// Create a store backed by `path`. The file is not touched until the
    /// first operation.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, config: TodoConfig) -> Self {
        Self {
            path: path.into(),
            config,
        }
    }

    /// Backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current tasks in display order.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read.
    pub fn tasks(&self) -> AgentResult<Vec<String>> {
        self.load()
    }

    /// Append a task.
    ///
    /// # Errors
    /// Returns an error if the list cannot be read or written.
    pub fn add(&self, task: &str) -> AgentResult<ToolOutcome> {
        let task = task.trim();
        if task.is_empty() {
            return Ok(ToolOutcome::rejected("Please provide a task to add."));
        }

        let mut todos = self.load()?;

        if self.config.duplicate_policy == DuplicatePolicy::Reject {
            let needle = task.to_lowercase();
            if let Some(existing) = todos.iter().find(|t| t.to_lowercase() == needle) {
                debug!(task, "duplicate task rejected");
                return Ok(ToolOutcome::rejected(format!(
                    "'{existing}' is already on your to-do list."
                ))
                .with_payload(OutcomePayload::Task(existing.clone())));
            }
        }

        todos.push(task.to_string());
        self.save(&todos)?;
        info!(task, count = todos.len(), "task added");

        Ok(
            ToolOutcome::ok(format!("Added '{task}' to your to-do list!"))
                .with_payload(OutcomePayload::Task(task.to_string())),
        )
    }

    /// Render the list, numbered from 1.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read.
    pub fn list(&self) -> AgentResult<ToolOutcome> {
        let todos = self.load()?;
        if todos.is_empty() {
            return Ok(ToolOutcome::ok(EMPTY_LIST).with_payload(OutcomePayload::Tasks(todos)));
        }

        let numbered = render_numbered(todos.iter().enumerate().map(|(i, t)| (i + 1, t.as_str())));
        Ok(
            ToolOutcome::ok(format!("Here's your current to-do list:\n{numbered}"))
                .with_payload(OutcomePayload::Tasks(todos)),
        )
    }

    /// Remove one task chosen by a 1-based index or by its text.
    ///
    /// A selector that parses as an integer is always an index. Otherwise an
    /// exact case-insensitive match wins, then a unique substring match.
    ///
    /// # Errors
    /// Returns an error if the list cannot be read or written.
    pub fn remove(&self, selector: &str) -> AgentResult<ToolOutcome> {
        let selector = selector.trim();
        if selector.is_empty() {
            return Ok(ToolOutcome::rejected(
                "Please provide a task name or number to remove.",
            ));
        }

        let mut todos = self.load()?;
        if todos.is_empty() {
            return Ok(ToolOutcome::not_found(EMPTY_LIST));
        }

        let position = match resolve(&todos, selector, self.config.confirm_partial_matches) {
            Resolution::Found(position) => position,
            Resolution::Refused(outcome) => return Ok(outcome),
        };

        let removed = todos.remove(position);
        self.save(&todos)?;
        info!(task = %removed, count = todos.len(), "task removed");

        Ok(
            ToolOutcome::ok(format!("Removed '{removed}' from your to-do list!"))
                .with_payload(OutcomePayload::Task(removed)),
        )
    }

    /// Remove every task.
    ///
    /// # Errors
    /// Returns an error if the list cannot be read or written.
    pub fn clear(&self) -> AgentResult<ToolOutcome> {
        let todos = self.load()?;
        self.save(&[])?;

        if todos.is_empty() {
            return Ok(ToolOutcome::ok("Your to-do list is already empty!"));
        }

        info!(count = todos.len(), "to-do list cleared");
        Ok(ToolOutcome::ok(format!(
            "Cleared all {} items from your to-do list!",
            todos.len()
        )))
    }

    fn load(&self) -> AgentResult<Vec<String>> {
        let file: TodoFile = json_file::read_or_default(&self.path)?;
        Ok(file.todos)
    }

    fn save(&self, todos: &[String]) -> AgentResult<()> {
        json_file::write(&self.path, &TodoFileRef { todos })
    }
}

/// Result of resolving a selector against the list.
enum Resolution {
    /// 0-based position of the task to remove.
    Found(usize),
    /// The selector did not designate exactly one task.
    Refused(ToolOutcome),
}

fn resolve(todos: &[String], selector: &str, confirm_partial: bool) -> Resolution {
    if is_integer(selector) {
        return resolve_index(todos.len(), selector.parse::<i64>().ok());
    }

    let needle = selector.to_lowercase();

    if let Some(position) = todos.iter().position(|t| t.to_lowercase() == needle) {
        return Resolution::Found(position);
    }

    let matches: Vec<TaskMatch> = todos
        .iter()
        .enumerate()
        .filter(|(_, t)| t.to_lowercase().contains(&needle))
        .map(|(i, t)| TaskMatch {
            index: i + 1,
            task: t.clone(),
        })
        .collect();

    match matches.len() {
        0 => Resolution::Refused(ToolOutcome::not_found(format!(
            "Task '{selector}' not found in your to-do list."
        ))),
        1 if !confirm_partial => Resolution::Found(matches[0].index - 1),
        1 => {
            let only = &matches[0];
            let message = format!(
                "Did you mean '{}' (#{})? Remove it by number to confirm.",
                only.task, only.index
            );
            Resolution::Refused(
                ToolOutcome::new(OutcomeKind::Ambiguous, message)
                    .with_payload(OutcomePayload::Matches(matches)),
            )
        }
        _ => {
            let listing = render_numbered(matches.iter().map(|m| (m.index, m.task.as_str())));
            let message = format!(
                "Multiple tasks match '{selector}':\n{listing}\nPlease specify which one to remove by number."
            );
            Resolution::Refused(
                ToolOutcome::new(OutcomeKind::Ambiguous, message)
                    .with_payload(OutcomePayload::Matches(matches)),
            )
        }
    }
}

/// Signed run of ASCII digits, whatever its magnitude.
fn is_integer(selector: &str) -> bool {
    let digits = selector.strip_prefix(['+', '-']).unwrap_or(selector);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `None` stands for an integer too large to represent; it is out of range.
fn resolve_index(len: usize, number: Option<i64>) -> Resolution {
    match number.and_then(|n| usize::try_from(n).ok()) {
        Some(index) if (1..=len).contains(&index) => Resolution::Found(index - 1),
        _ => Resolution::Refused(
            ToolOutcome::new(
                OutcomeKind::OutOfRange,
                format!("Invalid index. Please use a number between 1 and {len}."),
            )
            .with_payload(OutcomePayload::Range { min: 1, max: len }),
        ),
    }
}

fn render_numbered<'a>(items: impl Iterator<Item = (usize, &'a str)>) -> String {
    items
        .map(|(index, task)| format!("{index}. {task}"))
        .collect::<Vec<_>>()
        .join("\n")
}
