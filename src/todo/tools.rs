//! Named to-do tools exposed to the language model.

use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::common::errors::AgentResult;
use crate::todo::outcome::{OutcomePayload, ToolOutcome};
use crate::todo::store::TodoStore;

/// A to-do operation the model can invoke by name with one string argument.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TodoTool {
    /// Append a task.
    AddTodo,
    /// Show every task.
    ListTodos,
    /// Remove a task by name or number.
    RemoveTodo,
    /// Remove every task.
    ClearTodos,
}

impl TodoTool {
    /// All tools, in catalogue order.
    pub const ALL: [Self; 4] = [
        Self::AddTodo,
        Self::ListTodos,
        Self::RemoveTodo,
        Self::ClearTodos,
    ];

    /// Stable tool name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::AddTodo => "add_todo",
            Self::ListTodos => "list_todos",
            Self::RemoveTodo => "remove_todo",
            Self::ClearTodos => "clear_todos",
        }
    }

    /// One-line description for the model.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::AddTodo => "Add a new item to the user's to-do list",
            Self::ListTodos => "Show all items in the user's to-do list",
            Self::RemoveTodo => {
                "Remove an item from the user's to-do list by task name or index number"
            }
            Self::ClearTodos => "Clear all items from the user's to-do list",
        }
    }

    /// What the single argument means, if the tool reads it.
    #[must_use]
    pub const fn argument_hint(self) -> Option<&'static str> {
        match self {
            Self::AddTodo => Some("the todo task description"),
            Self::RemoveTodo => Some("the task description or index number to remove"),
            Self::ListTodos | Self::ClearTodos => None,
        }
    }

    /// Run the tool against `store`.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read or written.
    pub fn invoke(self, store: &TodoStore, argument: &str) -> AgentResult<ToolOutcome> {
        let outcome = match self {
            Self::AddTodo => store.add(argument)?,
            Self::ListTodos => store.list()?,
            Self::RemoveTodo => store.remove(argument)?,
            Self::ClearTodos => store.clear()?,
        };
        info!(tool = self.name(), kind = %outcome.kind, "tool invoked");
        Ok(outcome)
    }
}

impl fmt::Display for TodoTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TodoTool {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|tool| tool.name() == value.trim())
            .ok_or_else(|| value.to_string())
    }
}

/// Invoke a tool by name. Unknown names are reported as a rejection so the
/// model can correct itself.
///
/// # Errors
/// Returns an error if the store cannot be read or written.
pub fn dispatch(store: &TodoStore, name: &str, argument: &str) -> AgentResult<ToolOutcome> {
    match name.parse::<TodoTool>() {
        Ok(tool) => tool.invoke(store, argument),
        Err(unknown) => {
            let known: Vec<&str> = TodoTool::ALL.iter().map(|t| t.name()).collect();
            Ok(ToolOutcome::rejected(format!(
                "Unknown tool '{unknown}'. Available tools: {}.",
                known.join(", ")
            ))
            .with_payload(OutcomePayload::Task(unknown)))
        }
    }
}

/// Render the tool catalogue for a system prompt.
#[must_use]
pub fn catalogue() -> String {
    TodoTool::ALL
        .iter()
        .map(|tool| match tool.argument_hint() {
            Some(hint) => format!("- {}: {} (argument: {hint})", tool.name(), tool.description()),
            None => format!("- {}: {} (no argument)", tool.name(), tool.description()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::config::TodoConfig;
    use crate::todo::outcome::OutcomeKind;

    #[test]
    fn test_names_round_trip() {
        for tool in TodoTool::ALL {
            assert_eq!(tool.name().parse::<TodoTool>(), Ok(tool));
        }
        assert!("delete_everything".parse::<TodoTool>().is_err());
    }

    #[test]
    fn test_dispatch_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = TodoStore::new(dir.path().join("todos.json"), TodoConfig::default());

        assert!(dispatch(&store, "add_todo", "Buy milk").unwrap().is_ok());
        let listing = dispatch(&store, "list_todos", "").unwrap();
        assert!(listing.message.contains("1. Buy milk"));
        assert!(dispatch(&store, "remove_todo", "milk").unwrap().is_ok());
        let cleared = dispatch(&store, "clear_todos", "ignored").unwrap();
        assert!(cleared.message.contains("already empty"));
    }

    #[test]
    fn test_dispatch_unknown_tool_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = TodoStore::new(dir.path().join("todos.json"), TodoConfig::default());

        let outcome = dispatch(&store, "drop_table", "x").unwrap();
        assert_eq!(outcome.kind, OutcomeKind::Rejected);
        assert!(outcome.message.contains("add_todo"));
        assert!(!store.path().exists());
    }

    #[test]
    fn test_catalogue_lists_every_tool() {
        let text = catalogue();
        for tool in TodoTool::ALL {
            assert!(text.contains(tool.name()));
        }
        assert!(text.contains("list_todos: Show all items in the user's to-do list (no argument)"));
    }
}
