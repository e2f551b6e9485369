//! Tagged results returned by to-do operations.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Outcome category of a to-do operation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// The operation succeeded (including harmless no-ops).
    Ok,
    /// The input was refused (empty task, duplicate, unknown tool).
    Rejected,
    /// No task matched the selector.
    NotFound,
    /// Several tasks matched, or a partial match awaits confirmation.
    Ambiguous,
    /// A numeric selector fell outside `1..=len`.
    OutOfRange,
}

impl OutcomeKind {
    /// Stable string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Rejected => "rejected",
            Self::NotFound => "not_found",
            Self::Ambiguous => "ambiguous",
            Self::OutOfRange => "out_of_range",
        }
    }
}

impl fmt::Display for OutcomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A task matched by a selector, with its 1-based position.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TaskMatch {
    /// 1-based position in the list.
    pub index: usize,
    /// Task text as stored.
    pub task: String,
}

/// Structured data attached to an outcome.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum OutcomePayload {
    /// A single task (added, removed, or duplicated).
    Task(String),
    /// The whole list, in display order.
    Tasks(Vec<String>),
    /// Candidates for an ambiguous selector.
    Matches(Vec<TaskMatch>),
    /// Valid index bounds for an out-of-range selector.
    Range {
        /// Smallest valid index.
        min: usize,
        /// Largest valid index.
        max: usize,
    },
}

/// Result of a to-do operation.
///
/// `message` is always a complete, human-readable sentence; `kind` lets the
/// caller branch without parsing it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    /// Outcome category.
    pub kind: OutcomeKind,
    /// Display text.
    pub message: String,
    /// Optional structured data.
    pub payload: Option<OutcomePayload>,
}

impl ToolOutcome {
    /// Build an outcome of the given kind.
    #[must_use]
    pub fn new(kind: OutcomeKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            payload: None,
        }
    }

    /// Successful outcome.
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Ok, message)
    }

    /// Rejected input.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::Rejected, message)
    }

    /// No matching task.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(OutcomeKind::NotFound, message)
    }

    /// Attach a payload.
    #[must_use]
    pub fn with_payload(mut self, payload: OutcomePayload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Whether the operation succeeded.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.kind == OutcomeKind::Ok
    }
}

impl fmt::Display for ToolOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_message() {
        let outcome = ToolOutcome::ok("Added 'x' to your to-do list!");
        assert_eq!(outcome.to_string(), "Added 'x' to your to-do list!");
        assert!(outcome.is_ok());
    }

    #[test]
    fn test_payload_serializes_tagged() {
        let outcome = ToolOutcome::new(OutcomeKind::OutOfRange, "bad index")
            .with_payload(OutcomePayload::Range { min: 1, max: 2 });
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["kind"], "out_of_range");
        assert_eq!(json["payload"]["type"], "range");
        assert_eq!(json["payload"]["value"]["max"], 2);
    }
}
