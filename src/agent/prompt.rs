//! Prompt construction and parsing of the model's replies.
//!
//! The model calls tools by answering with a bare JSON directive
//! (`{"tool": "add_todo", "argument": "Buy milk"}` or an array of them).
//! Anything that does not parse as a directive is the final answer.

use serde::Deserialize;
use serde_json::Value;

use crate::todo::outcome::ToolOutcome;
use crate::todo::tools::catalogue;

/// Markers of leaked reasoning steps, matched case-insensitively per line.
const SCRATCHPAD_MARKERS: &[&str] = &["thought:", "action:", "observation:", "final answer:"];

/// A tool call requested by the model.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ToolDirective {
    /// Tool name, e.g. `remove_todo`.
    #[serde(alias = "name")]
    pub tool: String,
    /// Single argument. Models sometimes send numbers; those are accepted.
    #[serde(default, alias = "input", alias = "args")]
    pub argument: Value,
}

impl ToolDirective {
    /// Argument as the string the tools expect.
    #[must_use]
    pub fn argument_text(&self) -> String {
        match &self.argument {
            Value::Null => String::new(),
            Value::String(text) => text.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum DirectiveReply {
    One(ToolDirective),
    Many(Vec<ToolDirective>),
}

/// A tool call and what it returned, fed back to the model.
#[derive(Clone, Debug)]
pub struct ToolExchange {
    /// Tool name as requested.
    pub tool: String,
    /// Argument as passed to the tool.
    pub argument: String,
    /// Result of the call.
    pub outcome: ToolOutcome,
}

/// System preamble: persona, conversation context, and tool protocol.
#[must_use]
pub fn build_preamble(agent_name: &str, context: &str) -> String {
    let context = if context.trim().is_empty() {
        "(no previous conversation)"
    } else {
        context
    };
    let tools = catalogue();

    format!(
        "You are {agent_name}, a helpful assistant that manages conversations and to-do lists.

PERSONALITY:
- Be friendly, conversational, and helpful
- Remember the user's name and context from previous messages
- Always use tools to read or update the to-do list - never guess the contents

CONTEXT:
{context}

TOOLS:
{tools}

To call a tool, reply with only a JSON object such as {{\"tool\": \"add_todo\", \"argument\": \"Buy milk\"}}, or a JSON array of such objects, and nothing else.
Tool results will be sent back to you.
When the user asks about todos, call list_todos first to get the current state.
When adding or removing todos, use the matching tool and confirm the action.
Once you have what you need, answer the user in plain, natural text."
    )
}

/// User turn, with the tool results gathered so far.
#[must_use]
pub fn build_user_prompt(input: &str, exchanges: &[ToolExchange]) -> String {
    if exchanges.is_empty() {
        return input.to_string();
    }

    format!(
        "{input}\n\nTool results so far:\n{}\n\nAnswer the user, or call another tool if you still need one.",
        render_exchanges(exchanges)
    )
}

/// User turn once the tool budget is spent.
#[must_use]
pub fn build_final_prompt(input: &str, exchanges: &[ToolExchange]) -> String {
    format!(
        "{input}\n\nTool results:\n{}\n\nDo not call any more tools. Answer the user now in plain text.",
        render_exchanges(exchanges)
    )
}

fn render_exchanges(exchanges: &[ToolExchange]) -> String {
    exchanges
        .iter()
        .map(|e| {
            format!(
                "- {}({:?}) -> [{}] {}",
                e.tool, e.argument, e.outcome.kind, e.outcome.message
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parse tool directives out of a model reply.
///
/// Accepts a bare object or array, optionally wrapped in a Markdown code
/// fence. Returns `None` for ordinary text.
#[must_use]
pub fn parse_directives(reply: &str) -> Option<Vec<ToolDirective>> {
    let body = strip_code_fence(reply.trim());
    let start = body.find(['{', '['])?;
    let end = body.rfind(['}', ']'])?;
    if end < start {
        return None;
    }

    match serde_json::from_str::<DirectiveReply>(&body[start..=end]).ok()? {
        DirectiveReply::One(directive) => Some(vec![directive]),
        DirectiveReply::Many(directives) if !directives.is_empty() => Some(directives),
        DirectiveReply::Many(_) => None,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

/// Drop lines that look like leaked reasoning steps.
#[must_use]
pub fn clean_response(reply: &str) -> String {
    reply
        .lines()
        .filter(|line| {
            let lowered = line.to_lowercase();
            !SCRATCHPAD_MARKERS.iter().any(|m| lowered.contains(m))
        })
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
