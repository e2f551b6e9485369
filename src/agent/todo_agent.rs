//! The conversational to-do agent.

use tracing::{debug, error, info, warn};

use crate::agent::model::{ChatModel, OllamaChatModel};
use crate::agent::prompt::{
    ToolExchange, build_final_prompt, build_preamble, build_user_prompt, clean_response,
    parse_directives,
};
use crate::common::config::AgentConfig;
use crate::common::errors::{AgentError, AgentResult};
use crate::conversation::{ConversationStore, NameExtractor, Role};
use crate::todo::{TodoStore, dispatch};

const FALLBACK_REPLY: &str = "Sorry, I couldn't process that.";
const APOLOGY_REPLY: &str = "I apologize, but I encountered an error. Please try again.";
const CLEARED_REPLY: &str = "Conversation cleared! How can I help you today?";

/// Conversational agent owning the to-do and conversation stores.
pub struct TodoAgent<M = OllamaChatModel> {
    config: AgentConfig,
    todos: TodoStore,
    conversation: ConversationStore,
    names: NameExtractor,
    model: M,
}

impl TodoAgent<OllamaChatModel> {
    /// Build the agent on Ollama: validate config, open both stores,
    /// prepare the model.
    ///
    /// # Errors
    /// Returns an error if the config is invalid, the conversation file
    /// cannot be read, or the Ollama client cannot be built.
    pub fn new(config: AgentConfig) -> AgentResult<Self> {
        config.validate()?;
        let model = OllamaChatModel::new(&config.llm)?;
        Self::with_model(config, model)
    }
}

impl<M: ChatModel> TodoAgent<M> {
    /// Build the agent around an already constructed model.
    ///
    /// # Errors
    /// Returns an error if the config is invalid or the conversation file
    /// cannot be read.
    pub fn with_model(config: AgentConfig, model: M) -> AgentResult<Self> {
        config.validate()?;

        let todos = TodoStore::new(&config.storage.todos_path, config.todo.clone());
        let conversation = ConversationStore::open(&config.storage.conversation_path)?;
        let names = NameExtractor::new()?;

        info!(
            model = %config.llm.model,
            todos = %config.storage.todos_path.display(),
            "agent ready"
        );

        Ok(Self {
            config,
            todos,
            conversation,
            names,
            model,
        })
    }

    /// The to-do store.
    #[must_use]
    pub const fn todos(&self) -> &TodoStore {
        &self.todos
    }

    /// The conversation store.
    #[must_use]
    pub const fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    /// Stored user name, or "there" for greetings.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.conversation.user_name().unwrap_or("there")
    }

    /// Handle one user message and return the reply.
    ///
    /// Model failures produce an apology reply; storage failures are errors.
    ///
    /// # Errors
    /// Returns an error if either store cannot be read or written.
    pub async fn chat(&mut self, input: &str) -> AgentResult<String> {
        self.remember_name(input)?;
        self.conversation.append_message(Role::Human, input)?;

        let answer = match self.respond(input).await {
            Ok(reply) => {
                let cleaned = clean_response(&reply);
                if cleaned.is_empty() {
                    FALLBACK_REPLY.to_string()
                } else {
                    cleaned
                }
            }
            Err(err @ (AgentError::Completion(_) | AgentError::HttpClient(_))) => {
                error!(error = %err, "model call failed");
                APOLOGY_REPLY.to_string()
            }
            Err(err) => return Err(err),
        };

        self.conversation
            .append_message(Role::Assistant, answer.as_str())?;
        Ok(answer)
    }

    /// Forget the conversation and the stored name.
    ///
    /// # Errors
    /// Returns an error if the conversation file cannot be written.
    pub fn clear_conversation(&mut self) -> AgentResult<&'static str> {
        self.conversation.clear()?;
        Ok(CLEARED_REPLY)
    }

    /// Store the name introduced in `input`, unless one is already known.
    ///
    /// # Errors
    /// Returns an error if the conversation file cannot be written.
    pub fn remember_name(&mut self, input: &str) -> AgentResult<Option<String>> {
        if self.conversation.user_name().is_some() {
            return Ok(None);
        }
        let Some(name) = self.names.extract(input) else {
            return Ok(None);
        };
        self.conversation.set_user_name(name.as_str())?;
        Ok(Some(name))
    }

    async fn respond(&self, input: &str) -> AgentResult<String> {
        let context = self.conversation.recent_context(self.config.context.window);
        let preamble = build_preamble(&self.config.agent.name, &context);
        let mut exchanges: Vec<ToolExchange> = Vec::new();

        for round in 0..self.config.agent.max_tool_rounds {
            let reply = self
                .model
                .complete(&preamble, build_user_prompt(input, &exchanges))
                .await?;

            let Some(directives) = parse_directives(&reply) else {
                return Ok(reply);
            };

            debug!(round, calls = directives.len(), "model requested tools");
            for directive in directives {
                let argument = directive.argument_text();
                let outcome = dispatch(&self.todos, &directive.tool, &argument)?;
                exchanges.push(ToolExchange {
                    tool: directive.tool,
                    argument,
                    outcome,
                });
            }
        }

        warn!(
            rounds = self.config.agent.max_tool_rounds,
            "tool budget spent, forcing a final answer"
        );
        let reply = self
            .model
            .complete(&preamble, build_final_prompt(input, &exchanges))
            .await?;

        if parse_directives(&reply).is_some() {
            return Ok(summarize_exchanges(&exchanges));
        }
        Ok(reply)
    }
}

/// Plain-text reply built from tool results when the model will not stop
/// calling tools.
fn summarize_exchanges(exchanges: &[ToolExchange]) -> String {
    if exchanges.is_empty() {
        return FALLBACK_REPLY.to_string();
    }
    exchanges
        .iter()
        .map(|e| e.outcome.message.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use rig::completion::CompletionError;

    use super::*;
    use crate::agent::model::ChatFuture;
    use crate::common::config::StorageConfig;
    use crate::conversation::message::Message;
    use crate::todo::ToolOutcome;

    /// Model replaying canned replies in order; `None` fails the call.
    struct ScriptedModel {
        replies: Mutex<VecDeque<Option<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(replies: &[Option<&str>]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.map(str::to_string)).collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn prompts(&self) -> Vec<String> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl ChatModel for ScriptedModel {
        fn complete<'a>(
            &'a self,
            _preamble: &'a str,
            prompt: String,
        ) -> ChatFuture<'a, AgentResult<String>> {
            self.prompts.lock().unwrap().push(prompt);
            let next = self.replies.lock().unwrap().pop_front().flatten();
            Box::pin(async move {
                next.ok_or_else(|| {
                    AgentError::Completion(CompletionError::ProviderError(
                        "model offline".to_string(),
                    ))
                })
            })
        }
    }

    fn scripted_agent(
        dir: &tempfile::TempDir,
        max_tool_rounds: usize,
        replies: &[Option<&str>],
    ) -> TodoAgent<ScriptedModel> {
        let mut config = AgentConfig {
            storage: StorageConfig::in_dir(dir.path()),
            ..AgentConfig::default()
        };
        config.agent.max_tool_rounds = max_tool_rounds;
        TodoAgent::with_model(config, ScriptedModel::new(replies)).unwrap()
    }

    fn history_on_disk(dir: &tempfile::TempDir) -> Vec<Message> {
        ConversationStore::open(dir.path().join("conversation_history.json"))
            .unwrap()
            .full_history()
            .to_vec()
    }

    #[tokio::test]
    async fn test_chat_plain_reply_persists_both_messages() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = scripted_agent(&dir, 3, &[Some("Hello! How can I help?")]);

        let reply = agent.chat("hi there").await.unwrap();

        assert_eq!(reply, "Hello! How can I help?");
        assert_eq!(
            history_on_disk(&dir),
            vec![
                Message::human("hi there"),
                Message::assistant("Hello! How can I help?"),
            ]
        );
    }

    #[tokio::test]
    async fn test_chat_dispatches_directive_and_feeds_result_back() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = scripted_agent(
            &dir,
            3,
            &[
                Some(r#"{"tool": "add_todo", "argument": "Buy milk"}"#),
                Some("Done, milk is on your list."),
            ],
        );

        let reply = agent.chat("add buy milk to my list").await.unwrap();

        assert_eq!(reply, "Done, milk is on your list.");
        assert_eq!(agent.todos().tasks().unwrap(), vec!["Buy milk"]);

        let prompts = agent.model.prompts();
        assert_eq!(prompts.len(), 2);
        assert_eq!(prompts[0], "add buy milk to my list");
        assert!(prompts[1].contains("Tool results so far:"));
        assert!(prompts[1].contains("Added 'Buy milk' to your to-do list!"));
    }

    #[tokio::test]
    async fn test_chat_runs_every_directive_in_an_array() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = scripted_agent(
            &dir,
            3,
            &[
                Some(
                    r#"```json
[{"tool": "add_todo", "argument": "Buy milk"}, {"tool": "add_todo", "argument": "Call mom"}]
```"#,
                ),
                Some("Both added."),
            ],
        );

        assert_eq!(agent.chat("add milk and call mom").await.unwrap(), "Both added.");
        assert_eq!(agent.todos().tasks().unwrap(), vec!["Buy milk", "Call mom"]);
    }

    #[tokio::test]
    async fn test_chat_forces_final_answer_after_tool_budget() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = scripted_agent(
            &dir,
            2,
            &[
                Some(r#"{"tool": "list_todos"}"#),
                Some(r#"{"tool": "list_todos"}"#),
                Some("Your list is empty."),
            ],
        );

        let reply = agent.chat("what's on my list?").await.unwrap();

        assert_eq!(reply, "Your list is empty.");
        let prompts = agent.model.prompts();
        assert_eq!(prompts.len(), 3);
        assert!(prompts[2].contains("Do not call any more tools."));
    }

    #[tokio::test]
    async fn test_chat_summarizes_tools_when_model_keeps_calling_them() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = scripted_agent(
            &dir,
            2,
            &[
                Some(r#"{"tool": "add_todo", "argument": "Buy milk"}"#),
                Some(r#"{"tool": "list_todos"}"#),
                Some(r#"{"tool": "list_todos"}"#),
            ],
        );

        let reply = agent.chat("add buy milk").await.unwrap();

        assert_eq!(
            reply,
            "Added 'Buy milk' to your to-do list!\nHere's your current to-do list:\n1. Buy milk"
        );
        assert_eq!(history_on_disk(&dir)[1], Message::assistant(reply));
    }

    #[tokio::test]
    async fn test_chat_apologizes_when_model_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = scripted_agent(&dir, 3, &[None]);

        let reply = agent.chat("add buy milk").await.unwrap();

        assert_eq!(reply, APOLOGY_REPLY);
        assert_eq!(
            history_on_disk(&dir),
            vec![Message::human("add buy milk"), Message::assistant(APOLOGY_REPLY)]
        );
    }

    #[tokio::test]
    async fn test_chat_keeps_tool_effects_when_model_fails_midway() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = scripted_agent(
            &dir,
            3,
            &[Some(r#"{"tool": "add_todo", "argument": "Buy milk"}"#), None],
        );

        assert_eq!(agent.chat("add buy milk").await.unwrap(), APOLOGY_REPLY);
        assert_eq!(agent.todos().tasks().unwrap(), vec!["Buy milk"]);
    }

    #[tokio::test]
    async fn test_chat_cleans_scratchpad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = scripted_agent(
            &dir,
            3,
            &[Some("Thought: the user greets me\nHi Ada, nice to meet you!")],
        );

        let reply = agent.chat("hello, my name is ada").await.unwrap();

        assert_eq!(reply, "Hi Ada, nice to meet you!");
        assert_eq!(agent.display_name(), "Ada");
    }

    #[tokio::test]
    async fn test_chat_falls_back_when_reply_is_only_scratchpad() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = scripted_agent(&dir, 3, &[Some("Final Answer:")]);

        assert_eq!(agent.chat("hi").await.unwrap(), FALLBACK_REPLY);
    }

    #[test]
    fn test_with_model_rejects_invalid_config() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AgentConfig {
            storage: StorageConfig::in_dir(dir.path()),
            ..AgentConfig::default()
        };
        config.context.window = 0;
        assert!(matches!(
            TodoAgent::with_model(config, ScriptedModel::new(&[])),
            Err(AgentError::InvalidConfig(_))
        ));
    }

    fn agent_in(dir: &tempfile::TempDir) -> TodoAgent {
        let config = AgentConfig {
            storage: StorageConfig::in_dir(dir.path()),
            ..AgentConfig::default()
        };
        TodoAgent::new(config).unwrap()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = AgentConfig::default();
        config.agent.max_tool_rounds = 0;
        assert!(matches!(
            TodoAgent::new(config),
            Err(AgentError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_first_name_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent_in(&dir);
        assert_eq!(agent.display_name(), "there");

        assert_eq!(
            agent.remember_name("hello, my name is ada").unwrap(),
            Some("Ada".to_string())
        );
        assert_eq!(agent.remember_name("call me grace").unwrap(), None);
        assert_eq!(agent.display_name(), "Ada");
    }

    #[test]
    fn test_clear_conversation_forgets_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut agent = agent_in(&dir);
        agent.remember_name("i'm ada").unwrap();

        assert_eq!(agent.clear_conversation().unwrap(), CLEARED_REPLY);
        assert_eq!(agent.display_name(), "there");
        assert_eq!(
            agent.remember_name("call me grace").unwrap(),
            Some("Grace".to_string())
        );
    }

    #[test]
    fn test_stores_use_configured_paths() {
        let dir = tempfile::tempdir().unwrap();
        let agent = agent_in(&dir);
        agent.todos().add("Buy milk").unwrap();

        assert_eq!(agent.todos().path(), dir.path().join("todos.json"));
        assert_eq!(
            agent.conversation().path(),
            dir.path().join("conversation_history.json")
        );
        assert!(dir.path().join("todos.json").exists());
    }

    #[test]
    fn test_summarize_exchanges() {
        assert_eq!(summarize_exchanges(&[]), FALLBACK_REPLY);

        let exchanges = vec![
            ToolExchange {
                tool: "add_todo".to_string(),
                argument: "Buy milk".to_string(),
                outcome: ToolOutcome::ok("Added 'Buy milk' to your to-do list!"),
            },
            ToolExchange {
                tool: "list_todos".to_string(),
                argument: String::new(),
                outcome: ToolOutcome::ok("Here's your current to-do list:\n1. Buy milk"),
            },
        ];
        assert_eq!(
            summarize_exchanges(&exchanges),
            "Added 'Buy milk' to your to-do list!\nHere's your current to-do list:\n1. Buy milk"
        );
    }
}
