//! Completion model seam for the agent, with the Ollama implementation.

use std::future::Future;
use std::pin::Pin;

use reqwest::Client as ReqwestClient;
use rig::client::{CompletionClient, Nothing};
use rig::completion::CompletionModel;
use rig::message::AssistantContent;
use rig::providers::ollama;

use crate::common::config::LlmConfig;
use crate::common::errors::{AgentError, AgentResult};

/// Boxed future type for chat model calls.
pub type ChatFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait abstraction over the model answering the agent.
pub trait ChatModel: Send + Sync {
    /// Send one prompt under `preamble` and return the reply text.
    ///
    /// # Errors
    /// Returns an error if the completion request fails.
    fn complete<'a>(
        &'a self,
        preamble: &'a str,
        prompt: String,
    ) -> ChatFuture<'a, AgentResult<String>>;
}

/// Ollama chat model using the Rig provider.
pub struct OllamaChatModel {
    model: ollama::CompletionModel,
    temperature: f64,
    max_tokens: Option<u64>,
}

impl OllamaChatModel {
    /// Create the model from config.
    ///
    /// # Errors
    /// Returns an error if the client cannot be built.
    pub fn new(llm: &LlmConfig) -> AgentResult<Self> {
        let builder = ollama::Client::<ReqwestClient>::builder().api_key(Nothing);
        let builder = if let Some(base_url) = &llm.base_url {
            builder.base_url(base_url)
        } else {
            builder
        };
        let client = builder.build().map_err(AgentError::from)?;
        Ok(Self {
            model: client.completion_model(llm.model.clone()),
            temperature: llm.temperature,
            max_tokens: llm.max_tokens,
        })
    }
}

impl ChatModel for OllamaChatModel {
    fn complete<'a>(
        &'a self,
        preamble: &'a str,
        prompt: String,
    ) -> ChatFuture<'a, AgentResult<String>> {
        Box::pin(async move {
            let request = self
                .model
                .completion_request(prompt)
                .preamble(preamble.to_string())
                .temperature(self.temperature)
                .max_tokens_opt(self.max_tokens)
                .build();

            let response = self.model.completion(request).await?;
            Ok(extract_text(&response.choice))
        })
    }
}

fn extract_text(choice: &rig::OneOrMany<AssistantContent>) -> String {
    let mut out = String::new();
    for content in choice.iter() {
        if let AssistantContent::Text(text) = content {
            out.push_str(&text.text);
        }
    }
    out
}
