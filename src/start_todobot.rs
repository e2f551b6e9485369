//! Startup helpers for the TodoBot agent.

use crate::agent::TodoAgent;
use crate::common::config::AgentConfig;
use crate::common::errors::AgentResult;

/// Install a `tracing` subscriber writing to stderr.
///
/// Honours `RUST_LOG`; defaults to `warn` so logs stay out of the chat.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

/// Build the agent from the environment-derived configuration.
///
/// # Errors
/// Returns an error if the configuration is invalid or a store cannot be
/// opened.
pub fn initialize() -> AgentResult<TodoAgent> {
    let config = AgentConfig::from_env();
    tracing::info!("Starting TodoBot v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "Ollama endpoint: {}",
        config.llm.base_url.as_deref().unwrap_or("default")
    );
    TodoAgent::new(config)
}
