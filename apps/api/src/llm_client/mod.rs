/// LLM Client: the single point of entry for all text-generation calls in Bloom.
///
/// ARCHITECTURAL RULE: No other module may call a provider API directly.
/// Every generation goes through a `GenerationBackend` held by `LlmClients`.
///
/// Calls are fire-once: no retries, no rate limiting, no application timeout.
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;

pub mod anthropic;
pub mod groq;
pub mod prompts;
pub mod sanitize;

pub use anthropic::AnthropicBackend;
pub use groq::GroqBackend;

/// Upper bound on completion length shared by both providers.
pub const MAX_TOKENS: u32 = 1024;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0} API is not configured")]
    NotConfigured(Provider),

    #[error("Prompt must not be empty")]
    EmptyPrompt,
}

/// The two interchangeable generation backends, chosen per call by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    Claude,
    #[default]
    Groq,
}

impl Provider {
    pub fn label(self) -> &'static str {
        match self {
            Provider::Claude => "Claude",
            Provider::Groq => "Groq",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Provider-reported token usage. Logged only, never used for control decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// The top text completion of one call. `text` may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Generation {
    pub text: String,
    pub usage: Usage,
}

/// One capability: turn a prompt into text.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<Generation, LlmError>;
}

/// Error body shape shared by Anthropic and the OpenAI-compatible Groq API.
#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Builds an `LlmError::Api`, preferring the provider's own `error.message`.
fn api_error(status: u16, body: String) -> LlmError {
    let message = serde_json::from_str::<ProviderError>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api { status, message }
}

/// The configured backends, one slot per `Provider`.
/// An empty slot means the server has no credential for that provider.
#[derive(Clone, Default)]
pub struct LlmClients {
    claude: Option<Arc<dyn GenerationBackend>>,
    groq: Option<Arc<dyn GenerationBackend>>,
}

impl LlmClients {
    /// Builds a backend for every provider that has an API key configured.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let mut clients = Self::default();
        if let Some(key) = &config.anthropic_api_key {
            let backend = AnthropicBackend::new(key.clone(), config.anthropic_api_url.clone())?;
            clients = clients.with_backend(Provider::Claude, Arc::new(backend));
        }
        if let Some(key) = &config.groq_api_key {
            let backend = GroqBackend::new(key.clone(), config.groq_api_url.clone())?;
            clients = clients.with_backend(Provider::Groq, Arc::new(backend));
        }
        Ok(clients)
    }

    pub fn with_backend(mut self, provider: Provider, backend: Arc<dyn GenerationBackend>) -> Self {
        match provider {
            Provider::Claude => self.claude = Some(backend),
            Provider::Groq => self.groq = Some(backend),
        }
        self
    }

    pub fn is_configured(&self, provider: Provider) -> bool {
        self.slot(provider).is_some()
    }

    fn slot(&self, provider: Provider) -> Option<&Arc<dyn GenerationBackend>> {
        match provider {
            Provider::Claude => self.claude.as_ref(),
            Provider::Groq => self.groq.as_ref(),
        }
    }

    /// Sends `prompt` to the chosen provider and returns its top completion.
    pub async fn generate(&self, provider: Provider, prompt: &str) -> Result<Generation, LlmError> {
        if prompt.trim().is_empty() {
            return Err(LlmError::EmptyPrompt);
        }
        let backend = self
            .slot(provider)
            .ok_or(LlmError::NotConfigured(provider))?;

        debug!("Sending {} prompt ({} chars)", provider, prompt.len());
        let generation = backend.generate(prompt).await?;

        info!(
            "{} call succeeded: input_tokens={}, output_tokens={}",
            provider, generation.usage.input_tokens, generation.usage.output_tokens
        );
        Ok(generation)
    }
}
