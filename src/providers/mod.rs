//! AI provider integrations

mod gemini;
mod openai_compat;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{LlmSettings, PromptTemplate, RenderedPrompt};
use crate::conversation::Message;

pub use gemini::{GeminiConfig, GeminiProvider};
pub use openai_compat::{OpenAICompatConfig, OpenAICompatProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Anything that can answer a user turn given the conversation so far
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, history: &[Message], input: &str) -> Result<String, ProviderError>;
}

pub enum Provider {
    Gemini(GeminiProvider),
    OpenAICompat(OpenAICompatProvider),
}

impl Provider {
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, ProviderError> {
        if settings.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured(settings.provider.clone()));
        }

        match settings.provider.to_lowercase().as_str() {
            "gemini" => {
                let mut config = GeminiConfig::new(settings.api_key.clone());
                if let Some(ref model) = settings.model {
                    config.model = model.clone();
                }
                if let Some(ref url) = settings.base_url {
                    config.base_url = url.clone();
                }
                config.temperature = settings.temperature;
                config.max_output_tokens = settings.max_output_tokens;
                config.timeout_secs = settings.timeout_secs;
                Ok(Provider::Gemini(GeminiProvider::new(config)?))
            }
            "openai" => {
                let mut config = OpenAICompatConfig::openai(settings.api_key.clone());
                if let Some(ref model) = settings.model {
                    config.default_model = model.clone();
                }
                if let Some(ref url) = settings.base_url {
                    config.base_url = url.clone();
                }
                config.temperature = settings.temperature;
                config.max_tokens = settings.max_output_tokens;
                config.timeout_secs = settings.timeout_secs;
                Ok(Provider::OpenAICompat(OpenAICompatProvider::new(config)?))
            }
            other => Err(ProviderError::UnknownProvider(other.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Provider::Gemini(_) => "Google Gemini",
            Provider::OpenAICompat(_) => "OpenAI",
        }
    }

    pub async fn chat(&self, prompt: &RenderedPrompt) -> Result<Message, ProviderError> {
        match self {
            Provider::Gemini(p) => p.chat(prompt).await,
            Provider::OpenAICompat(p) => p.chat(prompt).await,
        }
    }
}

/// A provider paired with the prompt template it is always called through
pub struct LlmClient {
    provider: Provider,
    template: PromptTemplate,
}

impl LlmClient {
    pub fn new(provider: Provider, template: PromptTemplate) -> Self {
        Self { provider, template }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(&self, history: &[Message], input: &str) -> Result<String, ProviderError> {
        let prompt = self.template.render(history, input);
        tracing::debug!(
            provider = self.provider.name(),
            turns = prompt.turns.len(),
            "Sending prompt"
        );
        let reply = self.provider.chat(&prompt).await?;
        Ok(reply.content)
    }
}
