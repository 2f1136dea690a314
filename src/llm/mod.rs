pub mod lines;
pub mod models;
pub mod ollama;
pub mod openai;

use ollama::OllamaProvider;
use openai::OpenAiProvider;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc::Sender;

use crate::config::AppConfig;
use models::{ChatMessage, ChatOptions, ChatResponse};

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Network Error: {0}")]
    Network(String),
    #[error("API Error: {0}")]
    Api(String),
    #[error("Invalid Response: {0}")]
    InvalidResponse(String),
    #[error("Rate Limited")]
    RateLimited,
}

#[async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    fn default_model(&self) -> &str;

    async fn chat(&self, messages: &[ChatMessage], options: &ChatOptions) -> Result<ChatResponse, LlmError>;

    /// Sends each generated token to `tx` in order. Returns once the upstream
    /// stream ends or the receiver goes away.
    async fn chat_streaming(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
        tx: Sender<String>,
    ) -> Result<(), LlmError>;
}

/// Builds the configured upstream provider.
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_default(config: &AppConfig) -> Option<Arc<dyn LlmProvider>> {
        match config.llm.provider.as_str() {
            "openai" => {
                let cfg = config.llm.openai.as_ref()?;
                Some(Arc::new(OpenAiProvider::new(
                    cfg.api_key.clone(),
                    cfg.api_base.clone(),
                    cfg.default_model.clone(),
                )))
            }
            "ollama" => {
                let cfg = config.llm.ollama.as_ref()?;
                Some(Arc::new(OllamaProvider::new(
                    cfg.base_url.clone(),
                    cfg.default_model.clone(),
                )))
            }
            _ => None,
        }
    }
}
