use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde_json::{json, Value};
use tokio::sync::mpsc::Sender;
use tracing::debug;

use crate::llm::{
    lines::LineBuffer,
    models::{ChatMessage, ChatOptions, ChatResponse, Usage},
    LlmError, LlmProvider,
};

pub struct OllamaProvider {
    client: Client,
    base_url: String,
    default_model: String,
}

impl OllamaProvider {
    pub fn new(base_url: String, default_model: String) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model,
        }
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response, LlmError> {
        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("Ollama Error {}: {}", status, text)));
        }
        Ok(response)
    }
}

/// Ollama takes sampling knobs under `options`; `max_tokens` is `num_predict`.
/// It has no equivalent of `n`.
pub fn request_body(model: &str, messages: &[ChatMessage], options: &ChatOptions, stream: bool) -> Value {
    let mut sampling = json!({
        "temperature": options.temperature,
        "top_p": options.top_p,
        "frequency_penalty": options.frequency_penalty,
        "presence_penalty": options.presence_penalty,
    });
    if let Some(max_tokens) = options.max_tokens {
        sampling["num_predict"] = json!(max_tokens);
    }

    json!({
        "model": model,
        "messages": messages,
        "stream": stream,
        "options": sampling,
    })
}

pub fn parse_stream_line(line: &str) -> Option<String> {
    if line.trim().is_empty() {
        return None;
    }
    let json: Value = serde_json::from_str(line).ok()?;
    json["message"]["content"]
        .as_str()
        .filter(|content| !content.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    async fn chat(&self, messages: &[ChatMessage], options: &ChatOptions) -> Result<ChatResponse, LlmError> {
        let model = options.model.as_deref().unwrap_or(&self.default_model);
        let body = request_body(model, messages, options, false);

        let json: Value = self
            .send(&body)
            .await?
            .json()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let content = json["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::InvalidResponse("missing message.content".to_string()))?
            .to_string();

        let usage = match (json["prompt_eval_count"].as_u64(), json["eval_count"].as_u64()) {
            (Some(input), Some(output)) => Some(Usage {
                input_tokens: input as u32,
                output_tokens: output as u32,
            }),
            _ => None,
        };

        Ok(ChatResponse {
            role: "assistant".to_string(),
            content,
            model: model.to_string(),
            usage,
        })
    }

    async fn chat_streaming(
        &self,
        messages: &[ChatMessage],
        options: &ChatOptions,
        tx: Sender<String>,
    ) -> Result<(), LlmError> {
        let model = options.model.as_deref().unwrap_or(&self.default_model);
        let body = request_body(model, messages, options, true);

        let mut stream = self.send(&body).await?.bytes_stream();
        let mut lines = LineBuffer::new();

        while let Some(chunk) = stream.next().await {
            let bytes = chunk.map_err(|e| LlmError::Network(e.to_string()))?;
            for line in lines.push(&bytes) {
                if let Some(token) = parse_stream_line(&line) {
                    if tx.send(token).await.is_err() {
                        debug!("Token receiver dropped, stopping Ollama stream");
                        return Ok(());
                    }
                }
            }
        }

        if let Some(token) = lines.finish().as_deref().and_then(parse_stream_line) {
            let _ = tx.send(token).await;
        }

        Ok(())
    }
}
