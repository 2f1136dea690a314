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

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl OpenAiProvider {
    pub fn new(api_key: String, base_url: String, default_model: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            default_model,
        }
    }

    async fn send(&self, body: &Value) -> Result<reqwest::Response, LlmError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(LlmError::RateLimited);
            }
            return Err(LlmError::Api(format!("OpenAI Error {}: {}", status, text)));
        }
        Ok(response)
    }
}

/// Chat completion request body. Unset `max_tokens`/`n` are left out so the
/// upstream applies its own defaults.
pub fn request_body(model: &str, messages: &[ChatMessage], options: &ChatOptions, stream: bool) -> Value {
    let mut body = json!({
        "model": model,
        "messages": messages,
        "temperature": options.temperature,
        "top_p": options.top_p,
        "frequency_penalty": options.frequency_penalty,
        "presence_penalty": options.presence_penalty,
    });

    if let Some(max_tokens) = options.max_tokens {
        body["max_tokens"] = json!(max_tokens);
    }
    if let Some(n) = options.n {
        body["n"] = json!(n);
    }
    if stream {
        body["stream"] = json!(true);
    }
    body
}

/// Extracts the delta text from one `data:` line of a streamed completion.
pub fn parse_stream_line(line: &str) -> Option<String> {
    let data = line.trim().strip_prefix("data:")?.trim_start();
    if data == "[DONE]" {
        return None;
    }
    let json: Value = serde_json::from_str(data).ok()?;
    json["choices"][0]["delta"]["content"].as_str().map(str::to_string)
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
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

        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LlmError::InvalidResponse("missing choices[0].message.content".to_string()))?
            .to_string();

        let usage = json.get("usage").map(|u| Usage {
            input_tokens: u["prompt_tokens"].as_u64().unwrap_or(0) as u32,
            output_tokens: u["completion_tokens"].as_u64().unwrap_or(0) as u32,
        });

        Ok(ChatResponse {
            role: "assistant".to_string(),
            content,
            model: json["model"].as_str().unwrap_or(model).to_string(),
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
                        debug!("Token receiver dropped, stopping OpenAI stream");
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_includes_sampling_parameters() {
        let options = ChatOptions {
            n: Some(2),
            ..Default::default()
        };
        let body = request_body("gpt-4", &[ChatMessage::User("hi".into())], &options, true);

        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["temperature"], 0.2);
        assert_eq!(body["top_p"], 1.0);
        assert_eq!(body["max_tokens"], 2086);
        assert_eq!(body["n"], 2);
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "user");
    }

    #[test]
    fn body_omits_unset_integers_and_nulls_nan() {
        let options = ChatOptions {
            temperature: f64::NAN,
            max_tokens: None,
            ..Default::default()
        };
        let body = request_body("gpt-4", &[], &options, false);

        assert!(body["temperature"].is_null());
        assert!(body.get("max_tokens").is_none());
        assert!(body.get("n").is_none());
        assert!(body.get("stream").is_none());
    }

    #[test]
    fn parses_delta_lines() {
        let line = r#"data: {"choices":[{"delta":{"content":"Hel"}}]}"#;
        assert_eq!(parse_stream_line(line).as_deref(), Some("Hel"));
        assert_eq!(parse_stream_line("data: [DONE]"), None);
        assert_eq!(parse_stream_line(r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#), None);
        assert_eq!(parse_stream_line(": keep-alive"), None);
    }
}
