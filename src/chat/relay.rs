use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::chat::format::{format_messages, IncomingMessage};
use crate::chat::hub::{EventHub, Subscription};
use crate::chat::sanitize::{sanitize, Param, ParamError, RawParams, SanitizedParams};
use crate::chat::streams::StreamRegistry;
use crate::llm::models::{ChatMessage, ChatOptions, ChatResponse};
use crate::llm::{LlmError, LlmProvider};

/// Capacity of the provider -> hub token queue of a single stream.
const TOKEN_BUFFER: usize = 100;

/// Body of `/chat` and `/trigger`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
    #[serde(flatten)]
    pub params: RawParams,
}

#[derive(Debug, Error)]
pub enum RelayError {
    #[error(transparent)]
    Params(#[from] ParamError),
    #[error(transparent)]
    Provider(#[from] LlmError),
}

/// Maps sanitized parameters onto provider options, filling the relay's
/// defaults for anything the client left out.
pub fn resolve_options(params: &SanitizedParams) -> ChatOptions {
    let defaults = ChatOptions::default();

    let float = |param: Param<f64>, default: f64| match param {
        Param::Absent => default,
        Param::Value(v) => v,
        Param::Invalid => f64::NAN,
    };

    ChatOptions {
        model: params.rest.get("model").and_then(Value::as_str).map(str::to_string),
        temperature: float(params.temperature, defaults.temperature),
        top_p: float(params.top_p, defaults.top_p),
        frequency_penalty: float(params.frequency_penalty, defaults.frequency_penalty),
        presence_penalty: float(params.presence_penalty, defaults.presence_penalty),
        max_tokens: match params.max_tokens {
            Param::Absent => defaults.max_tokens,
            other => other.value(),
        },
        n: params.n.value(),
    }
}

/// Bridges client requests to the upstream provider.
pub struct ChatRelay {
    provider: Arc<dyn LlmProvider>,
    hub: Arc<EventHub>,
    streams: Arc<StreamRegistry>,
    strict_params: bool,
}

impl ChatRelay {
    pub fn new(provider: Arc<dyn LlmProvider>, strict_params: bool) -> Self {
        Self {
            provider,
            hub: Arc::new(EventHub::new()),
            streams: Arc::new(StreamRegistry::new()),
            strict_params,
        }
    }

    pub fn hub(&self) -> &Arc<EventHub> {
        &self.hub
    }

    pub fn streams(&self) -> &Arc<StreamRegistry> {
        &self.streams
    }

    fn prepare(&self, request: ChatRequest) -> Result<(Vec<ChatMessage>, ChatOptions), RelayError> {
        let params = sanitize(request.params);
        if self.strict_params {
            params.validate()?;
        }
        let options = resolve_options(&params);
        info!(
            provider = self.provider.name(),
            model = options.model.as_deref().unwrap_or(self.provider.default_model()),
            messages = request.messages.len(),
            "Resolved chat parameters: {:?}",
            options
        );
        Ok((format_messages(&request.messages), options))
    }

    /// Blocking completion: waits for the whole response.
    pub async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, RelayError> {
        let (messages, options) = self.prepare(request)?;
        let response = self.provider.chat(&messages, &options).await?;
        Ok(response)
    }

    /// Starts a streaming completion in the background and returns its id
    /// right away. Tokens go to every current event subscriber.
    pub fn start_stream(&self, request: ChatRequest) -> Result<Uuid, RelayError> {
        let (messages, options) = self.prepare(request)?;
        let (stream_id, cancelled) = self.streams.register();

        let provider = Arc::clone(&self.provider);
        let hub = Arc::clone(&self.hub);
        let streams = Arc::clone(&self.streams);

        info!("Starting chat stream {}", stream_id);
        tokio::spawn(async move {
            let (tx, mut rx) = mpsc::channel::<String>(TOKEN_BUFFER);
            let produce = provider.chat_streaming(&messages, &options, tx);
            let forward = async {
                let mut emitted = 0usize;
                while let Some(token) = rx.recv().await {
                    let payload = Value::String(token).to_string();
                    debug!("Stream {} token {}", stream_id, payload);
                    hub.broadcast(&payload);
                    emitted += 1;
                }
                emitted
            };

            tokio::select! {
                (result, emitted) = async { tokio::join!(produce, forward) } => match result {
                    Ok(()) => info!("Chat stream {} finished after {} tokens", stream_id, emitted),
                    Err(e) => error!("Chat stream {} failed after {} tokens: {}", stream_id, emitted, e),
                },
                _ = cancelled => info!("Chat stream {} aborted", stream_id),
            }
            streams.finish(stream_id);
        });

        Ok(stream_id)
    }

    pub fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    pub fn abort(&self, stream_id: Uuid) -> bool {
        let aborted = self.streams.cancel(stream_id);
        if aborted {
            info!("Abort requested for chat stream {}", stream_id);
        }
        aborted
    }

    pub fn abort_all(&self) -> usize {
        let aborted = self.streams.cancel_all();
        info!("Abort requested for {} chat stream(s)", aborted);
        aborted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> SanitizedParams {
        sanitize(serde_json::from_value(value).unwrap())
    }

    #[test]
    fn absent_fields_get_relay_defaults() {
        let options = resolve_options(&params(json!({"model": "gpt-4"})));
        assert_eq!(options.model.as_deref(), Some("gpt-4"));
        assert_eq!(options.temperature, 0.2);
        assert_eq!(options.top_p, 1.0);
        assert_eq!(options.frequency_penalty, 0.0);
        assert_eq!(options.presence_penalty, 0.0);
        assert_eq!(options.max_tokens, Some(2086));
        assert_eq!(options.n, None);
    }

    #[test]
    fn supplied_values_win_over_defaults() {
        let options = resolve_options(&params(json!({
            "temperature": "0.9", "top_p": 0.5, "max_tokens": 10, "n": "3", "presence_penalty": "1"
        })));
        assert_eq!(options.model, None);
        assert_eq!(options.temperature, 0.9);
        assert_eq!(options.top_p, 0.5);
        assert_eq!(options.max_tokens, Some(10));
        assert_eq!(options.n, Some(3));
        assert_eq!(options.presence_penalty, 1.0);
    }

    #[test]
    fn invalid_values_are_not_replaced_by_defaults() {
        let options = resolve_options(&params(json!({"temperature": "hot", "max_tokens": "many"})));
        assert!(options.temperature.is_nan());
        assert_eq!(options.max_tokens, None);
    }

    #[test]
    fn chat_request_splits_messages_from_params() {
        let request: ChatRequest = serde_json::from_value(json!({
            "messages": [{"role": "user", "content": "hi"}],
            "model": "gpt-4",
            "temperature": "0.3"
        }))
        .unwrap();
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.params.temperature, Some(json!("0.3")));
        assert_eq!(request.params.rest.get("model"), Some(&json!("gpt-4")));
        assert!(!request.params.rest.contains_key("messages"));
    }
}
