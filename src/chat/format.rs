use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::llm::models::ChatMessage;

/// A message as sent by the client. The role is kept loose so that missing
/// or non-string roles still format (as user messages).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncomingMessage {
    #[serde(default)]
    pub role: Value,
    #[serde(default)]
    pub content: String,
}

impl IncomingMessage {
    pub fn new(role: &str, content: &str) -> Self {
        Self {
            role: Value::String(role.to_string()),
            content: content.to_string(),
        }
    }
}

pub fn format_message(message: &IncomingMessage) -> ChatMessage {
    let content = message.content.clone();
    match message.role.as_str() {
        Some("system") => ChatMessage::System(content),
        Some("assistant") => ChatMessage::Assistant(content),
        _ => ChatMessage::User(content),
    }
}

pub fn format_messages(messages: &[IncomingMessage]) -> Vec<ChatMessage> {
    messages.iter().map(format_message).collect()
}
