use serde::{Deserialize, Serialize};

/// A provider-ready message. Serializes as `{"role": ..., "content": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", content = "content", rename_all = "lowercase")]
pub enum ChatMessage {
    System(String),
    Assistant(String),
    User(String),
}

impl ChatMessage {
    pub fn content(&self) -> &str {
        match self {
            ChatMessage::System(c) | ChatMessage::Assistant(c) | ChatMessage::User(c) => c,
        }
    }
}

/// Resolved sampling parameters for a single provider call.
///
/// Built fresh for every request and never mutated afterwards. A `NaN` float
/// is a value that failed to parse upstream and is forwarded as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    pub model: Option<String>,
    pub temperature: f64,
    pub top_p: f64,
    pub frequency_penalty: f64,
    pub presence_penalty: f64,
    pub max_tokens: Option<i64>,
    pub n: Option<i64>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: 0.2,
            top_p: 1.0,
            frequency_penalty: 0.0,
            presence_penalty: 0.0,
            max_tokens: Some(2086),
            n: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub role: String,
    pub content: String,
    pub model: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}
