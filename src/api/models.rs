use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresetCreatedResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresetUpdatedResponse {
    pub message: String,
    pub changes: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PresetDeletedResponse {
    pub message: String,
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StreamStartedResponse {
    pub message: String,
    pub stream_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AbortAllResponse {
    pub message: String,
    pub aborted: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AbortStreamResponse {
    pub message: String,
    pub stream_id: Uuid,
}
