//! HTTP error mapping.
//!
//! Store failures surface as 400 with the engine's own message, lookups that
//! miss are 404, and upstream provider failures are 502 so clients can tell
//! them apart from their own mistakes.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::chat::RelayError;
use crate::llm::LlmError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Database(#[from] duckdb::Error),

    #[error(transparent)]
    Provider(#[from] LlmError),
}

impl From<RelayError> for ApiError {
    fn from(e: RelayError) -> Self {
        match e {
            RelayError::Params(e) => ApiError::BadRequest(e.to_string()),
            RelayError::Provider(e) => ApiError::Provider(e),
        }
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) | ApiError::Database(_) => StatusCode::BAD_REQUEST,
            ApiError::Provider(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let body = match self {
            ApiError::NotFound(message) => json!({ "message": message }),
            ApiError::Database(e) => {
                warn!(error = %e, "preset store error");
                json!({ "error": e.to_string() })
            }
            ApiError::Provider(e) => {
                error!(error = %e, "upstream provider error");
                json!({ "error": e.to_string() })
            }
            ApiError::BadRequest(message) => json!({ "error": message }),
        };
        HttpResponse::build(self.status_code()).json(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::sanitize::ParamError;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(ApiError::NotFound("Preset not found".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::BadRequest("bad".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::from(LlmError::RateLimited).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            ApiError::from(RelayError::Params(ParamError::Invalid("n"))).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
