pub mod error;
pub mod models;
pub mod routes;
pub mod routes_chat;

use actix_web::web;

use crate::api::error::ApiError;

/// Malformed JSON bodies get the same `{error}` shape as every other 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| ApiError::BadRequest(err.to_string()).into())
}

/// Registers the preset and chat routes. Expects `web::Data<DbPool>` and
/// `web::Data<ChatRelay>` to be registered on the app.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .configure(routes::configure)
        .configure(routes_chat::configure);
}
