use actix_web::{delete, get, post, put, web, HttpResponse, Result as WebResult};
use tracing::info;

use crate::api::error::ApiError;
use crate::api::models::{PresetCreatedResponse, PresetDeletedResponse, PresetUpdatedResponse};
use crate::db::{self, service::DbService, DbPool, PresetFields};

const NOT_FOUND: &str = "Preset not found";

#[post("")]
pub async fn create_preset(
    pool: web::Data<DbPool>,
    req: web::Json<PresetFields>,
) -> WebResult<HttpResponse, ApiError> {
    let conn = db::lock(&pool);
    let id = DbService::insert_preset(&conn, &req)?;
    info!("Created preset {}", id);

    Ok(HttpResponse::Ok().json(PresetCreatedResponse {
        message: "Preset added successfully".to_string(),
        id,
    }))
}

#[get("")]
pub async fn list_presets(pool: web::Data<DbPool>) -> WebResult<HttpResponse, ApiError> {
    let conn = db::lock(&pool);
    let presets = DbService::list_presets(&conn)?;
    Ok(HttpResponse::Ok().json(presets))
}

#[get("/{id}")]
pub async fn get_preset(pool: web::Data<DbPool>, id: web::Path<i64>) -> WebResult<HttpResponse, ApiError> {
    let conn = db::lock(&pool);

    match DbService::get_preset(&conn, id.into_inner())? {
        Some(preset) => Ok(HttpResponse::Ok().json(preset)),
        None => Err(ApiError::NotFound(NOT_FOUND.to_string())),
    }
}

#[put("/{id}")]
pub async fn update_preset(
    pool: web::Data<DbPool>,
    id: web::Path<i64>,
    req: web::Json<PresetFields>,
) -> WebResult<HttpResponse, ApiError> {
    let conn = db::lock(&pool);
    let id = id.into_inner();

    let changes = DbService::update_preset(&conn, id, &req)?;
    if changes == 0 {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    info!("Updated preset {}", id);

    Ok(HttpResponse::Ok().json(PresetUpdatedResponse {
        message: "Preset updated successfully".to_string(),
        changes,
    }))
}

#[delete("/{id}")]
pub async fn delete_preset(pool: web::Data<DbPool>, id: web::Path<i64>) -> WebResult<HttpResponse, ApiError> {
    let conn = db::lock(&pool);
    let id = id.into_inner();

    if DbService::delete_preset(&conn, id)? == 0 {
        return Err(ApiError::NotFound(NOT_FOUND.to_string()));
    }
    info!("Deleted preset {}", id);

    Ok(HttpResponse::Ok().json(PresetDeletedResponse {
        message: "Preset deleted successfully".to_string(),
        id,
    }))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/presets")
            .service(create_preset)
            .service(list_presets)
            .service(get_preset)
            .service(update_preset)
            .service(delete_preset),
    );
}
