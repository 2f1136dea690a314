use actix_web::{http::StatusCode, test, web, App};
use serde_json::{json, Value};

use chatrelay::config::DatabaseConfig;
use chatrelay::db::{get_connection, DbPool};

fn test_pool() -> DbPool {
    get_connection(&DatabaseConfig {
        path: ":memory:".to_string(),
    })
    .unwrap()
}

fn default_body() -> Value {
    json!({
        "name": "default",
        "model": "gpt-4",
        "temperature": 0.2,
        "max_tokens": 2086,
        "top_p": 1,
        "presence_penalty": 0,
        "frequency_penalty": 0,
        "n": 1,
        "system_message": ""
    })
}

macro_rules! preset_app {
    () => {
        test::init_service(
            App::new()
                .app_data(web::Data::new(test_pool()))
                .app_data(chatrelay::api::json_config())
                .configure(chatrelay::api::routes::configure),
        )
        .await
    };
}

#[actix_web::test]
async fn preset_lifecycle_scenario() {
    let app = preset_app!();

    let req = test::TestRequest::post().uri("/presets").set_json(default_body()).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], 1);
    assert!(body["message"].is_string());

    let req = test::TestRequest::get().uri("/presets").to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list, json!([{"id": 1, "name": "default"}]));

    let req = test::TestRequest::get().uri("/presets/1").to_request();
    let preset: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(preset["model"], "gpt-4");
    assert_eq!(preset["max_tokens"], 2086);
    assert_eq!(preset["system_message"], "");

    let req = test::TestRequest::delete().uri("/presets/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], 1);

    let req = test::TestRequest::get().uri("/presets/1").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Preset not found");
}

#[actix_web::test]
async fn update_replaces_fields_and_reports_changes() {
    let app = preset_app!();

    let req = test::TestRequest::post().uri("/presets").set_json(default_body()).to_request();
    test::call_service(&app, req).await;

    let mut updated = default_body();
    updated["name"] = json!("tuned");
    updated["temperature"] = json!(0.9);
    updated["n"] = json!(2);
    let req = test::TestRequest::put().uri("/presets/1").set_json(&updated).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["changes"], 1);

    let req = test::TestRequest::get().uri("/presets/1").to_request();
    let preset: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(preset["name"], "tuned");
    assert_eq!(preset["temperature"], 0.9);
    assert_eq!(preset["n"], 2);
}

#[actix_web::test]
async fn unknown_ids_are_not_found() {
    let app = preset_app!();

    let req = test::TestRequest::get().uri("/presets/99").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::put().uri("/presets/99").set_json(default_body()).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::delete().uri("/presets/99").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn constraint_violation_is_bad_request_with_engine_message() {
    let app = preset_app!();

    let mut body = default_body();
    body.as_object_mut().unwrap().remove("name");
    let req = test::TestRequest::post().uri("/presets").set_json(&body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].as_str().unwrap().to_lowercase().contains("not null"));
}

#[actix_web::test]
async fn camel_case_system_message_is_accepted() {
    let app = preset_app!();

    let mut body = default_body();
    let obj = body.as_object_mut().unwrap();
    obj.remove("system_message");
    obj.insert("systemMessage".to_string(), json!("be nice"));
    let req = test::TestRequest::post().uri("/presets").set_json(&body).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/presets/1").to_request();
    let preset: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(preset["system_message"], "be nice");
}

#[actix_web::test]
async fn malformed_json_is_bad_request() {
    let app = preset_app!();

    let req = test::TestRequest::post()
        .uri("/presets")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn numeric_strings_are_stored_as_numbers() {
    let app = preset_app!();

    let mut body = default_body();
    body["temperature"] = json!("0.7");
    body["top_p"] = json!(" 0.9");
    body["max_tokens"] = json!(2086.0);
    body["n"] = json!("1");
    let req = test::TestRequest::post().uri("/presets").set_json(&body).to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/presets/1").to_request();
    let preset: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(preset["temperature"], 0.7);
    assert_eq!(preset["top_p"], 0.9);
    assert_eq!(preset["max_tokens"], 2086);
    assert_eq!(preset["n"], 1);
}

#[actix_web::test]
async fn unparseable_float_is_stored_not_rejected() {
    let app = preset_app!();

    let mut body = default_body();
    body["temperature"] = json!("warm");
    let req = test::TestRequest::post().uri("/presets").set_json(&body).to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    // NaN has no JSON form and reads back as null.
    let req = test::TestRequest::get().uri("/presets/1").to_request();
    let preset: Value = test::call_and_read_body_json(&app, req).await;
    assert!(preset["temperature"].is_null());
    assert_eq!(preset["name"], "default");
}
