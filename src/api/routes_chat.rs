use actix_web::http::header;
use actix_web::{get, post, web, HttpResponse, Result as WebResult};
use bytes::Bytes;
use futures_util::Stream;
use std::time::Duration;
use tokio::time::interval;
use tracing::info;
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::models::{AbortAllResponse, AbortStreamResponse, StreamStartedResponse};
use crate::chat::hub::Subscription;
use crate::chat::{ChatRelay, ChatRequest};

const KEEP_ALIVE: Duration = Duration::from_secs(15);

/// SSE frames for one subscriber: a `: connected` comment, then one
/// `data:` frame per token, with a `: ping` comment after `keep_alive` of
/// silence. A failed ping write drops the stream and with it the subscription.
pub fn event_stream(
    mut subscription: Subscription,
    keep_alive: Duration,
) -> impl Stream<Item = Result<Bytes, actix_web::Error>> {
    async_stream::stream! {
        yield Ok::<Bytes, actix_web::Error>(Bytes::from_static(b": connected\n\n"));

        let mut ticker = interval(keep_alive);
        ticker.reset();
        loop {
            let frame = tokio::select! {
                payload = subscription.recv() => match payload {
                    Some(payload) => Bytes::from(format!("data: {}\n\n", payload)),
                    None => break,
                },
                _ = ticker.tick() => Bytes::from_static(b": ping\n\n"),
            };
            ticker.reset();
            yield Ok::<Bytes, actix_web::Error>(frame);
        }
    }
}

/// Long-lived SSE feed of every token broadcast while the connection is open.
#[get("/events")]
pub async fn events(relay: web::Data<ChatRelay>) -> HttpResponse {
    let subscription = relay.subscribe();
    info!("SSE subscriber {} connected", subscription.id());

    HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((header::CACHE_CONTROL, "no-cache"))
        .streaming(event_stream(subscription, KEEP_ALIVE))
}

#[post("/trigger")]
pub async fn trigger(
    relay: web::Data<ChatRelay>,
    req: web::Json<ChatRequest>,
) -> WebResult<HttpResponse, ApiError> {
    let stream_id = relay.start_stream(req.into_inner())?;

    Ok(HttpResponse::Ok().json(StreamStartedResponse {
        message: "Chat stream started".to_string(),
        stream_id,
    }))
}

#[post("/chat")]
pub async fn chat(relay: web::Data<ChatRelay>, req: web::Json<ChatRequest>) -> WebResult<HttpResponse, ApiError> {
    let response = relay.complete(req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(response))
}

#[post("/abort")]
pub async fn abort_all(relay: web::Data<ChatRelay>) -> HttpResponse {
    let aborted = relay.abort_all();
    HttpResponse::Ok().json(AbortAllResponse {
        message: "Abort signalled".to_string(),
        aborted,
    })
}

#[post("/abort/{stream_id}")]
pub async fn abort_stream(
    relay: web::Data<ChatRelay>,
    stream_id: web::Path<Uuid>,
) -> WebResult<HttpResponse, ApiError> {
    let stream_id = stream_id.into_inner();
    if !relay.abort(stream_id) {
        return Err(ApiError::NotFound("Stream not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(AbortStreamResponse {
        message: "Abort signalled".to_string(),
        stream_id,
    }))
}

#[get("/streams")]
pub async fn list_streams(relay: web::Data<ChatRelay>) -> HttpResponse {
    HttpResponse::Ok().json(relay.streams().ids())
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(events)
        .service(trigger)
        .service(chat)
        .service(abort_all)
        .service(abort_stream)
        .service(list_streams);
}
