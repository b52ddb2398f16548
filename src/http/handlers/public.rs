use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;

use crate::http::handlers::error::{ApiError, ApiResult};
use crate::http::server::AppState;
use crate::notify::NotificationEvent;
use crate::ratelimit::{RateLimitDecision, RateLimitPolicy};
use crate::sanitize;
use crate::store::{Device, Message, PublicDevice};

#[derive(Debug, Default, Deserialize)]
pub struct PublicMessageInput {
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Handles GET /api/public/device/{code}.
///
/// Returns the finder view and notifies the owner in the background.
pub async fn public_device_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(code): Path<String>,
) -> ApiResult<Response> {
    let key = format!("public-device:{}", client_ip(&headers));
    if let Some(limited) = enforce_limit(&state, &key, state.policies().read).await {
        return Ok(limited);
    }

    let detail = state.store().device_by_code(&code)?;
    notify_owner(&state, &detail.device, NotificationEvent::device_scanned(&detail.device.name));

    Ok(Json(PublicDevice::new(&detail.device, detail.messages)).into_response())
}

/// Handles POST /api/public/device/{code}/message.
pub async fn public_message_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(code): Path<String>,
    payload: Result<Json<PublicMessageInput>, JsonRejection>,
) -> ApiResult<Response> {
    let key = format!("public-message:{}", client_ip(&headers));
    if let Some(limited) = enforce_limit(&state, &key, state.policies().write).await {
        return Ok(limited);
    }

    let Json(input) = payload?;
    let nickname = sanitize::sanitize_nickname(input.nickname.as_deref().unwrap_or_default());
    let message = sanitize::sanitize_message(input.message.as_deref().unwrap_or_default());
    if nickname.is_empty() || message.is_empty() {
        return Err(ApiError::bad_request("Nickname and message are required"));
    }

    let device = state.store().device_by_code(&code)?.device;
    let stored: Message = state
        .store()
        .add_message(device.id, nickname.clone(), message.clone(), false)?;
    notify_owner(
        &state,
        &device,
        NotificationEvent::message_received(&device.name, nickname, message),
    );

    Ok(Json(stored).into_response())
}

/// Fire-and-forget fan-out. Delivery results never reach the response.
fn notify_owner(state: &AppState, device: &Device, event: NotificationEvent) {
    match state.store().notification_targets(device) {
        Ok(targets) => {
            state.notifier().spawn(targets, event);
        }
        Err(err) => {
            warn!(error = %err, event_type = event.event_type(), "Could not load notification targets");
        }
    }
}

async fn enforce_limit(state: &AppState, key: &str, policy: RateLimitPolicy) -> Option<Response> {
    let limiter = state.rate_limiter()?;
    let decision = limiter.check(key, policy).await;
    (!decision.allowed).then(|| too_many_requests(&decision))
}

fn too_many_requests(decision: &RateLimitDecision) -> Response {
    let retry_after = decision.retry_after_secs.max(1);
    let mut response = (
        StatusCode::TOO_MANY_REQUESTS,
        Json(json!({
            "error": "Too many requests",
            "retryAfter": retry_after,
        })),
    )
        .into_response();

    let headers = response.headers_mut();
    headers.insert(header::RETRY_AFTER, HeaderValue::from(retry_after));
    headers.insert("x-ratelimit-remaining", HeaderValue::from(decision.remaining));
    headers.insert("x-ratelimit-reset", HeaderValue::from(decision.reset_at_ms));
    response
}

/// First `x-forwarded-for` entry, then `x-real-ip`, then `cf-connecting-ip`.
pub fn client_ip(headers: &HeaderMap) -> String {
    let header_str = |name: &str| {
        headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    };

    if let Some(forwarded) = header_str("x-forwarded-for") {
        if let Some(first) = forwarded.split(',').next() {
            return first.trim().to_string();
        }
    }
    header_str("x-real-ip")
        .or_else(|| header_str("cf-connecting-ip"))
        .unwrap_or("unknown")
        .to_string()
}
