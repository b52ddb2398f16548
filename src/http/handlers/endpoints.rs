use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde_json::{Value, json};

use crate::http::handlers::auth::OwnerAuth;
use crate::http::handlers::error::{ApiError, ApiResult, parse_id};
use crate::http::server::AppState;
use crate::notify::{DispatchOutcome, NotificationEvent};
use crate::store::{EndpointInput, EndpointRecord};

/// Newest first.
pub async fn list_endpoints_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<EndpointRecord>>> {
    let mut endpoints = state.store().endpoints()?;
    endpoints.reverse();
    Ok(Json(endpoints))
}

pub async fn create_endpoint_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
    payload: Result<Json<EndpointInput>, JsonRejection>,
) -> ApiResult<Json<EndpointRecord>> {
    let Json(input) = payload?;
    require_fields(&input)?;
    Ok(Json(state.store().create_endpoint(&input.name, &input.url)?))
}

pub async fn get_endpoint_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EndpointRecord>> {
    let id = parse_id(&id, "Endpoint")?;
    Ok(Json(state.store().endpoint(id)?))
}

pub async fn update_endpoint_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<EndpointInput>, JsonRejection>,
) -> ApiResult<Json<EndpointRecord>> {
    let id = parse_id(&id, "Endpoint")?;
    let Json(input) = payload?;
    require_fields(&input)?;
    Ok(Json(state.store().update_endpoint(id, &input.name, &input.url)?))
}

pub async fn delete_endpoint_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "Endpoint")?;
    state.store().delete_endpoint(id)?;
    Ok(Json(json!({ "success": true })))
}

/// Sends the test notification synchronously and reports the dispatcher's
/// failure reason verbatim.
pub async fn test_endpoint_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "Endpoint")?;
    let endpoint = state.store().endpoint(id)?;
    let message = NotificationEvent::test_notification(&endpoint.name).to_message();

    match state
        .notifier()
        .dispatcher()
        .dispatch_message(&endpoint.url, &message)
        .await
    {
        DispatchOutcome::Delivered => Ok(Json(json!({
            "success": true,
            "message": "Test notification sent!",
        }))),
        DispatchOutcome::Failed { reason } => Err(ApiError::new(
            StatusCode::BAD_REQUEST,
            "NOTIFICATION_FAILED",
            reason,
        )),
    }
}

fn require_fields(input: &EndpointInput) -> ApiResult<()> {
    if input.name.trim().is_empty() || input.url.trim().is_empty() {
        return Err(ApiError::bad_request("Name and URL are required"));
    }
    Ok(())
}
