use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};

use crate::http::handlers::auth::OwnerAuth;
use crate::http::handlers::error::{ApiError, ApiResult, parse_id};
use crate::http::server::AppState;
use crate::sanitize;
use crate::store::{Device, DeviceDetail, DeviceSummary, DeviceUpdate, Message, NewDevice};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDeviceInput {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default, alias = "appriseUrl")]
    notification_url: Option<String>,
}

/// For PUT: an absent field is left alone, `null` or `""` clears it.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDeviceInput {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    description: Option<Option<String>>,
    #[serde(default, alias = "appriseUrl", deserialize_with = "present")]
    notification_url: Option<Option<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReplyInput {
    #[serde(default)]
    nickname: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

pub async fn list_devices_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<DeviceSummary>>> {
    Ok(Json(state.store().list_devices()?))
}

pub async fn create_device_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
    payload: Result<Json<CreateDeviceInput>, JsonRejection>,
) -> ApiResult<Json<Device>> {
    let Json(input) = payload?;
    let name = sanitize::sanitize_device_name(input.name.as_deref().unwrap_or_default());
    if name.is_empty() {
        return Err(ApiError::bad_request("Device name is required"));
    }

    let device = state.store().create_device(NewDevice {
        name,
        description: non_empty(input.description.as_deref().map(sanitize::sanitize_description)),
        notification_url: input
            .notification_url
            .as_deref()
            .and_then(sanitize::sanitize_descriptor),
        code: None,
    })?;
    Ok(Json(device))
}

pub async fn get_device_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeviceDetail>> {
    let id = parse_id(&id, "Device")?;
    Ok(Json(state.store().device(id)?))
}

pub async fn update_device_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateDeviceInput>, JsonRejection>,
) -> ApiResult<Json<Device>> {
    let id = parse_id(&id, "Device")?;
    let Json(input) = payload?;

    let name = input
        .name
        .as_deref()
        .map(sanitize::sanitize_device_name)
        .filter(|name| !name.is_empty());
    let update = DeviceUpdate {
        name,
        description: input
            .description
            .map(|value| non_empty(value.as_deref().map(sanitize::sanitize_description))),
        notification_url: input
            .notification_url
            .map(|value| value.as_deref().and_then(sanitize::sanitize_descriptor)),
    };
    Ok(Json(state.store().update_device(id, update)?))
}

pub async fn delete_device_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "Device")?;
    state.store().delete_device(id)?;
    Ok(Json(json!({ "success": true })))
}

/// Invalidates the printed QR code by issuing a new public code.
pub async fn regenerate_code_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Device>> {
    let id = parse_id(&id, "Device")?;
    Ok(Json(state.store().regenerate_code(id)?))
}

pub async fn list_messages_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Message>>> {
    let id = parse_id(&id, "Device")?;
    Ok(Json(state.store().device(id)?.messages))
}

/// Owner replies show up on the public page; they never notify.
pub async fn owner_reply_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ReplyInput>, JsonRejection>,
) -> ApiResult<Json<Message>> {
    let id = parse_id(&id, "Device")?;
    let Json(input) = payload?;
    let nickname = sanitize::sanitize_nickname(input.nickname.as_deref().unwrap_or_default());
    let message = sanitize::sanitize_message(input.message.as_deref().unwrap_or_default());
    if nickname.is_empty() || message.is_empty() {
        return Err(ApiError::bad_request("Nickname and message are required"));
    }
    Ok(Json(state.store().add_message(id, nickname, message, true)?))
}

pub async fn clear_messages_handler(
    _auth: OwnerAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_id(&id, "Device")?;
    state.store().clear_messages(id)?;
    Ok(Json(json!({ "success": true, "message": "All messages cleared" })))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.is_empty())
}
