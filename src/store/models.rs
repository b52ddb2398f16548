use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub unique_code: String,
    /// Device-specific endpoint descriptor. Owner-only: never exposed on
    /// public routes.
    pub notification_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub device_id: Uuid,
    pub nickname: String,
    pub message: String,
    pub is_owner_reply: bool,
    pub created_at: DateTime<Utc>,
}

/// A globally configured endpoint notified for every device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointRecord {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceSummary {
    #[serde(flatten)]
    pub device: Device,
    pub message_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeviceDetail {
    #[serde(flatten)]
    pub device: Device,
    pub messages: Vec<Message>,
}

/// What a finder sees on the public page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicDevice {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub unique_code: String,
    pub messages: Vec<Message>,
}

impl PublicDevice {
    pub fn new(device: &Device, messages: Vec<Message>) -> Self {
        Self {
            id: device.id,
            name: device.name.clone(),
            description: device.description.clone(),
            unique_code: device.unique_code.clone(),
            messages,
        }
    }
}

/// Already-sanitized input for a new device.
#[derive(Debug, Clone, Default)]
pub struct NewDevice {
    pub name: String,
    pub description: Option<String>,
    pub notification_url: Option<String>,
    pub code: Option<String>,
}

/// Partial update; `None` leaves a field unchanged, `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct DeviceUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub notification_url: Option<Option<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EndpointInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}
