use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::notify::adapter::NotificationMessage;

/// Logical events that fan out to an owner's endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NotificationEvent {
    DeviceScanned {
        timestamp: DateTime<Utc>,
        device_name: String,
    },
    MessageReceived {
        timestamp: DateTime<Utc>,
        device_name: String,
        nickname: String,
        message: String,
    },
    TestNotification {
        timestamp: DateTime<Utc>,
        endpoint_name: String,
    },
}

impl NotificationEvent {
    pub fn device_scanned(device_name: impl Into<String>) -> Self {
        Self::DeviceScanned {
            timestamp: Utc::now(),
            device_name: device_name.into(),
        }
    }

    pub fn message_received(
        device_name: impl Into<String>,
        nickname: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MessageReceived {
            timestamp: Utc::now(),
            device_name: device_name.into(),
            nickname: nickname.into(),
            message: message.into(),
        }
    }

    pub fn test_notification(endpoint_name: impl Into<String>) -> Self {
        Self::TestNotification {
            timestamp: Utc::now(),
            endpoint_name: endpoint_name.into(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::DeviceScanned { timestamp, .. } => *timestamp,
            Self::MessageReceived { timestamp, .. } => *timestamp,
            Self::TestNotification { timestamp, .. } => *timestamp,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::DeviceScanned { .. } => "device_scanned",
            Self::MessageReceived { .. } => "message_received",
            Self::TestNotification { .. } => "test_notification",
        }
    }

    pub fn title(&self) -> String {
        match self {
            Self::DeviceScanned { .. } => "Lost & Found Alert".to_string(),
            Self::MessageReceived { device_name, .. } => format!("New Message for {device_name}"),
            Self::TestNotification { .. } => "Test Notification".to_string(),
        }
    }

    pub fn body(&self) -> String {
        match self {
            Self::DeviceScanned { device_name, .. } => {
                format!("Someone scanned the QR code for: {device_name}")
            }
            Self::MessageReceived {
                nickname, message, ..
            } => format!("From: {nickname}\n\n{message}"),
            Self::TestNotification {
                timestamp,
                endpoint_name,
            } => format!(
                "This is a test notification from Lost & Found Tracker.\n\nEndpoint: {endpoint_name}\nTime: {}",
                timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
            ),
        }
    }

    pub fn to_message(&self) -> NotificationMessage {
        NotificationMessage::new(self.title(), self.body())
    }
}
