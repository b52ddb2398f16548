use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::notify::adapter::{
    NotificationAdapter, NotificationMessage, OutboundRequest, failure_parts, send,
};
use crate::notify::descriptor::EndpointDescriptor;
use crate::notify::error::NotifyError;
use crate::notify::outcome::DispatchOutcome;

const PUSHOVER_MESSAGES_URL: &str = "https://api.pushover.net/1/messages.json";

/// Pushover gateway: `pushover://user_key@api_token`.
pub struct PushoverAdapter {
    client: Client,
    messages_url: String,
}

impl PushoverAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            messages_url: PUSHOVER_MESSAGES_URL.to_string(),
        }
    }

    pub fn with_messages_url(mut self, messages_url: impl Into<String>) -> Self {
        self.messages_url = messages_url.into();
        self
    }

    pub(crate) fn prepare(
        &self,
        rest: &str,
        message: &NotificationMessage,
    ) -> Result<OutboundRequest, NotifyError> {
        let mut parts = rest.split('@');
        let user_key = parts.next().unwrap_or_default();
        let api_token = parts.next().unwrap_or_default();
        if user_key.is_empty() || api_token.is_empty() {
            return Err(NotifyError::validation(
                "Invalid Pushover URL format. Use: pushover://user_key@api_token",
            ));
        }

        let payload = PushoverPayload {
            token: api_token,
            user: user_key,
            title: &message.title,
            message: &message.body,
        };
        let body = serde_json::to_value(&payload)
            .map_err(|err| NotifyError::validation(err.to_string()))?;

        Ok(OutboundRequest::json(self.messages_url.clone(), body))
    }

    async fn deliver(
        &self,
        descriptor: &EndpointDescriptor,
        message: &NotificationMessage,
    ) -> Result<(), NotifyError> {
        let request = self.prepare(descriptor.rest(), message)?;
        let response = send(&self.client, request).await?;

        if !response.status().is_success() {
            let (status, body) = failure_parts(response).await;
            return Err(NotifyError::Delivery {
                backend: "Pushover",
                status,
                detail: pushover_errors(&body),
            });
        }

        debug!(adapter = self.name(), "Pushover notification sent");
        Ok(())
    }
}

#[async_trait]
impl NotificationAdapter for PushoverAdapter {
    fn name(&self) -> &'static str {
        "pushover"
    }

    async fn attempt_deliver(
        &self,
        descriptor: &EndpointDescriptor,
        message: &NotificationMessage,
    ) -> DispatchOutcome {
        self.deliver(descriptor, message).await.into()
    }
}

#[derive(Debug, Serialize)]
struct PushoverPayload<'a> {
    token: &'a str,
    user: &'a str,
    title: &'a str,
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct PushoverErrorBody {
    #[serde(default)]
    errors: Vec<String>,
}

fn pushover_errors(body: &str) -> String {
    serde_json::from_str::<PushoverErrorBody>(body)
        .map(|parsed| parsed.errors.join(", "))
        .unwrap_or_default()
}
