use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::notify::adapter::{
    NotificationAdapter, NotificationMessage, OutboundRequest, failure_parts, send,
};
use crate::notify::descriptor::EndpointDescriptor;
use crate::notify::error::NotifyError;
use crate::notify::outcome::DispatchOutcome;

/// Generic JSON webhook. The descriptor itself is the target URL.
pub struct WebhookAdapter {
    client: Client,
}

impl WebhookAdapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub(crate) fn prepare(
        &self,
        url: &str,
        message: &NotificationMessage,
    ) -> Result<OutboundRequest, NotifyError> {
        let payload = WebhookPayload {
            title: &message.title,
            body: &message.body,
            kind: "info",
        };
        let body = serde_json::to_value(&payload)
            .map_err(|err| NotifyError::validation(err.to_string()))?;

        Ok(OutboundRequest::json(url.to_string(), body))
    }

    async fn deliver(
        &self,
        descriptor: &EndpointDescriptor,
        message: &NotificationMessage,
    ) -> Result<(), NotifyError> {
        let request = self.prepare(descriptor.raw(), message)?;
        let response = send(&self.client, request).await?;

        if !response.status().is_success() {
            let (status, _) = failure_parts(response).await;
            return Err(NotifyError::Delivery {
                backend: "HTTP",
                status,
                detail: String::new(),
            });
        }

        debug!(adapter = self.name(), "Webhook notification sent");
        Ok(())
    }
}

#[async_trait]
impl NotificationAdapter for WebhookAdapter {
    fn name(&self) -> &'static str {
        "webhook"
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
struct WebhookPayload<'a> {
    title: &'a str,
    body: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::adapter::RequestBody;
    use serde_json::json;

    #[test]
    fn posts_json_to_descriptor_url() {
        let adapter = WebhookAdapter::new(Client::new());
        let request = adapter
            .prepare(
                "https://hooks.example.com/lost?key=1",
                &NotificationMessage::new("Lost & Found Alert", "Keys"),
            )
            .unwrap();

        assert_eq!(request.url, "https://hooks.example.com/lost?key=1");
        assert!(request.headers.is_empty());
        assert_eq!(
            request.body,
            RequestBody::Json(json!({
                "title": "Lost & Found Alert",
                "body": "Keys",
                "type": "info",
            }))
        );
    }
}
