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

const DISCORD_WEBHOOK_BASE: &str = "https://discord.com/api/webhooks";
const EMBED_COLOR: u32 = 0x3498db;

/// Discord incoming webhooks: `discord://webhook_id/webhook_token`.
pub struct DiscordAdapter {
    client: Client,
    webhook_base: String,
}

impl DiscordAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            webhook_base: DISCORD_WEBHOOK_BASE.to_string(),
        }
    }

    pub fn with_webhook_base(mut self, webhook_base: impl Into<String>) -> Self {
        self.webhook_base = webhook_base.into();
        self
    }

    pub(crate) fn prepare(
        &self,
        rest: &str,
        message: &NotificationMessage,
    ) -> Result<OutboundRequest, NotifyError> {
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        // Only the first two segments are used; anything after the token is ignored.
        let mut parts = rest.split('/');
        let (Some(webhook_id), Some(webhook_token)) = (parts.next(), parts.next()) else {
            return Err(NotifyError::validation(
                "Invalid Discord URL format. Use: discord://webhook_id/webhook_token",
            ));
        };

        let payload = DiscordWebhookPayload {
            embeds: vec![DiscordEmbed {
                title: &message.title,
                description: &message.body,
                color: EMBED_COLOR,
            }],
        };
        let body = serde_json::to_value(&payload)
            .map_err(|err| NotifyError::validation(err.to_string()))?;

        Ok(OutboundRequest::json(
            format!(
                "{}/{webhook_id}/{webhook_token}",
                self.webhook_base.trim_end_matches('/')
            ),
            body,
        ))
    }

    async fn deliver(
        &self,
        descriptor: &EndpointDescriptor,
        message: &NotificationMessage,
    ) -> Result<(), NotifyError> {
        let request = self.prepare(descriptor.rest(), message)?;
        let response = send(&self.client, request).await?;

        if !response.status().is_success() {
            let (status, detail) = failure_parts(response).await;
            return Err(NotifyError::Delivery {
                backend: "Discord",
                status,
                detail,
            });
        }

        debug!(adapter = self.name(), "Discord notification sent");
        Ok(())
    }
}

#[async_trait]
impl NotificationAdapter for DiscordAdapter {
    fn name(&self) -> &'static str {
        "discord"
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
struct DiscordWebhookPayload<'a> {
    embeds: Vec<DiscordEmbed<'a>>,
}

#[derive(Debug, Serialize)]
struct DiscordEmbed<'a> {
    title: &'a str,
    description: &'a str,
    color: u32,
}
