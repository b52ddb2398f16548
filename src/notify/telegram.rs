use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use tracing::debug;

use crate::notify::adapter::{
    NotificationAdapter, NotificationMessage, OutboundRequest, failure_parts, json_error_field,
    send,
};
use crate::notify::descriptor::EndpointDescriptor;
use crate::notify::error::NotifyError;
use crate::notify::outcome::DispatchOutcome;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram bot messages: `tgram://bottoken/ChatID`.
pub struct TelegramAdapter {
    client: Client,
    api_base: String,
}

impl TelegramAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            api_base: TELEGRAM_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub(crate) fn prepare(
        &self,
        rest: &str,
        message: &NotificationMessage,
    ) -> Result<OutboundRequest, NotifyError> {
        let mut parts = rest.split('/');
        let (Some(bot_token), Some(chat_id)) = (parts.next(), parts.next()) else {
            return Err(NotifyError::validation(
                "Invalid Telegram URL format. Use: tgram://bottoken/ChatID",
            ));
        };

        Ok(OutboundRequest::json(
            format!(
                "{}/bot{bot_token}/sendMessage",
                self.api_base.trim_end_matches('/')
            ),
            json!({
                "chat_id": chat_id,
                "text": format!("*{}*\n\n{}", message.title, message.body),
                "parse_mode": "Markdown",
            }),
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
            let (status, body) = failure_parts(response).await;
            return Err(NotifyError::Delivery {
                backend: "Telegram",
                status,
                detail: json_error_field(&body, "description").unwrap_or_default(),
            });
        }

        debug!(adapter = self.name(), "Telegram notification sent");
        Ok(())
    }
}

#[async_trait]
impl NotificationAdapter for TelegramAdapter {
    fn name(&self) -> &'static str {
        "tgram"
    }

    async fn attempt_deliver(
        &self,
        descriptor: &EndpointDescriptor,
        message: &NotificationMessage,
    ) -> DispatchOutcome {
        self.deliver(descriptor, message).await.into()
    }
}
