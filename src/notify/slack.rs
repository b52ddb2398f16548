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

const SLACK_HOOKS_BASE: &str = "https://hooks.slack.com/services";
const FORMAT_HINT: &str = "Invalid Slack URL format. Use: slack://TokenA/TokenB/TokenC";

/// Slack incoming webhooks: `slack://TokenA/TokenB/TokenC`.
///
/// Exactly three non-empty tokens are accepted. A single trailing slash is
/// tolerated, so `a/b/c/` is the same as `a/b/c`.
pub struct SlackAdapter {
    client: Client,
    hooks_base: String,
}

impl SlackAdapter {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            hooks_base: SLACK_HOOKS_BASE.to_string(),
        }
    }

    pub fn with_hooks_base(mut self, hooks_base: impl Into<String>) -> Self {
        self.hooks_base = hooks_base.into();
        self
    }

    pub(crate) fn prepare(
        &self,
        rest: &str,
        message: &NotificationMessage,
    ) -> Result<OutboundRequest, NotifyError> {
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        let tokens: Vec<&str> = rest.split('/').collect();
        let [token_a, token_b, token_c] = tokens.as_slice() else {
            return Err(NotifyError::validation(FORMAT_HINT));
        };
        if [token_a, token_b, token_c].iter().any(|token| token.is_empty()) {
            return Err(NotifyError::validation(FORMAT_HINT));
        }

        let payload = SlackWebhookPayload {
            text: format!("*{}*\n{}", message.title, message.body),
        };
        let body = serde_json::to_value(&payload)
            .map_err(|err| NotifyError::validation(err.to_string()))?;

        Ok(OutboundRequest::json(
            format!(
                "{}/{token_a}/{token_b}/{token_c}",
                self.hooks_base.trim_end_matches('/')
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
                backend: "Slack",
                status,
                detail,
            });
        }

        debug!(adapter = self.name(), "Slack notification sent");
        Ok(())
    }
}

#[async_trait]
impl NotificationAdapter for SlackAdapter {
    fn name(&self) -> &'static str {
        "slack"
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
struct SlackWebhookPayload {
    text: String,
}
