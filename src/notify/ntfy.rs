use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::Client;
use tracing::debug;

use crate::notify::adapter::{
    NotificationAdapter, NotificationMessage, OutboundRequest, RequestBody, failure_parts,
    header_value, send,
};
use crate::notify::descriptor::EndpointDescriptor;
use crate::notify::error::NotifyError;
use crate::notify::outcome::DispatchOutcome;

pub const DEFAULT_NTFY_HOST: &str = "ntfy.sh";

/// Topic push over ntfy.
///
/// Rest forms: `topic`, `host/topic`, `user:pass@host/topic`. The `ntfys`
/// variant always uses https; plain `ntfy` uses https only for the public
/// default host.
pub struct NtfyAdapter {
    client: Client,
    secure: bool,
    default_host: String,
}

impl NtfyAdapter {
    pub fn new(client: Client, secure: bool) -> Self {
        Self {
            client,
            secure,
            default_host: DEFAULT_NTFY_HOST.to_string(),
        }
    }

    pub fn with_default_host(mut self, host: impl Into<String>) -> Self {
        self.default_host = host.into();
        self
    }

    pub(crate) fn prepare(
        &self,
        rest: &str,
        message: &NotificationMessage,
    ) -> Result<OutboundRequest, NotifyError> {
        let mut host = self.default_host.as_str();
        let mut topic = rest;
        let mut auth = None;

        if let Some((host_part, remainder)) = rest.split_once('/') {
            topic = remainder;
            match host_part.split_once('@') {
                Some((credentials, host_name)) => {
                    // Anything after a second '@' is dropped.
                    host = host_name.split('@').next().unwrap_or_default();
                    // Encoded as written: no percent-decoding and no ':' required.
                    auth = Some(BASE64_STANDARD.encode(credentials));
                }
                None => host = host_part,
            }
        }

        let protocol = if self.secure || host == self.default_host {
            "https"
        } else {
            "http"
        };

        let mut headers = vec![
            ("Title", header_value("Title", &message.title)?),
            ("Content-Type", "text/plain".to_string()),
        ];
        if let Some(auth) = auth {
            headers.push(("Authorization", format!("Basic {auth}")));
        }

        Ok(OutboundRequest {
            url: format!("{protocol}://{host}/{topic}"),
            headers,
            body: RequestBody::Text(message.body.clone()),
        })
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
                backend: "ntfy",
                status,
                detail,
            });
        }

        debug!(adapter = self.name(), "ntfy notification sent");
        Ok(())
    }
}

#[async_trait]
impl NotificationAdapter for NtfyAdapter {
    fn name(&self) -> &'static str {
        if self.secure { "ntfys" } else { "ntfy" }
    }

    async fn attempt_deliver(
        &self,
        descriptor: &EndpointDescriptor,
        message: &NotificationMessage,
    ) -> DispatchOutcome {
        self.deliver(descriptor, message).await.into()
    }
}
