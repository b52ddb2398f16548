use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::HeaderValue;
use reqwest::{Client, Response};
use serde::Serialize;

use crate::notify::descriptor::EndpointDescriptor;
use crate::notify::error::NotifyError;
use crate::notify::outcome::DispatchOutcome;

/// Title and body of one notification. Adapters treat both as opaque text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NotificationMessage {
    pub title: String,
    pub body: String,
}

impl NotificationMessage {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// One notification backend protocol.
///
/// Implementations must never panic or propagate errors: every failure,
/// including malformed descriptor payloads, comes back as
/// [`DispatchOutcome::Failed`].
#[async_trait]
pub trait NotificationAdapter: Send + Sync {
    fn name(&self) -> &'static str;

    async fn attempt_deliver(
        &self,
        descriptor: &EndpointDescriptor,
        message: &NotificationMessage,
    ) -> DispatchOutcome;
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RequestBody {
    Text(String),
    Json(serde_json::Value),
}

/// A fully built backend request, kept separate from sending so the wire
/// shape can be checked without a network.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OutboundRequest {
    pub url: String,
    pub headers: Vec<(&'static str, String)>,
    pub body: RequestBody,
}

impl OutboundRequest {
    pub fn json(url: String, body: serde_json::Value) -> Self {
        Self {
            url,
            headers: Vec::new(),
            body: RequestBody::Json(body),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Builds the shared client used by every built-in adapter.
pub fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("lostfound/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Failed to build notification client; using defaults");
            Client::new()
        })
}

/// Rejects values reqwest would refuse to put in a header.
pub(crate) fn header_value(field: &str, value: &str) -> Result<String, NotifyError> {
    HeaderValue::from_str(value)
        .map(|_| value.to_string())
        .map_err(|_| {
            NotifyError::validation(format!(
                "{field} contains characters that cannot be sent in an HTTP header"
            ))
        })
}

/// POSTs the request and maps transport failures. Status handling is left to
/// the adapter because each backend reports errors differently.
pub(crate) async fn send(client: &Client, request: OutboundRequest) -> Result<Response, NotifyError> {
    let mut builder = client.post(&request.url);
    for (name, value) in &request.headers {
        builder = builder.header(*name, value.as_str());
    }
    builder = match request.body {
        RequestBody::Text(text) => builder.body(text),
        RequestBody::Json(value) => builder.json(&value),
    };

    builder.send().await.map_err(transport_error)
}

/// Reads the body of a non-success response for use in a failure reason.
pub(crate) async fn failure_parts(response: Response) -> (u16, String) {
    let status = response.status().as_u16();
    let text = response.text().await.unwrap_or_default();
    (status, text)
}

/// Extracts one string field from a JSON error body.
pub(crate) fn json_error_field(body: &str, field: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get(field)
        .and_then(|value| value.as_str())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn transport_error(err: reqwest::Error) -> NotifyError {
    if err.is_timeout() {
        return NotifyError::Timeout;
    }
    NotifyError::Network {
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let mut request = OutboundRequest::json("https://example.com".to_string(), json!({}));
        request.headers.push(("Title", "Hello".to_string()));
        assert_eq!(request.header("title"), Some("Hello"));
        assert_eq!(request.header("Authorization"), None);
    }

    #[test]
    fn header_value_rejects_newlines() {
        assert!(header_value("Title", "Lost & Found Alert").is_ok());
        let err = header_value("Title", "line one\nline two").unwrap_err();
        assert!(err.is_pre_flight());
        assert!(err.to_string().starts_with("Title contains"));
    }

    #[test]
    fn json_error_field_ignores_non_json() {
        assert_eq!(
            json_error_field(r#"{"ok":false,"description":"chat not found"}"#, "description"),
            Some("chat not found".to_string())
        );
        assert_eq!(json_error_field("<html>", "description"), None);
        assert_eq!(json_error_field(r#"{"description":""}"#, "description"), None);
    }
}
