use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;

use crate::notify::adapter::NotificationAdapter;
use crate::notify::descriptor::{EndpointDescriptor, Scheme};
use crate::notify::discord::DiscordAdapter;
use crate::notify::error::NotifyError;
use crate::notify::ntfy::NtfyAdapter;
use crate::notify::pushover::PushoverAdapter;
use crate::notify::slack::SlackAdapter;
use crate::notify::telegram::TelegramAdapter;
use crate::notify::webhook::WebhookAdapter;

/// Scheme to adapter lookup.
///
/// Keys are lower-cased. Registration order is kept so the "supported"
/// list in error messages is stable.
#[derive(Clone, Default)]
pub struct AdapterRegistry {
    adapters: HashMap<String, Arc<dyn NotificationAdapter>>,
    order: Vec<String>,
}

impl AdapterRegistry {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Registers every built-in backend against one shared client.
    pub fn with_defaults(client: Client) -> Self {
        let webhook: Arc<dyn NotificationAdapter> = Arc::new(WebhookAdapter::new(client.clone()));

        let mut registry = Self::empty();
        for scheme in Scheme::ALL {
            let adapter: Arc<dyn NotificationAdapter> = match scheme {
                Scheme::Ntfy => Arc::new(NtfyAdapter::new(client.clone(), false)),
                Scheme::Ntfys => Arc::new(NtfyAdapter::new(client.clone(), true)),
                Scheme::Telegram => Arc::new(TelegramAdapter::new(client.clone())),
                Scheme::Discord => Arc::new(DiscordAdapter::new(client.clone())),
                Scheme::Slack => Arc::new(SlackAdapter::new(client.clone())),
                Scheme::Pushover => Arc::new(PushoverAdapter::new(client.clone())),
                Scheme::Http | Scheme::Https => Arc::clone(&webhook),
            };
            registry.register_arc(scheme.as_str(), adapter);
        }
        registry
    }

    pub fn register<A>(&mut self, scheme: &str, adapter: A) -> &mut Self
    where
        A: NotificationAdapter + 'static,
    {
        self.register_arc(scheme, Arc::new(adapter))
    }

    /// Adds or replaces the adapter for `scheme`.
    pub fn register_arc(&mut self, scheme: &str, adapter: Arc<dyn NotificationAdapter>) -> &mut Self {
        let key = scheme.to_ascii_lowercase();
        if self.adapters.insert(key.clone(), adapter).is_none() {
            self.order.push(key);
        }
        self
    }

    pub fn get(&self, scheme: &str) -> Option<&Arc<dyn NotificationAdapter>> {
        self.adapters.get(&scheme.to_ascii_lowercase())
    }

    pub fn schemes(&self) -> &[String] {
        &self.order
    }

    pub fn supported(&self) -> String {
        self.order.join(", ")
    }

    pub fn resolve(
        &self,
        descriptor: &EndpointDescriptor,
    ) -> Result<&Arc<dyn NotificationAdapter>, NotifyError> {
        self.get(descriptor.scheme())
            .ok_or_else(|| NotifyError::UnsupportedScheme {
                scheme: descriptor.scheme().to_string(),
                supported: self.supported(),
            })
    }
}
