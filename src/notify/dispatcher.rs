use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::NotificationsConfig;
use crate::notify::adapter::{NotificationMessage, build_client};
use crate::notify::descriptor::EndpointDescriptor;
use crate::notify::error::NotifyError;
use crate::notify::outcome::DispatchOutcome;
use crate::notify::registry::AdapterRegistry;

/// Routes one message to one endpoint descriptor.
///
/// The dispatcher holds no per-call state; it is cheap to clone and safe to
/// share across tasks. Every failure, from a malformed descriptor to a
/// backend timeout, comes back as [`DispatchOutcome::Failed`].
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<AdapterRegistry>,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: AdapterRegistry, timeout: Duration) -> Self {
        Self {
            registry: Arc::new(registry),
            timeout,
        }
    }

    /// Built-in adapters sharing one client whose own timeout matches the
    /// dispatch timeout.
    pub fn with_defaults(timeout: Duration) -> Self {
        Self::new(AdapterRegistry::with_defaults(build_client(timeout)), timeout)
    }

    pub fn from_config(config: &NotificationsConfig) -> Self {
        Self::with_defaults(config.timeout())
    }

    pub fn registry(&self) -> &AdapterRegistry {
        &self.registry
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn dispatch(&self, descriptor: &str, title: &str, body: &str) -> DispatchOutcome {
        self.dispatch_message(descriptor, &NotificationMessage::new(title, body))
            .await
    }

    pub async fn dispatch_message(
        &self,
        descriptor: &str,
        message: &NotificationMessage,
    ) -> DispatchOutcome {
        let descriptor = match EndpointDescriptor::parse(descriptor) {
            Ok(descriptor) => descriptor,
            Err(err) => return err.into(),
        };
        let adapter = match self.registry.resolve(&descriptor) {
            Ok(adapter) => adapter,
            Err(err) => return err.into(),
        };

        let outcome = tokio::time::timeout(self.timeout, adapter.attempt_deliver(&descriptor, message))
            .await
            .unwrap_or_else(|_| NotifyError::Timeout.into());

        match &outcome {
            DispatchOutcome::Delivered => {
                debug!(adapter = adapter.name(), "Notification delivered");
            }
            DispatchOutcome::Failed { reason } => {
                debug!(adapter = adapter.name(), reason = %reason, "Notification not delivered");
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::adapter::NotificationAdapter;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Recording {
        calls: Arc<AtomicUsize>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl NotificationAdapter for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        async fn attempt_deliver(
            &self,
            _descriptor: &EndpointDescriptor,
            _message: &NotificationMessage,
        ) -> DispatchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            DispatchOutcome::Delivered
        }
    }

    fn dispatcher_with(adapter: Recording, timeout: Duration) -> Dispatcher {
        let mut registry = AdapterRegistry::empty();
        registry.register("ntfy", adapter);
        Dispatcher::new(registry, timeout)
    }

    #[tokio::test]
    async fn malformed_descriptor_never_reaches_an_adapter() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(
            Recording {
                calls: Arc::clone(&calls),
                delay: None,
            },
            Duration::from_secs(1),
        );

        for descriptor in ["not-a-url", "ntfy:/topic", "ntfy://", "://topic"] {
            let outcome = dispatcher.dispatch(descriptor, "t", "b").await;
            assert_eq!(
                outcome,
                DispatchOutcome::failed("Invalid endpoint descriptor format")
            );
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_scheme_never_reaches_an_adapter() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(
            Recording {
                calls: Arc::clone(&calls),
                delay: None,
            },
            Duration::from_secs(1),
        );

        let outcome = dispatcher.dispatch("gopher://x", "t", "b").await;
        assert_eq!(
            outcome.reason(),
            Some("Unsupported notification scheme: gopher. Supported: ntfy")
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scheme_match_is_case_insensitive() {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = dispatcher_with(
            Recording {
                calls: Arc::clone(&calls),
                delay: None,
            },
            Duration::from_secs(1),
        );

        assert!(dispatcher.dispatch("NTFY://alerts", "t", "b").await.is_delivered());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_adapter_times_out() {
        let dispatcher = dispatcher_with(
            Recording {
                calls: Arc::default(),
                delay: Some(Duration::from_secs(30)),
            },
            Duration::from_secs(10),
        );

        let outcome = dispatcher.dispatch("ntfy://alerts", "t", "b").await;
        assert_eq!(outcome, DispatchOutcome::failed("timeout"));
    }

    #[tokio::test]
    async fn builtin_validation_fails_before_any_request() {
        let dispatcher = Dispatcher::with_defaults(Duration::from_secs(1));
        let outcome = dispatcher.dispatch("slack://a/b", "t", "b").await;
        assert_eq!(
            outcome.reason(),
            Some("Invalid Slack URL format. Use: slack://TokenA/TokenB/TokenC")
        );
    }
}
