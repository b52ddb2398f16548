use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error};

use crate::notify::dispatcher::Dispatcher;
use crate::notify::events::NotificationEvent;
use crate::notify::outcome::DispatchOutcome;

/// One endpoint that should hear about an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationTarget {
    pub name: String,
    pub descriptor: String,
}

impl NotificationTarget {
    pub fn new(name: impl Into<String>, descriptor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptor: descriptor.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    pub failed_targets: Vec<String>,
}

impl DispatchSummary {
    fn new(total: usize, failures: Vec<String>) -> Self {
        let failures_count = failures.len();
        Self {
            total,
            successes: total.saturating_sub(failures_count),
            failures: failures_count,
            failed_targets: failures,
        }
    }
}

/// Sends one event to every target, one after another.
#[derive(Clone)]
pub struct Notifier {
    dispatcher: Dispatcher,
}

impl Notifier {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub async fn notify(
        &self,
        targets: &[NotificationTarget],
        event: &NotificationEvent,
    ) -> DispatchSummary {
        if targets.is_empty() {
            debug!(event_type = event.event_type(), "No notification targets configured");
            return DispatchSummary::new(0, Vec::new());
        }

        let message = event.to_message();
        let mut failures = Vec::new();

        for target in targets {
            let outcome = self
                .dispatcher
                .dispatch_message(&target.descriptor, &message)
                .await;
            if let DispatchOutcome::Failed { reason } = outcome {
                error!(
                    target = %target.name,
                    event_type = event.event_type(),
                    reason = %reason,
                    "Notification delivery failed"
                );
                failures.push(target.name.clone());
            }
        }

        DispatchSummary::new(targets.len(), failures)
    }

    /// Runs [`Notifier::notify`] in the background. Callers that only need
    /// fire-and-forget semantics can drop the handle.
    pub fn spawn(
        &self,
        targets: Vec<NotificationTarget>,
        event: NotificationEvent,
    ) -> JoinHandle<DispatchSummary> {
        let notifier = self.clone();
        tokio::spawn(async move { notifier.notify(&targets, &event).await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::adapter::{NotificationAdapter, NotificationMessage};
    use crate::notify::descriptor::EndpointDescriptor;
    use crate::notify::registry::AdapterRegistry;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Fails any descriptor whose rest starts with `fail`.
    #[derive(Default)]
    struct Scripted {
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl NotificationAdapter for Scripted {
        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn attempt_deliver(
            &self,
            descriptor: &EndpointDescriptor,
            message: &NotificationMessage,
        ) -> DispatchOutcome {
            self.seen
                .lock()
                .unwrap()
                .push(format!("{}|{}", descriptor.rest(), message.title));
            if descriptor.rest().starts_with("fail") {
                DispatchOutcome::failed("boom")
            } else {
                DispatchOutcome::Delivered
            }
        }
    }

    fn notifier(seen: Arc<Mutex<Vec<String>>>) -> Notifier {
        let mut registry = AdapterRegistry::empty();
        registry.register("test", Scripted { seen });
        Notifier::new(Dispatcher::new(registry, Duration::from_secs(1)))
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_rest() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let notifier = notifier(Arc::clone(&seen));
        let targets = vec![
            NotificationTarget::new("device", "test://fail-here"),
            NotificationTarget::new("phone", "test://one"),
            NotificationTarget::new("bad", "no-scheme"),
            NotificationTarget::new("desk", "test://two"),
        ];

        let summary = notifier
            .notify(&targets, &NotificationEvent::device_scanned("Keys"))
            .await;

        assert_eq!(summary.total, 4);
        assert_eq!(summary.successes, 2);
        assert_eq!(
            summary.failed_targets,
            vec!["device".to_string(), "bad".to_string()]
        );
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                "fail-here|Lost & Found Alert".to_string(),
                "one|Lost & Found Alert".to_string(),
                "two|Lost & Found Alert".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn no_targets_is_a_no_op() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let summary = notifier(Arc::clone(&seen))
            .notify(&[], &NotificationEvent::device_scanned("Keys"))
            .await;

        assert_eq!(summary.total, 0);
        assert_eq!(summary.failures, 0);
        assert!(seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn spawned_fan_out_reports_summary() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let handle = notifier(Arc::clone(&seen)).spawn(
            vec![NotificationTarget::new("phone", "test://ok")],
            NotificationEvent::message_received("Keys", "Sam", "hi"),
        );

        let summary = handle.await.expect("fan-out task");
        assert_eq!(summary.successes, 1);
        assert_eq!(*seen.lock().unwrap(), vec!["ok|New Message for Keys".to_string()]);
    }
}
