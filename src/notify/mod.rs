//! Multi-backend notification dispatch.
//!
//! An endpoint descriptor such as `ntfy://alerts` or
//! `tgram://bot-token/chat-id` selects an adapter by scheme; the adapter
//! builds and sends the backend request and reports a [`DispatchOutcome`].

pub mod adapter;
pub mod descriptor;
pub mod discord;
pub mod dispatcher;
pub mod error;
pub mod events;
pub mod fanout;
pub mod ntfy;
pub mod outcome;
pub mod pushover;
pub mod registry;
pub mod slack;
pub mod telegram;
pub mod webhook;

pub use adapter::{DEFAULT_REQUEST_TIMEOUT, NotificationAdapter, NotificationMessage, build_client};
pub use descriptor::{EndpointDescriptor, Scheme};
pub use dispatcher::Dispatcher;
pub use error::NotifyError;
pub use events::NotificationEvent;
pub use fanout::{DispatchSummary, NotificationTarget, Notifier};
pub use outcome::DispatchOutcome;
pub use registry::AdapterRegistry;
