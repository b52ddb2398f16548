use std::time::Duration;

use crate::notify::{DispatchOutcome, Dispatcher};

/// Dispatches once and prints the outcome. A failed dispatch is returned as
/// an error so `main` exits non-zero after the runtime shuts down.
pub async fn handle_send(
    descriptor: &str,
    title: &str,
    body: &str,
    timeout_secs: u64,
) -> anyhow::Result<()> {
    let dispatcher = Dispatcher::with_defaults(Duration::from_secs(timeout_secs.max(1)));

    match dispatcher.dispatch(descriptor, title, body).await {
        DispatchOutcome::Delivered => {
            println!("Delivered");
            Ok(())
        }
        DispatchOutcome::Failed { reason } => anyhow::bail!("Failed: {reason}"),
    }
}
