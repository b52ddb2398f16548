use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, error, info, info_span, warn};

use crate::config::{Config, load_config, validate_config};
use crate::http::{AppState, HttpServer};
use crate::store::Store;
use crate::telemetry::{TracingConfig, init_tracing};

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Default)]
pub struct ServeOptions {
    pub config: Option<PathBuf>,
    pub bind: Option<String>,
    pub port: Option<u16>,
    pub debug: bool,
}

pub async fn handle_serve(options: ServeOptions) -> anyhow::Result<()> {
    let mut config = load_config(options.config.as_deref())?;
    apply_overrides(&mut config, &options);

    let _guard = init_tracing(&TracingConfig::from_logging(&config.logging, options.debug))
        .context("Failed to initialize logging")?;

    let validation = validate_config(&config);
    for warning in &validation.warnings {
        warn!(field = %warning.field, "{}", warning.message);
    }
    if !validation.is_valid() {
        for err in &validation.errors {
            error!(field = %err.field, "{}", err.message);
        }
        bail!(
            "Configuration has {} error(s); run `lostfound config validate` for details",
            validation.errors.len()
        );
    }

    let store = Arc::new(Store::from_config(&config).context("Failed to load seeded devices")?);
    let state = AppState::from_config(&config, store);
    let cancel = CancellationToken::new();

    let sweeper = state.rate_limiter().map(|limiter| {
        limiter.spawn_sweeper(
            Duration::from_secs(config.rate_limit.sweep_interval_secs.max(1)),
            cancel.clone(),
        )
    });

    let server = HttpServer::from_config(&config, cancel.clone(), state)?;
    info!(
        address = %server.bind_addr(),
        endpoints = config.notifications.endpoints.len(),
        devices = config.devices.len(),
        "Starting lostfound"
    );

    let signal_cancel = cancel.clone();
    tokio::spawn(
        async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => info!("Shutdown requested"),
                Err(err) => error!(error = %err, "Failed to listen for ctrl-c"),
            }
            signal_cancel.cancel();
        }
        .instrument(info_span!("serve.signals")),
    );

    let result = server.start().await;
    cancel.cancel();
    if let Some(handle) = sweeper {
        let _ = handle.await;
    }
    result
}

fn apply_overrides(config: &mut Config, options: &ServeOptions) {
    if let Some(bind) = &options.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = options.port {
        config.server.port = port;
    }
}
