use crate::config::paths::{PathError, Paths};
use crate::config::schema::LoggingConfig;
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::fmt::time::SystemTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

#[derive(Debug, Clone)]
pub struct TracingConfig {
    pub level: Level,
    pub log_to_file: bool,
    pub log_to_stderr: bool,
    pub json_format: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            log_to_file: false,
            log_to_stderr: true,
            json_format: false,
        }
    }
}

impl TracingConfig {
    /// `debug` wins over the configured level. Unknown levels fall back to info;
    /// `config validate` reports them.
    pub fn from_logging(logging: &LoggingConfig, debug: bool) -> Self {
        let level = if debug {
            Level::DEBUG
        } else {
            logging.level.trim().parse().unwrap_or(Level::INFO)
        };
        Self {
            level,
            log_to_file: logging.log_to_file,
            log_to_stderr: true,
            json_format: logging.json,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Failed to initialize state directory: {0}")]
    StateDir(#[from] PathError),

    #[error("Failed to open log file {path}: {source}")]
    LogFileOpen { path: PathBuf, source: io::Error },

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Flushes the log file when dropped. Hold it for the life of the process.
#[derive(Debug)]
pub struct TracingGuard {
    file: Option<Arc<File>>,
}

impl Drop for TracingGuard {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            let _ = (&**file).flush();
        }
    }
}

/// Installs the process-wide subscriber.
///
/// Global rather than thread-local so spawned fan-out tasks on runtime
/// worker threads log through the same layers.
pub fn init_tracing(config: &TracingConfig) -> Result<TracingGuard, TracingError> {
    let (subscriber, guard) = build_subscriber(config)?;
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|_| TracingError::AlreadyInitialized)?;
    Ok(guard)
}

fn build_subscriber(
    config: &TracingConfig,
) -> Result<(impl Subscriber + Send + Sync + 'static, TracingGuard), TracingError> {
    let file = if config.log_to_file {
        Paths::ensure_state_dir()?;
        let path = Paths::log_file();
        let file = File::options()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| TracingError::LogFileOpen { path, source })?;
        Some(Arc::new(file))
    } else {
        None
    };

    let mut layers: Vec<BoxedLayer> = Vec::new();
    if config.log_to_stderr {
        layers.push(fmt_layer(std::io::stderr, config.json_format));
    }
    if let Some(file) = &file {
        // `&File` is `Write`, so the shared handle is its own MakeWriter.
        layers.push(fmt_layer(Arc::clone(file), config.json_format));
    }

    let subscriber = tracing_subscriber::registry()
        .with(layers)
        .with(resolve_env_filter(config));

    Ok((subscriber, TracingGuard { file }))
}

fn fmt_layer<W>(writer: W, json: bool) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_level(true)
        .with_timer(SystemTime);
    if json {
        layer.json().boxed()
    } else {
        layer.boxed()
    }
}

fn resolve_env_filter(config: &TracingConfig) -> EnvFilter {
    if config.level == Level::DEBUG {
        EnvFilter::new(Level::DEBUG.as_str())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()))
    }
}
