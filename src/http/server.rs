use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::TraceLayer;
use tracing::{Span, info, warn};

use crate::config::Config;
use crate::http::handlers;
use crate::http::handlers::error::ApiError;
use crate::notify::{Dispatcher, Notifier};
use crate::ratelimit::{PublicPolicies, RateLimiter};
use crate::store::Store;

/// Server settings handlers read at request time.
#[derive(Debug, Clone, Default)]
pub struct ServerSettings {
    pub admin_token: Option<String>,
    pub public_portal_url: Option<String>,
}

/// Shared application state for HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    notifier: Notifier,
    rate_limiter: Option<RateLimiter>,
    policies: PublicPolicies,
    settings: Arc<ServerSettings>,
    started: Instant,
}

impl AppState {
    /// State with rate limiting disabled.
    pub fn new(store: Arc<Store>, notifier: Notifier, settings: ServerSettings) -> Self {
        Self {
            store,
            notifier,
            rate_limiter: None,
            policies: PublicPolicies::from_config(&Default::default()),
            settings: Arc::new(settings),
            started: Instant::now(),
        }
    }

    pub fn from_config(config: &Config, store: Arc<Store>) -> Self {
        let notifier = Notifier::new(Dispatcher::from_config(&config.notifications));
        let settings = ServerSettings {
            admin_token: config.server.admin_token.clone(),
            public_portal_url: config.server.public_portal_url.clone(),
        };
        let state = Self::new(store, notifier, settings);
        if config.rate_limit.enabled {
            state.with_rate_limiter(
                RateLimiter::from_config(&config.rate_limit),
                PublicPolicies::from_config(&config.rate_limit),
            )
        } else {
            state
        }
    }

    pub fn with_rate_limiter(mut self, limiter: RateLimiter, policies: PublicPolicies) -> Self {
        self.rate_limiter = Some(limiter);
        self.policies = policies;
        self
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    pub fn rate_limiter(&self) -> Option<&RateLimiter> {
        self.rate_limiter.as_ref()
    }

    pub fn policies(&self) -> PublicPolicies {
        self.policies
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Owns the listener address and the router built from [`AppState`].
pub struct HttpServer {
    bind_addr: SocketAddr,
    router: Router,
    shutdown: CancellationToken,
}

impl HttpServer {
    pub fn from_config(config: &Config, shutdown: CancellationToken, state: AppState) -> Result<Self> {
        Self::new(&config.server.bind, config.server.port, shutdown, state)
    }

    /// Fails when `bind:port` is not a socket address; host names are not resolved.
    pub fn new(bind: &str, port: u16, shutdown: CancellationToken, state: AppState) -> Result<Self> {
        let bind_addr: SocketAddr = format!("{bind}:{port}")
            .parse()
            .with_context(|| format!("Invalid HTTP bind address: {bind}:{port}"))?;

        if bind == "0.0.0.0" {
            warn!(
                port,
                "Listening on every interface; owner routes are reachable from the network"
            );
        }

        Ok(Self {
            bind_addr,
            router: build_router(state),
            shutdown,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Serves until the shutdown token is cancelled.
    pub async fn start(&self) -> Result<()> {
        let listener = TcpListener::bind(self.bind_addr)
            .await
            .with_context(|| format!("Failed to bind {}", self.bind_addr))?;
        let local_addr = listener
            .local_addr()
            .context("Failed to read local address")?;
        info!(address = %local_addr, "lostfound listening");

        let shutdown = self.shutdown.clone();
        axum::serve(listener, self.router.clone())
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                info!("Draining HTTP connections");
            })
            .await
            .context("HTTP server failed")?;

        info!("HTTP server stopped");
        Ok(())
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route(
            "/api/public/device/{code}",
            get(handlers::public::public_device_handler),
        )
        .route(
            "/api/public/device/{code}/message",
            post(handlers::public::public_message_handler),
        )
        .route("/api/config", get(handlers::config::config_handler))
        .route(
            "/api/devices",
            get(handlers::devices::list_devices_handler)
                .post(handlers::devices::create_device_handler),
        )
        .route(
            "/api/devices/{id}",
            get(handlers::devices::get_device_handler)
                .put(handlers::devices::update_device_handler)
                .delete(handlers::devices::delete_device_handler),
        )
        .route(
            "/api/devices/{id}/regenerate-code",
            post(handlers::devices::regenerate_code_handler),
        )
        .route(
            "/api/devices/{id}/messages",
            get(handlers::devices::list_messages_handler)
                .post(handlers::devices::owner_reply_handler)
                .delete(handlers::devices::clear_messages_handler),
        )
        .route(
            "/api/notifications/endpoints",
            get(handlers::endpoints::list_endpoints_handler)
                .post(handlers::endpoints::create_endpoint_handler),
        )
        .route(
            "/api/notifications/endpoints/{id}",
            get(handlers::endpoints::get_endpoint_handler)
                .put(handlers::endpoints::update_endpoint_handler)
                .delete(handlers::endpoints::delete_endpoint_handler),
        )
        .route(
            "/api/notifications/endpoints/{id}/test",
            post(handlers::endpoints::test_endpoint_handler),
        )
        .fallback(fallback_handler)
        .with_state(state)
        .layer(request_trace_layer())
}

type RequestTraceLayer = TraceLayer<
    SharedClassifier<ServerErrorsAsFailures>,
    fn(&Request<Body>) -> Span,
    (),
    fn(&Response<Body>, Duration, &Span),
>;

/// One span per request; the status lands on the span and in a single
/// completion event whose level follows the status class.
fn request_trace_layer() -> RequestTraceLayer {
    TraceLayer::new_for_http()
        .make_span_with(request_span as fn(&Request<Body>) -> Span)
        .on_request(())
        .on_response(record_response as fn(&Response<Body>, Duration, &Span))
}

fn request_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "lostfound.request",
        method = %request.method(),
        route = %request.uri().path(),
        status = tracing::field::Empty,
    )
}

fn record_response(response: &Response<Body>, latency: Duration, span: &Span) {
    let status = response.status().as_u16();
    span.record("status", status);
    let latency_ms = latency.as_millis() as u64;
    match status {
        500.. => tracing::error!(status, latency_ms, "request failed"),
        400..=499 => tracing::warn!(status, latency_ms, "request rejected"),
        _ => tracing::debug!(status, latency_ms, "request completed"),
    }
}

async fn fallback_handler() -> ApiError {
    ApiError::not_found("No route matches this path")
}
