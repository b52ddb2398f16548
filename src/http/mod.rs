//! Axum HTTP server module.

pub mod handlers;
pub mod server;

pub use server::{AppState, HttpServer, ServerSettings, build_router};
