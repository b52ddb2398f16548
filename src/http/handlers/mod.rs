//! HTTP request handlers.

pub mod auth;
pub mod config;
pub mod devices;
pub mod endpoints;
pub mod error;
pub mod health;
pub mod public;
