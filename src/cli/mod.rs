//! CLI commands module for lostfound.

pub mod app;
pub mod commands;

pub use app::{Cli, Commands, ConfigAction};
