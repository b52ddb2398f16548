pub mod cli;
pub mod config;
pub mod http;
pub mod notify;
pub mod ratelimit;
pub mod sanitize;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod test_utils;
