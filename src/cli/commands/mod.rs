pub mod config;
pub mod schemes;
pub mod send;
pub mod serve;
