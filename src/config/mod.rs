//! Configuration management module.

pub mod loader;
pub mod paths;
pub mod schema;
pub mod validation;

pub use loader::{ConfigError, load_config};
pub use paths::{PathError, Paths};
pub use schema::{
    Config, DeviceSeed, EndpointConfig, LoggingConfig, NotificationsConfig, RateLimitConfig,
    ServerConfig,
};
pub use validation::{ValidationError, ValidationResult, ValidationWarning, validate_config};
