use std::collections::HashSet;

use crate::config::schema::Config;
use crate::notify::{EndpointDescriptor, Scheme};

const MAX_SENSIBLE_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
}

pub fn validate_config(config: &Config) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    validate_log_level(&config.logging.level, &mut errors);

    if config.server.port == 0 {
        errors.push(ValidationError {
            field: "server.port".to_string(),
            message: "HTTP port must be between 1 and 65535".to_string(),
            suggestion: Some("Use a port between 1 and 65535".to_string()),
        });
    }

    if config.server.bind.trim() == "0.0.0.0" && config.server.admin_token.is_none() {
        warnings.push(ValidationWarning {
            field: "server.admin_token".to_string(),
            message: "Binding to 0.0.0.0 without an admin token exposes owner routes to the network"
                .to_string(),
        });
    }

    if let Some(ref token) = config.server.admin_token {
        if token.trim().is_empty() {
            errors.push(ValidationError {
                field: "server.admin_token".to_string(),
                message: "Admin token cannot be empty".to_string(),
                suggestion: Some("Remove the key to disable owner authentication".to_string()),
            });
        }
    }

    if let Some(ref portal) = config.server.public_portal_url {
        if !is_http_url(portal) {
            errors.push(ValidationError {
                field: "server.public_portal_url".to_string(),
                message: "Public portal URL must start with http:// or https://".to_string(),
                suggestion: None,
            });
        }
    }

    let timeout = config.notifications.timeout_secs;
    if timeout == 0 {
        errors.push(ValidationError {
            field: "notifications.timeout_secs".to_string(),
            message: "Notification timeout must be positive".to_string(),
            suggestion: Some("Use a value of at least 1 second".to_string()),
        });
    } else if timeout > MAX_SENSIBLE_TIMEOUT_SECS {
        warnings.push(ValidationWarning {
            field: "notifications.timeout_secs".to_string(),
            message: format!("Notification timeout of {timeout}s delays failure reports"),
        });
    }

    for (index, endpoint) in config.notifications.endpoints.iter().enumerate() {
        if endpoint.name.trim().is_empty() {
            errors.push(ValidationError {
                field: format!("notifications.endpoints[{index}].name"),
                message: "Endpoint name cannot be empty".to_string(),
                suggestion: None,
            });
        }
        validate_descriptor(
            &format!("notifications.endpoints[{index}].url"),
            &endpoint.url,
            &mut errors,
        );
    }

    validate_rate_limits(config, &mut errors);

    let mut codes = HashSet::new();
    for (index, device) in config.devices.iter().enumerate() {
        if device.name.trim().is_empty() {
            errors.push(ValidationError {
                field: format!("devices[{index}].name"),
                message: "Device name cannot be empty".to_string(),
                suggestion: None,
            });
        }
        if let Some(ref code) = device.code {
            if !codes.insert(code.to_ascii_lowercase()) {
                errors.push(ValidationError {
                    field: format!("devices[{index}].code"),
                    message: format!("Duplicate device code: {code}"),
                    suggestion: Some("Device codes must be unique".to_string()),
                });
            }
        }
        if let Some(ref url) = device.notification_url {
            validate_descriptor(&format!("devices[{index}].notification_url"), url, &mut errors);
        }
    }

    ValidationResult { errors, warnings }
}

fn validate_rate_limits(config: &Config, errors: &mut Vec<ValidationError>) {
    let limits = &config.rate_limit;
    if !limits.enabled {
        return;
    }

    let checks = [
        ("rate_limit.public_read_per_minute", limits.public_read_per_minute == 0),
        ("rate_limit.public_write_per_minute", limits.public_write_per_minute == 0),
        ("rate_limit.max_tracked_clients", limits.max_tracked_clients == 0),
        ("rate_limit.sweep_interval_secs", limits.sweep_interval_secs == 0),
    ];
    for (field, is_zero) in checks {
        if is_zero {
            errors.push(ValidationError {
                field: field.to_string(),
                message: "Rate limit settings must be positive".to_string(),
                suggestion: Some("Set rate_limit.enabled = false to disable limiting".to_string()),
            });
        }
    }
}

fn validate_descriptor(field: &str, value: &str, errors: &mut Vec<ValidationError>) {
    let descriptor = match EndpointDescriptor::parse(value.trim()) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            errors.push(ValidationError {
                field: field.to_string(),
                message: err.to_string(),
                suggestion: Some("Use the form scheme://payload, e.g. ntfy://my-topic".to_string()),
            });
            return;
        }
    };

    if descriptor.known_scheme().is_none() {
        let supported: Vec<&str> = Scheme::ALL.iter().map(Scheme::as_str).collect();
        errors.push(ValidationError {
            field: field.to_string(),
            message: format!("Unsupported notification scheme: {}", descriptor.scheme()),
            suggestion: Some(format!("Supported: {}", supported.join(", "))),
        });
    }
}

fn validate_log_level(level: &str, errors: &mut Vec<ValidationError>) {
    let level = level.trim().to_lowercase();
    let valid = ["trace", "debug", "info", "warn", "error"];
    if !valid.iter().any(|value| *value == level) {
        errors.push(ValidationError {
            field: "logging.level".to_string(),
            message: format!("Invalid log level: {level}"),
            suggestion: Some(format!("Valid levels: {}", valid.join(", "))),
        });
    }
}

fn is_http_url(value: &str) -> bool {
    let value = value.trim().to_lowercase();
    value.starts_with("http://") || value.starts_with("https://")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{DeviceSeed, EndpointConfig};

    fn has_error(result: &ValidationResult, field: &str) -> bool {
        result.errors.iter().any(|err| err.field == field)
    }

    #[test]
    fn test_default_config_is_valid() {
        let result = validate_config(&Config::default());
        assert!(result.is_valid(), "{:?}", result.errors);
    }

    #[test]
    fn test_validate_config_reports_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".to_string();
        assert!(has_error(&validate_config(&config), "logging.level"));
    }

    #[test]
    fn test_validate_config_reports_zero_timeout_and_port() {
        let mut config = Config::default();
        config.notifications.timeout_secs = 0;
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(has_error(&result, "notifications.timeout_secs"));
        assert!(has_error(&result, "server.port"));
    }

    #[test]
    fn test_validate_config_reports_bad_descriptors() {
        let mut config = Config::default();
        config.notifications.endpoints = vec![
            EndpointConfig {
                name: "ok".to_string(),
                url: "ntfy://alerts".to_string(),
            },
            EndpointConfig {
                name: "".to_string(),
                url: "not a descriptor".to_string(),
            },
            EndpointConfig {
                name: "mail".to_string(),
                url: "mailto://me".to_string(),
            },
        ];
        let result = validate_config(&config);

        assert!(!has_error(&result, "notifications.endpoints[0].url"));
        assert!(has_error(&result, "notifications.endpoints[1].name"));
        assert!(has_error(&result, "notifications.endpoints[1].url"));
        let unsupported = result
            .errors
            .iter()
            .find(|err| err.field == "notifications.endpoints[2].url")
            .unwrap();
        assert_eq!(unsupported.message, "Unsupported notification scheme: mailto");
    }

    #[test]
    fn test_validate_config_reports_duplicate_device_codes() {
        let mut config = Config::default();
        let device = DeviceSeed {
            name: "Keys".to_string(),
            code: Some("abcd1234".to_string()),
            ..DeviceSeed::default()
        };
        config.devices = vec![device.clone(), device];
        assert!(has_error(&validate_config(&config), "devices[1].code"));
    }

    #[test]
    fn test_validate_config_reports_zero_rate_limits_only_when_enabled() {
        let mut config = Config::default();
        config.rate_limit.public_write_per_minute = 0;
        assert!(has_error(
            &validate_config(&config),
            "rate_limit.public_write_per_minute"
        ));

        config.rate_limit.enabled = false;
        assert!(validate_config(&config).is_valid());
    }

    #[test]
    fn test_validate_config_warns_on_open_bind_without_token() {
        let mut config = Config::default();
        config.server.bind = "0.0.0.0".to_string();
        let result = validate_config(&config);
        assert!(result.is_valid());
        assert!(
            result
                .warnings
                .iter()
                .any(|warning| warning.field == "server.admin_token")
        );
    }
}
