use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::config::{Config, Paths, load_config, validate_config};

pub async fn handle_init(force: bool, custom_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config_path = custom_path.unwrap_or_else(Paths::config_file);

    if config_path.exists() && !force && !confirm_overwrite(&config_path)? {
        println!("Aborted.");
        return Ok(());
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
        set_dir_permissions(parent);
    }

    fs::write(&config_path, default_config_toml())?;
    set_file_permissions(&config_path);

    println!("\x1b[32mConfig created at {}\x1b[0m", config_path.display());
    println!("Check it with: lostfound config validate");

    Ok(())
}

pub async fn handle_show(json: bool) -> anyhow::Result<()> {
    let path = Paths::config_file();
    if !path.exists() {
        eprintln!("No config file at {}. Using default configuration.", path.display());
    }
    let config = load_config(None)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        print!("{}", toml::to_string_pretty(&config)?);
    }
    Ok(())
}

pub async fn handle_validate(custom_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = custom_path.unwrap_or_else(Paths::config_file);
    if !path.exists() {
        println!(
            "No config file found, will use defaults ({})",
            path.display()
        );
        return Ok(());
    }

    let contents = fs::read_to_string(&path)?;
    let config = parse_config(&contents).map_err(anyhow::Error::msg)?;

    let result = validate_config(&config);
    for warning in &result.warnings {
        eprintln!("Warning: {}: {}", warning.field, warning.message);
    }

    if result.is_valid() {
        println!("Configuration valid: {}", path.display());
        return Ok(());
    }

    eprintln!("Configuration errors in {}:", path.display());
    for err in &result.errors {
        eprintln!("  - {}: {}", err.field, err.message);
        if let Some(suggestion) = &err.suggestion {
            eprintln!("    hint: {suggestion}");
        }
    }
    anyhow::bail!("{} has {} invalid setting(s)", path.display(), result.errors.len());
}

/// Separates TOML syntax errors from values the schema rejects.
fn parse_config(contents: &str) -> Result<Config, String> {
    if let Err(err) = toml::from_str::<toml::Table>(contents) {
        return Err(match err.span() {
            Some(span) => format!(
                "Configuration syntax error at line {}: {}",
                line_of(contents, span.start),
                err.message()
            ),
            None => format!("Configuration syntax error: {}", err.message()),
        });
    }

    toml::from_str::<Config>(contents)
        .map_err(|err| format!("Configuration value error: {}", err.message()))
}

fn line_of(contents: &str, offset: usize) -> usize {
    contents
        .get(..offset)
        .unwrap_or(contents)
        .bytes()
        .filter(|&b| b == b'\n')
        .count()
        + 1
}

fn confirm_overwrite(path: &Path) -> anyhow::Result<bool> {
    print!(
        "Config already exists at {}. Overwrite? [y/N] ",
        path.display()
    );
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    let response = input.trim();
    Ok(response.eq_ignore_ascii_case("y") || response.eq_ignore_ascii_case("yes"))
}

fn set_dir_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(err) = fs::set_permissions(path, fs::Permissions::from_mode(0o700)) {
            eprintln!("Warning: failed to set directory permissions: {err}");
        }
    }
}

fn set_file_permissions(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if let Err(err) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
            eprintln!("Warning: failed to set config file permissions: {err}");
        }
    }
}

fn default_config_toml() -> &'static str {
    r#"# lostfound configuration file

[server]
# Bind address. Binding to 0.0.0.0 without an admin token exposes owner routes.
bind = "127.0.0.1"
port = 3000
# Bearer token for /api/devices, /api/notifications and /api/config
# admin_token = "change-me"
# Base URL printed on QR codes
# public_portal_url = "https://found.example.com"

[logging]
# trace, debug, info, warn, error
level = "info"
json = false
# Also append to the log file in the state directory
log_to_file = false

[notifications]
# Per-endpoint delivery timeout
timeout_secs = 10

# Global endpoints notified for every device. Supported schemes:
# ntfy, ntfys, tgram, discord, slack, pushover, http, https
# [[notifications.endpoints]]
# name = "phone"
# url = "ntfy://my-lost-things"

[rate_limit]
enabled = true
public_read_per_minute = 30
public_write_per_minute = 5
max_tracked_clients = 10000
sweep_interval_secs = 300

# Devices created at startup
# [[devices]]
# name = "Keys"
# description = "Red keyring"
# code = "keys0001"
# notification_url = "tgram://123456:ABC/987654"
"#
}
