use std::path::PathBuf;

use clap::Parser;

/// Lost and found service that notifies owners when a tagged item is scanned
#[derive(Parser, Debug)]
#[command(name = "lostfound", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service
    Serve {
        /// Config file (defaults to LOSTFOUND_CONFIG or the platform config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the bind address
        #[arg(long)]
        bind: Option<String>,
        /// Override the listen port
        #[arg(short, long)]
        port: Option<u16>,
        /// Enable debug logging
        #[arg(long)]
        debug: bool,
    },
    /// Send one notification and print the outcome
    Send {
        /// Endpoint descriptor, e.g. ntfy://my-topic
        descriptor: String,
        /// Notification title
        #[arg(short, long, default_value = "lostfound")]
        title: String,
        /// Notification body
        #[arg(short, long, default_value = "Test notification")]
        body: String,
        /// Per-request timeout in seconds
        #[arg(long, default_value = "10")]
        timeout: u64,
    },
    /// List supported notification schemes
    Schemes,
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
pub enum ConfigAction {
    /// Initialize configuration file
    Init {
        /// Overwrite an existing file without asking
        #[arg(short, long)]
        force: bool,
        /// Write to this path instead of the default location
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate configuration
    Validate {
        /// Validate this file instead of the default location
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_with_no_subcommand() {
        let cli = Cli::try_parse_from(["lostfound"]);
        assert!(cli.is_ok());
        assert!(cli.unwrap().command.is_none());
    }

    #[test]
    fn test_cli_version_flag_exits_with_version_error() {
        let result = Cli::try_parse_from(["lostfound", "--version"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_serve_defaults() {
        let cli = Cli::try_parse_from(["lostfound", "serve"]).unwrap();
        match cli.command {
            Some(Commands::Serve {
                config,
                bind,
                port,
                debug,
            }) => {
                assert!(config.is_none());
                assert!(bind.is_none());
                assert!(port.is_none());
                assert!(!debug);
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_serve_overrides() {
        let cli = Cli::try_parse_from([
            "lostfound", "serve", "--bind", "0.0.0.0", "--port", "8080", "--debug",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Serve {
                bind, port, debug, ..
            }) => {
                assert_eq!(bind.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(8080));
                assert!(debug);
            }
            _ => panic!("Expected Serve command with overrides"),
        }
    }

    #[test]
    fn test_send_requires_descriptor() {
        assert!(Cli::try_parse_from(["lostfound", "send"]).is_err());

        let cli = Cli::try_parse_from(["lostfound", "send", "ntfy://topic", "--title", "Hi"])
            .unwrap();
        match cli.command {
            Some(Commands::Send {
                descriptor,
                title,
                body,
                timeout,
            }) => {
                assert_eq!(descriptor, "ntfy://topic");
                assert_eq!(title, "Hi");
                assert_eq!(body, "Test notification");
                assert_eq!(timeout, 10);
            }
            _ => panic!("Expected Send command"),
        }
    }

    #[test]
    fn test_schemes_command() {
        let cli = Cli::try_parse_from(["lostfound", "schemes"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Schemes)));
    }

    #[test]
    fn test_config_init_with_flags() {
        let cli =
            Cli::try_parse_from(["lostfound", "config", "init", "--force", "--path", "/tmp/x.toml"])
                .unwrap();
        match cli.command {
            Some(Commands::Config {
                action: ConfigAction::Init { force, path },
            }) => {
                assert!(force);
                assert_eq!(path, Some(PathBuf::from("/tmp/x.toml")));
            }
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_config_validate_command() {
        let cli = Cli::try_parse_from(["lostfound", "config", "validate"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                action: ConfigAction::Validate { path: None },
            })
        ));
    }

    #[test]
    fn test_invalid_command_fails() {
        let result = Cli::try_parse_from(["lostfound", "invalid"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_config_requires_subcommand() {
        let result = Cli::try_parse_from(["lostfound", "config"]);
        assert!(result.is_err());
    }
}
