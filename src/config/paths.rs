use std::env;
use std::fs;
use std::io;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "LOSTFOUND_CONFIG";
pub const STATE_ENV: &str = "LOSTFOUND_STATE";

/// Platform-specific path resolution for lostfound.
pub struct Paths;

#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory { path: PathBuf, source: io::Error },
}

impl Paths {
    /// Returns the configuration directory path.
    /// - Linux: ~/.config/lostfound/
    /// - macOS: ~/Library/Application Support/lostfound/
    /// - Override: LOSTFOUND_CONFIG env var (directory derived from file path)
    pub fn config_dir() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            return path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(PathBuf::from)
                .unwrap_or(path);
        }

        dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join("lostfound")
    }

    /// Returns the full config file path.
    pub fn config_file() -> PathBuf {
        if let Ok(path) = env::var(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Returns the state directory path, where the log file lives.
    /// - Linux: ~/.local/state/lostfound/
    /// - elsewhere: the config directory
    /// - Override: LOSTFOUND_STATE env var
    pub fn state_dir() -> PathBuf {
        if let Ok(path) = env::var(STATE_ENV) {
            return PathBuf::from(path);
        }

        dirs::state_dir()
            .map(|dir| dir.join("lostfound"))
            .unwrap_or_else(Self::config_dir)
    }

    pub fn log_file() -> PathBuf {
        Self::state_dir().join("lostfound.log")
    }

    /// Creates the state directory (and parents) when missing.
    pub fn ensure_state_dir() -> Result<PathBuf, PathError> {
        let dir = Self::state_dir();
        fs::create_dir_all(&dir).map_err(|source| PathError::CreateDirectory {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }
}
