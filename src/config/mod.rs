//! Configuration file loading and parsing.
//!
//! # Configuration File Locations
//!
//! 1. Path specified via `--config` CLI flag (must exist)
//! 2. Default location, used only if present:
//!    - **Linux/macOS:** `~/.pcb-validator/config.json`
//!    - **Windows:** `%USERPROFILE%\.pcb-validator\config.json`
//!
//! With neither, built-in defaults apply.

mod settings;

pub use settings::{Config, ExportConfig, LoggingConfig, ValidationConfig, LOG_LEVELS};

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Returns the default configuration directory.
///
/// - **Linux/macOS:** `~/.pcb-validator/`
/// - **Windows:** `%USERPROFILE%\.pcb-validator\`
#[must_use]
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".pcb-validator"))
}

/// Returns the platform-specific default configuration file path.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    default_config_dir().map(|p| p.join("config.json"))
}

/// Loads and parses the configuration file.
///
/// If `path` is `None`, the default location is tried and built-in defaults
/// are returned when nothing is there.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given file does not exist
/// - The file cannot be read
/// - The JSON is malformed or has unknown fields
/// - A setting is out of range
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = match path {
        Some(p) => p.to_path_buf(),
        None => match default_config_path() {
            Some(p) if p.exists() => p,
            _ => {
                tracing::debug!("No configuration file, using defaults");
                return Ok(Config::default());
            }
        },
    };

    if !config_path.exists() {
        return Err(ConfigError::NotFound { path: config_path });
    }

    let contents = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::ReadError {
        path: config_path.clone(),
        source: e,
    })?;

    let config: Config = serde_json::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: config_path.clone(),
        source: e,
    })?;

    config.validate()?;

    tracing::debug!(path = %config_path.display(), "Loaded configuration");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_config_path_is_under_home() {
        let path = default_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains(".pcb-validator"));
        assert!(path.to_string_lossy().ends_with("config.json"));
    }

    #[test]
    fn explicit_missing_path_is_not_found() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.json");
        let err = load_config(Some(&path)).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound { .. }));
    }

    #[test]
    fn loads_and_validates_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"validation": {"permissive": true}}"#).unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert!(config.validation.permissive);

        fs::write(&path, r#"{"logging": {"level": "loud"}}"#).unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::ValidationError { .. })
        ));

        fs::write(&path, "{").unwrap();
        assert!(matches!(
            load_config(Some(&path)),
            Err(ConfigError::ParseError { .. })
        ));
    }
}
