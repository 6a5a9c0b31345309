//! Optional RON configuration for the CLI.
//!
//! Missing keys fall back to defaults, so an empty `()` file is valid.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracker_core::TrackerSettings;
use tracker_engine::ClientSettings;
use tracker_logging::tracker_info;

pub const DEFAULT_CONFIG_FILE: &str = "tracker.ron";
pub const TOKEN_ENV_VAR: &str = "TRACKER_TOKEN";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub poll_interval_ms: u64,
    pub request_timeout_ms: u64,
    pub connect_timeout_ms: u64,
    pub log_to_file: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let tracker = TrackerSettings::default();
        let client = ClientSettings::default();
        Self {
            base_url: client.base_url,
            poll_interval_ms: tracker.poll_interval.as_millis() as u64,
            request_timeout_ms: tracker.request_timeout.as_millis() as u64,
            connect_timeout_ms: client.connect_timeout.as_millis() as u64,
            log_to_file: false,
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must start with http:// or https://, got {:?}",
                self.base_url
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be positive".into()));
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::Invalid("request_timeout_ms must be positive".into()));
        }
        Ok(())
    }

    pub fn tracker_settings(&self) -> TrackerSettings {
        TrackerSettings {
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn client_settings(&self, bearer_token: Option<String>) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
            bearer_token,
        }
    }
}

/// Loads `path`; a missing file yields defaults unless `required` is set.
pub fn load(path: &Path, required: bool) -> Result<AppConfig, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound && !required => {
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config: AppConfig = ron::from_str(&content).map_err(|err| ConfigError::Parse {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    tracker_info!("Loaded config from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_optional_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load(&temp.path().join(DEFAULT_CONFIG_FILE), false).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.poll_interval_ms, 2000);
        assert_eq!(config.request_timeout_ms, 30_000);
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let err = load(&temp.path().join("nope.ron"), true).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(
            &path,
            "(base_url: \"https://stats.example.com/api\", poll_interval_ms: 500)",
        )
        .unwrap();

        let config = load(&path, true).unwrap();
        assert_eq!(config.base_url, "https://stats.example.com/api");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.request_timeout_ms, 30_000);
        assert!(config.validate().is_ok());
        assert_eq!(
            config.tracker_settings().poll_interval,
            Duration::from_millis(500)
        );
    }

    #[test]
    fn malformed_file_reports_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "(base_url: ").unwrap();
        assert!(matches!(load(&path, true), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn validation_rejects_zero_interval_and_bad_scheme() {
        let config = AppConfig {
            poll_interval_ms: 0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            base_url: "localhost:8000".to_string(),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
