//! # aegis-config
//!
//! Configuration for the Aegis console, loaded from `~/.aegis/config.yaml`.
//!
//! Every field has a default so an absent file is a valid configuration.
//! After the file is read, `AEGIS_BACKEND_URL` (or the older `BACKEND_URL`)
//! overrides the backend base URL.
//!
//! ```yaml
//! backend:
//!   base_url: http://localhost:8000
//!   timeout_secs: 30
//!   contract: event_alert
//!   default_event_name: Event Alert
//! compose:
//!   success_display_secs: 5
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use aegis_core::{AegisError, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Environment variable that overrides `backend.base_url`.
pub const BACKEND_URL_ENV: &str = "AEGIS_BACKEND_URL";

/// Fallback environment variable shared with the web console's proxy routes.
pub const LEGACY_BACKEND_URL_ENV: &str = "BACKEND_URL";

/// Upper bound for `compose.success_display_secs`.
pub const MAX_SUCCESS_DISPLAY_SECS: u64 = 3600;

/// Top-level Aegis configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AegisConfig {
    /// Alert backend connection settings
    pub backend: BackendConfig,

    /// Compose session settings
    pub compose: ComposeConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

/// Which request shape the deployed alert backend accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendContract {
    /// `POST /alert` keyed by `event_name`/`description`/`urgency`/`mode`
    #[default]
    EventAlert,
    /// `POST /alerts` keyed by `message`/`priority`/`method`/`target`
    TargetedAlert,
}

impl std::fmt::Display for BackendContract {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EventAlert => write!(f, "event_alert"),
            Self::TargetedAlert => write!(f, "targeted_alert"),
        }
    }
}

/// Alert backend connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the alert backend (no trailing path)
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Request shape expected by the backend
    pub contract: BackendContract,

    /// Event name sent when the draft has no title
    pub default_event_name: String,

    /// Event FAQ slug attached to alerts that don't set one
    pub event_slug: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout_secs: 30,
            contract: BackendContract::default(),
            default_event_name: "Event Alert".to_string(),
            event_slug: None,
        }
    }
}

impl BackendConfig {
    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the backend contract.
    pub fn with_contract(mut self, contract: BackendContract) -> Self {
        self.contract = contract;
        self
    }
}

/// Compose session settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    /// How long a success banner stays up before the session re-arms
    pub success_display_secs: u64,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            success_display_secs: 5,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log directory (defaults to `~/.aegis/logs/`)
    pub log_dir: Option<PathBuf>,
}

impl AegisConfig {
    /// Default configuration file location: `~/.aegis/config.yaml`.
    pub fn default_path() -> Result<PathBuf> {
        Ok(aegis_core::logging::aegis_home()?.join("config.yaml"))
    }

    /// Load configuration.
    ///
    /// With `Some(path)` the file must exist. With `None` the default path is
    /// tried and a missing file yields defaults. Environment overrides are
    /// applied and the result is validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let path = Self::default_path()?;
                if path.exists() {
                    Self::from_file(&path)?
                } else {
                    debug!(path = %path.display(), "no config file, using defaults");
                    Self::default()
                }
            }
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a YAML configuration file without overrides.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                AegisError::config_not_found_with_source(path, e)
            } else {
                AegisError::io("reading config", path, e)
            }
        })?;

        let config = Self::from_yaml_str(&contents).map_err(|e| AegisError::ConfigInvalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    pub fn from_yaml_str(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }

    /// Apply `AEGIS_BACKEND_URL` / `BACKEND_URL` overrides.
    pub fn apply_env_overrides(&mut self) {
        let url = std::env::var(BACKEND_URL_ENV)
            .ok()
            .or_else(|| std::env::var(LEGACY_BACKEND_URL_ENV).ok())
            .filter(|url| !url.trim().is_empty());

        if let Some(url) = url {
            debug!(base_url = %url, "backend URL overridden from environment");
            self.backend.base_url = url;
        }
    }

    /// Check semantic constraints that serde can't express.
    pub fn validate(&self) -> Result<()> {
        let url = self.backend.base_url.trim();
        if url.is_empty() {
            return Err(AegisError::config_validation("backend.base_url must not be empty"));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(AegisError::config_validation(format!(
                "backend.base_url must start with http:// or https:// (got '{url}')"
            )));
        }
        if self.backend.timeout_secs == 0 {
            return Err(AegisError::config_validation(
                "backend.timeout_secs must be greater than zero",
            ));
        }
        if self.backend.default_event_name.trim().is_empty() {
            return Err(AegisError::config_validation(
                "backend.default_event_name must not be empty",
            ));
        }
        if self.compose.success_display_secs > MAX_SUCCESS_DISPLAY_SECS {
            return Err(AegisError::config_validation(format!(
                "compose.success_display_secs must be at most {MAX_SUCCESS_DISPLAY_SECS} (got {})",
                self.compose.success_display_secs
            )));
        }
        Ok(())
    }

    /// Base URL with any trailing slash removed.
    pub fn backend_base_url(&self) -> &str {
        self.backend.base_url.trim().trim_end_matches('/')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn clear_env() {
        // SAFETY: every test touching these variables is #[serial]
        unsafe {
            std::env::remove_var(BACKEND_URL_ENV);
            std::env::remove_var(LEGACY_BACKEND_URL_ENV);
        }
    }

    #[test]
    fn test_defaults() {
        let config = AegisConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.backend.timeout_secs, 30);
        assert_eq!(config.backend.contract, BackendContract::EventAlert);
        assert_eq!(config.compose.success_display_secs, 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AegisConfig::from_yaml_str(
            "backend:\n  contract: targeted_alert\n  timeout_secs: 10\n",
        )
        .unwrap();
        assert_eq!(config.backend.contract, BackendContract::TargetedAlert);
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.backend.base_url, "http://localhost:8000");
        assert_eq!(config.compose.success_display_secs, 5);
    }

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(AegisConfig::from_yaml_str("  \n").unwrap(), AegisConfig::default());
    }

    #[test]
    fn test_unknown_contract_rejected() {
        assert!(AegisConfig::from_yaml_str("backend:\n  contract: carrier_pigeon\n").is_err());
    }

    #[test]
    #[serial]
    fn test_load_explicit_file() {
        clear_env();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "backend:\n  base_url: https://alerts.example.com/\n  event_slug: xai-vercel-hackathon\ncompose:\n  success_display_secs: 2"
        )
        .unwrap();

        let config = AegisConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.backend_base_url(), "https://alerts.example.com");
        assert_eq!(config.backend.event_slug.as_deref(), Some("xai-vercel-hackathon"));
        assert_eq!(config.compose.success_display_secs, 2);
    }

    #[test]
    #[serial]
    fn test_load_missing_explicit_file() {
        clear_env();
        let err = AegisConfig::load(Some(Path::new("/nonexistent/aegis/config.yaml"))).unwrap_err();
        assert!(matches!(err, AegisError::ConfigNotFound { .. }));
    }

    #[test]
    #[serial]
    fn test_load_invalid_yaml() {
        clear_env();
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "backend: [unclosed").unwrap();

        let err = AegisConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, AegisError::ConfigInvalid { .. }));
        assert!(err.guidance().is_some());
    }

    #[test]
    #[serial]
    fn test_missing_default_file_uses_defaults() {
        clear_env();
        let home = tempfile::tempdir().unwrap();
        // SAFETY: serialized
        unsafe { std::env::set_var("HOME", home.path()) };

        let config = AegisConfig::load(None).unwrap();
        assert_eq!(config, AegisConfig::default());
    }

    #[test]
    #[serial]
    fn test_env_override_precedence() {
        clear_env();
        let mut config = AegisConfig::default();

        // SAFETY: serialized
        unsafe { std::env::set_var(LEGACY_BACKEND_URL_ENV, "http://legacy:8000") };
        config.apply_env_overrides();
        assert_eq!(config.backend.base_url, "http://legacy:8000");

        // SAFETY: serialized
        unsafe { std::env::set_var(BACKEND_URL_ENV, "http://primary:9000") };
        config.apply_env_overrides();
        assert_eq!(config.backend.base_url, "http://primary:9000");

        clear_env();
    }

    #[test]
    fn test_validation_failures() {
        let mut config = AegisConfig::default();
        config.backend.timeout_secs = 0;
        assert!(config.validate().is_err());

        let mut config = AegisConfig::default();
        config.backend.base_url = "localhost:8000".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http://"));

        let mut config = AegisConfig::default();
        config.backend.base_url = "   ".to_string();
        assert!(config.validate().is_err());

        let mut config = AegisConfig::default();
        config.compose.success_display_secs = 10_000_000_000_000_000;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("success_display_secs"));

        config.compose.success_display_secs = MAX_SUCCESS_DISPLAY_SECS;
        assert!(config.validate().is_ok());
    }
}
