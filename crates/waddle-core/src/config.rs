//! Process-wide configuration, built once at startup.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Environment variable overriding `gmail.client_secret`.
pub const GMAIL_SECRET_ENV: &str = "WADDLE_GMAIL_CLIENT_SECRET";

/// Environment variable overriding `facebook.client_secret`.
pub const FACEBOOK_SECRET_ENV: &str = "WADDLE_FACEBOOK_CLIENT_SECRET";

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Could not read {path}: {source}")]
    Read {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid configuration JSON.
    #[error("Invalid configuration in {path}: {source}")]
    Parse {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Upper bound on every outward HTTP request, in seconds.
    pub http_timeout_secs: u64,
    /// Gmail settings.
    pub gmail: GmailConfig,
    /// Facebook settings.
    pub facebook: FacebookConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            http_timeout_secs: 30,
            gmail: GmailConfig::default(),
            facebook: FacebookConfig::default(),
        }
    }
}

/// Gmail settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GmailConfig {
    /// `OAuth2` client id of a Google "desktop app" client.
    pub client_id: Option<String>,
    /// Client secret; desktop clients still send one to Google.
    pub client_secret: Option<String>,
    /// Redirect URI registered for the client.
    pub redirect_uri: String,
    /// Query used by `recent`.
    pub recent_query: String,
    /// Count used by `recent` without an argument.
    pub recent_count: usize,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: "http://localhost".to_string(),
            recent_query: "category:primary".to_string(),
            recent_count: 10,
        }
    }
}

/// Facebook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FacebookConfig {
    /// Facebook app id.
    pub client_id: Option<String>,
    /// Facebook app secret.
    pub client_secret: Option<String>,
    /// Redirect URI registered for the app.
    pub redirect_uri: String,
    /// Graph API version, e.g. `v19.0`.
    pub api_version: String,
    /// Event type used by `recent`.
    pub recent_query: String,
    /// Count used by `recent` without an argument.
    pub event_count: usize,
}

impl Default for FacebookConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            redirect_uri: "https://www.facebook.com/connect/login_success.html".to_string(),
            api_version: waddle_oauth::provider::FACEBOOK_GRAPH_VERSION.to_string(),
            recent_query: "attending".to_string(),
            event_count: 10,
        }
    }
}

impl Config {
    /// `<config dir>/waddle/config.json`.
    #[must_use]
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("waddle")
            .join("config.json")
    }

    /// Loads `path`, or defaults if it does not exist, then applies secret
    /// overrides from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("no configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Overrides client secrets from `lookup`, which maps variable names to
    /// values.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(secret) = lookup(GMAIL_SECRET_ENV).filter(|s| !s.is_empty()) {
            self.gmail.client_secret = Some(secret);
        }
        if let Some(secret) = lookup(FACEBOOK_SECRET_ENV).filter(|s| !s.is_empty()) {
            self.facebook.client_secret = Some(secret);
        }
    }

    /// Request timeout as a [`Duration`].
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.http_timeout(), Duration::from_secs(30));
        assert_eq!(config.gmail.recent_query, "category:primary");
        assert_eq!(config.gmail.recent_count, 10);
        assert_eq!(config.facebook.recent_query, "attending");
        assert_eq!(config.facebook.api_version, "v19.0");
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"gmail": {"client_id": "abc.apps.googleusercontent.com"}}"#)
                .unwrap();
        assert_eq!(
            config.gmail.client_id.as_deref(),
            Some("abc.apps.googleusercontent.com")
        );
        assert_eq!(config.gmail.redirect_uri, "http://localhost");
        assert_eq!(config.http_timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_is_default() {
        let config = Config::from_file(Path::new("/nonexistent/waddle/config.json")).unwrap();
        assert!(config.facebook.client_id.is_none());
    }

    #[test]
    fn test_env_overrides_secrets() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            GMAIL_SECRET_ENV => Some("g-secret".to_string()),
            FACEBOOK_SECRET_ENV => Some(String::new()),
            _ => None,
        });
        assert_eq!(config.gmail.client_secret.as_deref(), Some("g-secret"));
        assert!(config.facebook.client_secret.is_none());
    }
}
