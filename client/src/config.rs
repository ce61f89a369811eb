//! Client configuration and credential loading.
//!
//! The bearer credential always comes from the `NOTION_API_KEY` environment
//! variable. Endpoint settings may be overridden from an optional YAML file.
//!
//! # Example YAML
//!
//! ```yaml
//! base_url: "https://api.notion.com/v1"
//! api_version: "2022-06-28"
//! timeout_secs: 30
//! ```

use std::fmt;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{KanbanError, Result};

/// Environment variable holding the integration token.
pub const API_KEY_ENV: &str = "NOTION_API_KEY";
/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1";
/// Value of the `Notion-Version` header sent with every request.
pub const DEFAULT_API_VERSION: &str = "2022-06-28";
/// Overall request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Optional endpoint overrides read from a YAML file.
///
/// Every field is optional; absent fields keep the built-in defaults.
///
/// # Examples
///
/// ```
/// use notion_kanban_client::ClientSettings;
///
/// let settings: ClientSettings = serde_yaml::from_str("timeout_secs: 5").unwrap();
/// assert_eq!(settings.timeout_secs, Some(5));
/// assert!(settings.base_url.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// API root, e.g. `https://api.notion.com/v1`.
    pub base_url: Option<String>,
    /// `Notion-Version` header value.
    pub api_version: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl ClientSettings {
    /// Loads settings from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](KanbanError::Io) if the file cannot be read, or
    /// [`Yaml`](KanbanError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let settings = serde_yaml::from_reader(reader)?;
        Ok(settings)
    }
}

/// Everything the HTTP client needs to talk to the API.
#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: String,
    pub base_url: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl ClientConfig {
    /// Creates a configuration with the default endpoint settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reads the credential from [`API_KEY_ENV`] and applies `settings`.
    ///
    /// # Errors
    ///
    /// Returns [`Config`](KanbanError::Config) if the variable is unset or
    /// empty.
    pub fn from_env(settings: &ClientSettings) -> Result<Self> {
        Self::from_parts(std::env::var(API_KEY_ENV).ok(), settings)
    }

    /// Builds a configuration from an optional credential and settings.
    ///
    /// # Errors
    ///
    /// Returns [`Config`](KanbanError::Config) if `api_key` is missing or
    /// blank.
    ///
    /// # Examples
    ///
    /// ```
    /// use notion_kanban_client::{ClientConfig, ClientSettings};
    ///
    /// let settings = ClientSettings { timeout_secs: Some(5), ..Default::default() };
    /// let config = ClientConfig::from_parts(Some("secret".into()), &settings).unwrap();
    /// assert_eq!(config.timeout.as_secs(), 5);
    ///
    /// assert!(ClientConfig::from_parts(None, &settings).is_err());
    /// ```
    pub fn from_parts(api_key: Option<String>, settings: &ClientSettings) -> Result<Self> {
        let api_key = api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                KanbanError::Config(format!(
                    "{API_KEY_ENV} environment variable not set. \
                     Please set it in your shell configuration."
                ))
            })?;

        let mut config = Self::new(api_key);
        if let Some(base_url) = &settings.base_url {
            config.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(api_version) = &settings.api_version {
            config.api_version = api_version.clone();
        }
        if let Some(secs) = settings.timeout_secs {
            config.timeout = Duration::from_secs(secs);
        }
        Ok(config)
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("timeout", &self.timeout)
            .finish()
    }
}
