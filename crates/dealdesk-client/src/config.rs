//! Configuration for dealdesk-client
//!
//! Values are layered: built-in defaults, then a TOML file, then
//! `DEALDESK_*` environment variables.
//!
//! ```toml
//! base_url = "https://shop.example.com/api"
//! token = "eyJhbGciOi..."
//! user_id = "42"
//! min_discount = 20
//! timeout_secs = 30
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const ENV_BASE_URL: &str = "DEALDESK_BASE_URL";
pub const ENV_TOKEN: &str = "DEALDESK_TOKEN";
pub const ENV_USER_ID: &str = "DEALDESK_USER_ID";
pub const ENV_MIN_DISCOUNT: &str = "DEALDESK_MIN_DISCOUNT";

/// Client-side settings for talking to the dashboard backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API root; endpoint paths are appended to it
    pub base_url: String,
    /// Bearer token issued by the login flow
    pub token: Option<String>,
    /// Logged-in user, needed for saved categories
    pub user_id: Option<String>,
    /// Minimum discount percentage for the admin product lookup
    pub min_discount: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000/api".to_string(),
            token: None,
            user_id: None,
            min_discount: 20,
            timeout_secs: 30,
        }
    }
}

impl ClientConfig {
    /// `$CONFIG_DIR/dealdesk/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("dealdesk").join("config.toml"))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path`, or from [`ClientConfig::default_path`] when it exists,
    /// then apply environment overrides.
    ///
    /// An explicit path must exist; a missing default file just means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(default) => {
                    tracing::debug!("Loading config from {:?}", default);
                    Self::from_file(&default)?
                }
                None => Self::default(),
            },
        };

        config.with_env(std::env::vars())
    }

    /// Apply `DEALDESK_*` overrides from a variable list.
    pub fn with_env<I>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            match key.as_str() {
                ENV_BASE_URL => self.base_url = value,
                ENV_TOKEN => self.token = Some(value),
                ENV_USER_ID => self.user_id = Some(value),
                ENV_MIN_DISCOUNT => {
                    self.min_discount = value.parse().map_err(|_| ConfigError::InvalidEnv {
                        key: ENV_MIN_DISCOUNT,
                        value: value.clone(),
                    })?;
                }
                _ => {}
            }
        }
        Ok(self)
    }
}
