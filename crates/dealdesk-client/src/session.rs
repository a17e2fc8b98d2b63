//! Explicit session context handed to the client.

use url::Url;

use crate::config::ClientConfig;
use crate::error::{ApiError, ConfigError};

/// Who is calling and where the backend lives.
///
/// The login flow that produces the token lives outside this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    base_url: Url,
    token: Option<String>,
    user_id: Option<String>,
}

impl Session {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            message: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                message: "cannot be used as a base".to_string(),
            });
        }

        Ok(Self {
            base_url,
            token: None,
            user_id: None,
        })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ConfigError> {
        let mut session = Self::new(&config.base_url)?;
        session.token = config.token.clone();
        session.user_id = config.user_id.clone();
        Ok(session)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Build `{base}/{segments...}?{query}`. Segments are percent-encoded.
    pub fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl {
                url: self.base_url.to_string(),
            })?
            .pop_if_empty()
            .extend(segments);

        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}
