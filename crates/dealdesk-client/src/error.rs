//! Error types for dealdesk-client

use thiserror::Error;

use dealdesk_categories::SelectionMode;

/// Result type alias for tree operations
pub type Result<T> = std::result::Result<T, TreeError>;

/// Failures talking to the backend
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Request failed: {message}")]
    Network { message: String },

    /// Non-2xx response
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// 401; the session collaborator decides what happens next
    #[error("Session expired or not authorized")]
    Unauthorized,

    /// 2xx response whose body did not match the expected shape
    #[error("Unexpected response body: {message}")]
    Decode { message: String },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Unauthorized => Some(401),
            _ => None,
        }
    }
}

/// Errors from tree component operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Operation not available in the tree's selection mode
    #[error("{operation} is not available in {mode} mode")]
    WrongMode {
        operation: &'static str,
        mode: SelectionMode,
    },

    /// Saving a selection needs a user id in the session
    #[error("No user id in session")]
    MissingUser,
}

/// Errors loading client configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid base URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] ApiError),
}
