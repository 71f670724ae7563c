//! Core error types

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("No kruise manifest found (searched {} location(s))", searched.len())]
    ConfigNotFound { searched: Vec<PathBuf> },

    #[error("Unable to fetch manifest from {url}: {message}")]
    ConfigFetch { url: String, message: String },

    #[error("Invalid manifest: {message}")]
    InvalidConfig { message: String },

    #[error("Invalid deployment catalog: {message}")]
    InvalidCatalog { message: String },

    #[error("Failed to parse manifest: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON manifest: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid manifest URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_catalog(message: impl Into<String>) -> Self {
        Self::InvalidCatalog {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
