//! Error types for policy construction and configuration loading.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when building an allow-list policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Invalid tag name: {0:?}")]
    InvalidTagName(String),

    #[error("Invalid attribute name {attribute:?} on <{tag}>")]
    InvalidAttributeName { tag: String, attribute: String },

    #[error("Attribute {attribute:?} is never allowed (found on <{tag}>)")]
    ForbiddenAttribute { tag: String, attribute: String },

    #[error("Tag <{0}> is opaque and cannot be allow-listed")]
    OpaqueTagAllowed(String),

    #[error("URL scheme {0:?} is not allowed")]
    ForbiddenScheme(String),
}

/// Errors that can occur when loading a pipeline configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid policy: {0}")]
    Policy(#[from] PolicyError),
}
