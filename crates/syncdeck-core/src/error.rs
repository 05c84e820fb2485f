//! Core error types for syncdeck-core.
//!
//! This module defines the error hierarchy using thiserror. Load and
//! authorization failures are recoverable at the view boundary; none of them
//! is fatal to a session.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for syncdeck-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Remote load failures
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    /// Credential acquisition failures
    #[error("Authorization error: {0}")]
    Auth(#[from] AuthError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Unknown integration name
    #[error("Unknown integration '{0}' (expected one of: notion, airtable, hubspot)")]
    UnknownIntegration(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures of the remote load call.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The backend answered with a non-success status.
    #[error("{detail}")]
    Rejected { status: u16, detail: String },

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The response body was not a record sequence.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The credential bag could not be serialized into the form field.
    #[error("could not encode credentials: {0}")]
    Encode(#[from] serde_json::Error),
}

impl LoadError {
    /// The message shown to the operator.
    ///
    /// For backend rejections this is the `detail` string verbatim.
    pub fn user_message(&self) -> String {
        match self {
            LoadError::Rejected { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            LoadError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Failures of a credential flow.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The backend refused to start or finish the flow.
    #[error("Authorization failed for {service}: {detail}")]
    Rejected { service: String, detail: String },

    /// No credentials appeared within the polling window.
    #[error("Authorization timeout: no credentials received within {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// Credentials pasted by the operator were not valid JSON.
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The browser could not be opened.
    #[error("Could not open browser: {0}")]
    Browser(#[source] std::io::Error),

    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// The home directory could not be determined
    #[error("Could not determine the home directory")]
    NoHomeDir,
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
