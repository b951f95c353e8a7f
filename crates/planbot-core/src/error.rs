//! Core error types for planbot-core.
//!
//! This module defines the error hierarchy using thiserror. Variants map to
//! the failure modes the chat layer has to distinguish: upstream completion
//! failures (re-prompt the user), unrecognized date expressions (ask the
//! user to restate the date), and productivity-service API errors.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for planbot-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Completion-service failures
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Date resolution failures
    #[error("Date error: {0}")]
    Date(#[from] DateError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Productivity-service API errors
    #[error("Service error: {0}")]
    Service(#[from] ServiceError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Failures calling the text-completion endpoint.
///
/// Not retried internally; the caller decides whether to re-prompt the user.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Transport-level failure
    #[error("completion request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the completion endpoint
    #[error("completion endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Reply JSON carried no completion text at the expected path
    #[error("completion reply carried no alternatives")]
    MissingCompletion,
}

/// Failures resolving a natural-language date expression.
#[derive(Error, Debug)]
pub enum DateError {
    /// No branch of the resolution cascade matched
    #[error("could not recognize date expression: {0:?}")]
    Unrecognized(String),

    /// A time-of-day substring was present but unparsable or out of range
    #[error("invalid time component in {expr:?}: {reason}")]
    InvalidTime { expr: String, reason: String },

    /// The expression names an impossible calendar date (e.g. 31 февраля)
    #[error("expression {expr:?} names an impossible calendar date")]
    InvalidDate { expr: String },
}

/// Failures talking to Google Calendar or Todoist.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Transport-level failure
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from a service endpoint
    #[error("{service} API error (HTTP {status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    /// No access token stored for the service
    #[error("not authenticated with {service}")]
    NotAuthenticated { service: &'static str },

    /// Authorization-code exchange did not yield an access token
    #[error("token exchange with {service} failed: {message}")]
    TokenExchange {
        service: &'static str,
        message: String,
    },

    /// A service reply was missing an expected field
    #[error("{service} reply missing field {field:?}")]
    MissingField {
        service: &'static str,
        field: &'static str,
    },
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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
