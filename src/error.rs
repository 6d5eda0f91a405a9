// src/error.rs

//! Unified error handling for the follower network crawler.

use std::fmt;

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Follower enumeration failed
    #[error("Source error for {context}: {message}")]
    Source { context: String, message: String },

    /// Followings lookup failed for a single follower
    #[error("Fetch error for follower {follower}: {message}")]
    Fetch { follower: String, message: String },
}

impl AppError {
    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a follower source error with context.
    pub fn source(context: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Source {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// Create a fetch error for one follower.
    pub fn fetch(follower: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Fetch {
            follower: follower.into(),
            message: message.to_string(),
        }
    }
}
