//! Error types and handling for OnAir
//!
//! The resolver itself never fails; these errors cover the code around it:
//! configuration loading, the remote schedule source and the web server.

use thiserror::Error;

/// Result type alias for OnAir operations
pub type Result<T> = std::result::Result<T, OnAirError>;

/// Main error type for OnAir
#[derive(Debug, Error)]
pub enum OnAirError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// HTTP/Web server errors
    #[error("Web server error: {message}")]
    Web { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Network-related errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Hosted schedule table errors (bad status, unexpected payload)
    #[error("API error: {message}")]
    Api { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },
}

impl OnAirError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        OnAirError::Config {
            message: message.into(),
        }
    }

    /// Create a new web error
    pub fn web<S: Into<String>>(message: S) -> Self {
        OnAirError::Web {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        OnAirError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        OnAirError::Io {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        OnAirError::Network {
            message: message.into(),
        }
    }

    /// Create a new API error
    pub fn api<S: Into<String>>(message: S) -> Self {
        OnAirError::Api {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for OnAirError {
    fn from(err: std::io::Error) -> Self {
        OnAirError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for OnAirError {
    fn from(err: serde_yaml::Error) -> Self {
        OnAirError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for OnAirError {
    fn from(err: serde_json::Error) -> Self {
        OnAirError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "remote")]
impl From<reqwest::Error> for OnAirError {
    fn from(err: reqwest::Error) -> Self {
        OnAirError::network(err.to_string())
    }
}
