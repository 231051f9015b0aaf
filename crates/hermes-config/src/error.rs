//! Configuration error type.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("configuration file not found: {path}")]
    FileNotFound {
        /// Path that was looked up.
        path: String,
    },

    /// The configuration file could not be read.
    #[error("failed to read {path}")]
    Io {
        /// Path that was read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file could not be parsed.
    #[error("failed to parse {path}: {message}")]
    Parse {
        /// Path that was parsed.
        path: String,
        /// Parser diagnostic.
        message: String,
    },

    /// A field holds a value outside its allowed range or format.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// Dotted path of the offending field.
        field: String,
        /// What was wrong with it.
        message: String,
    },
}

impl ConfigError {
    /// Creates an invalid-value error for `field`.
    #[must_use]
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            message: message.into(),
        }
    }
}
