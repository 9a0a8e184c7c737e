/// Structured error types for northwind-core.
///
/// Library crates return `NorthwindError`; the `northwind` binary wraps
/// these with `anyhow` context.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for northwind-core operations
#[derive(Error, Debug)]
pub enum NorthwindError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Config file is not valid TOML or has the wrong shape
    #[error("Failed to parse config file {path:?}: {source}")]
    ConfigParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Named connection string is not configured
    #[error("Connection string '{name}' is not configured (set DATABASE_URL or [connection_strings])")]
    MissingConnectionString { name: String },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for northwind-core operations
pub type Result<T> = std::result::Result<T, NorthwindError>;

impl NorthwindError {
    /// Create a config parse error for the given file
    pub fn config_parse(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ConfigParse {
            path: path.into(),
            source,
        }
    }

    /// Create a missing connection string error
    pub fn missing_connection_string(name: impl Into<String>) -> Self {
        Self::MissingConnectionString { name: name.into() }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
