//! Error types and error display utilities.
//!
//! [`ConsoleError`] covers the few fallible operations of the console layer:
//! writing drained output, loading configuration and installing the global
//! console. The [`ErrorBoundary`] type wraps fallible application
//! operations and records their failures as deferred error messages.

mod boundary;

use std::fmt;
use std::io;
use std::path::PathBuf;

pub use boundary::{ErrorBoundary, describe};

/// Result alias for console operations.
pub type ConsoleResult<T> = Result<T, ConsoleError>;

/// Console error types.
#[derive(Debug)]
pub enum ConsoleError {
    /// Reading configuration or writing output failed.
    Io(io::Error),
    /// A configuration document could not be parsed.
    ConfigParse {
        path: Option<PathBuf>,
        source: toml::de::Error,
    },
    /// A setting had a value outside its domain.
    InvalidSetting { key: String, value: String },
    /// The global console was already created.
    AlreadyInitialized,
}

impl ConsoleError {
    /// Creates an [`InvalidSetting`](ConsoleError::InvalidSetting) error.
    #[must_use]
    pub fn invalid_setting(key: impl Into<String>, value: impl Into<String>) -> Self {
        ConsoleError::InvalidSetting {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsoleError::Io(e) => write!(f, "I/O error: {e}"),
            ConsoleError::ConfigParse {
                path: Some(path),
                source,
            } => write!(f, "invalid configuration in {}: {source}", path.display()),
            ConsoleError::ConfigParse { path: None, source } => {
                write!(f, "invalid configuration: {source}")
            }
            ConsoleError::InvalidSetting { key, value } => {
                write!(f, "invalid value {value:?} for setting '{key}'")
            }
            ConsoleError::AlreadyInitialized => write!(f, "console already initialized"),
        }
    }
}

impl std::error::Error for ConsoleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConsoleError::Io(e) => Some(e),
            ConsoleError::ConfigParse { source, .. } => Some(source),
            ConsoleError::InvalidSetting { .. } | ConsoleError::AlreadyInitialized => None,
        }
    }
}

impl From<io::Error> for ConsoleError {
    fn from(err: io::Error) -> Self {
        ConsoleError::Io(err)
    }
}
