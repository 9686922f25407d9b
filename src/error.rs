//! Error handling for wordlist-forge

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::JobArea;

/// Main error type for wordlist-forge
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ForgeError {
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        parameter: Option<String>,
    },

    #[error("Capacity exceeded: {total} candidates exceed the in-memory limit of {limit}")]
    CapacityExceeded { total: u128, limit: u64 },

    #[error("IO error: {message}")]
    Io {
        message: String,
        path: Option<String>,
    },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("A {area} job is already running")]
    Busy { area: JobArea },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("CLI error: {message}")]
    Cli { message: String },
}

impl ForgeError {
    /// Create a validation error naming the offending parameter
    pub fn invalid_parameter(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            parameter: Some(parameter.into()),
        }
    }

    /// Create a capacity error
    pub fn capacity_exceeded(total: u128, limit: u64) -> Self {
        Self::CapacityExceeded { total, limit }
    }

    /// Create an IO error
    pub fn io(message: impl Into<String>, path: Option<String>) -> Self {
        Self::Io {
            message: message.into(),
            path,
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a busy error for an area that already has a running job
    pub fn busy(area: JobArea) -> Self {
        Self::Busy { area }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create a CLI error
    pub fn cli(message: impl Into<String>) -> Self {
        Self::Cli {
            message: message.into(),
        }
    }

    /// Whether the caller can fix the request and try again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::CapacityExceeded { .. } | Self::Busy { .. }
        )
    }

    /// Get user-friendly error message with suggestions
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation { message, parameter } => {
                let param = parameter.as_ref().map_or(String::new(), |p| format!(" ({})", p));
                format!("❌ Invalid input{}: {}\n💡 Check your input format", param, message)
            }
            Self::CapacityExceeded { total, limit } => {
                format!(
                    "⚠️  {} candidates exceed the in-memory limit of {}\n💡 Write the list to a file with --output instead",
                    total, limit
                )
            }
            Self::Io { message, path } => {
                let path_info = path.as_ref().map_or(String::new(), |p| format!(" ({})", p));
                format!("❌ File error{}: {}\n💡 Check file permissions and paths", path_info, message)
            }
            Self::Config { message } => {
                format!("❌ Configuration problem: {}\n💡 Check your .env file or environment", message)
            }
            Self::Busy { area } => {
                format!("⏳ A {} job is already running\n💡 Wait for it to finish or cancel it", area)
            }
            Self::Internal { message } => {
                format!("❌ Internal error: {}\n💡 This is a bug, please report it", message)
            }
            Self::Cli { message } => {
                format!("❌ Command error: {}\n💡 Use --help for usage information", message)
            }
        }
    }
}

impl From<std::io::Error> for ForgeError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string(), None)
    }
}

impl From<serde_json::Error> for ForgeError {
    fn from(err: serde_json::Error) -> Self {
        Self::internal(format!("Serialization failed: {}", err))
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Build an internal error from a message or format string
#[macro_export]
macro_rules! internal_error {
    ($msg:expr) => {
        $crate::error::ForgeError::internal($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::ForgeError::internal(format!($fmt, $($arg)*))
    };
}
