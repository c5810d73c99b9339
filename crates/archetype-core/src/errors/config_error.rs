//! Configuration errors.

use super::error_code::{self, ArchetypeErrorCode};

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid config value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    /// No writable cache directory exists, including the fallbacks.
    /// This is the one unrecoverable condition in the cache layer.
    #[error("No writable cache directory available (tried {attempted})")]
    CacheDirUnavailable { attempted: String },
}

impl ArchetypeErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidValue { .. } => error_code::CONFIG_ERROR,
            Self::CacheDirUnavailable { .. } => error_code::CACHE_DIR_UNAVAILABLE,
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;
