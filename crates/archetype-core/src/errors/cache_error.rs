//! Result cache errors.
//!
//! Cache failures are recoverable by design: a failed store means the result
//! is simply not cached, a failed retrieve is a miss. Callers log these via
//! [`ArchetypeErrorCode::log_string`] and carry on.

use super::error_code::{self, ArchetypeErrorCode};

/// Errors that can occur in the cache layer.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache backend error: {message}")]
    Backend { message: String },

    #[error("Cache entry serialization failed: {message}")]
    Serialization { message: String },

    #[error("Cache entry corrupt for key {key}: {message}")]
    CorruptEntry { key: String, message: String },

    #[error("Cache I/O error: {message}")]
    Io { message: String },
}

impl ArchetypeErrorCode for CacheError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::CorruptEntry { .. } => error_code::CACHE_CORRUPT,
            _ => error_code::CACHE_ERROR,
        }
    }
}

pub type CacheResult<T> = Result<T, CacheError>;
