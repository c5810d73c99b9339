//! ArchetypeErrorCode trait for stable error codes in logs.

/// Trait for attaching a stable, machine-readable code to every error enum.
/// Log consumers correlate on the code string rather than the message text,
/// which is free to change.
pub trait ArchetypeErrorCode {
    /// Returns the error code string (e.g., "CACHE_ERROR").
    fn error_code(&self) -> &'static str;

    /// Returns the formatted log string: `[ERROR_CODE] message`.
    fn log_string(&self) -> String
    where
        Self: std::fmt::Display,
    {
        format!("[{}] {}", self.error_code(), self)
    }
}

// Error code constants.
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const CACHE_DIR_UNAVAILABLE: &str = "CACHE_DIR_UNAVAILABLE";
pub const RULE_PACK_ERROR: &str = "RULE_PACK_ERROR";
pub const CACHE_ERROR: &str = "CACHE_ERROR";
pub const CACHE_CORRUPT: &str = "CACHE_CORRUPT";
