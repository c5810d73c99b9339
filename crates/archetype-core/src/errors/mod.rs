//! Error types for the detection engine, one enum per subsystem.

pub mod cache_error;
pub mod config_error;
pub mod error_code;
pub mod rule_error;

pub use cache_error::{CacheError, CacheResult};
pub use config_error::{ConfigError, ConfigResult};
pub use error_code::ArchetypeErrorCode;
pub use rule_error::{RuleError, RuleResult};
