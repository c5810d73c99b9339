//! Rule pack errors.

use super::error_code::{self, ArchetypeErrorCode};

/// Errors that can occur while loading evidence rule packs.
///
/// Individual bad patterns inside a pack are skipped with a warning, not an
/// error; these variants cover failures of a whole pack or pack directory.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("Rule pack parse error in {source_name}: {message}")]
    PackParse { source_name: String, message: String },

    #[error("Rule pack {pack} contains no usable rules")]
    EmptyPack { pack: String },
}

impl ArchetypeErrorCode for RuleError {
    fn error_code(&self) -> &'static str {
        error_code::RULE_PACK_ERROR
    }
}

pub type RuleResult<T> = Result<T, RuleError>;
