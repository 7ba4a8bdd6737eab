mod executor;
mod program;

pub use executor::{DEFAULT_EXECUTION_TIMEOUT, ScriptExecutor};
pub use program::{
    ENTRY_POINT, ExtractionRule, MAX_RULES, MAX_SCRIPT_BYTES, SCRIPT_VERSION, ScriptProgram,
};

use std::time::Duration;

/// Reasons a stored script is rejected instead of producing a subtitle.
///
/// Every variant is recovered locally: callers of `ScriptRunner::run` only
/// ever observe "no result".
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("Script too large: {0} bytes")]
    TooLarge(usize),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported script version: {0}")]
    Version(u32),

    #[error("Entry point not found: {0:?}")]
    EntryPoint(String),

    #[error("Too many rules: {0}")]
    RuleCount(usize),

    #[error("Execution timed out after {0:?}")]
    Timeout(Duration),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Result is not a well-formed episode subtitle: {0}")]
    TypeCheck(String),
}
