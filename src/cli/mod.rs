//! Command line support for the `dsc` binary.
//!
//! Scenario files drive an in-memory engine; output is rendered as styled
//! text or JSON.

pub mod output;
pub mod scenario;

pub use output::*;
pub use scenario::*;

use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// CLI RESULT
// ═══════════════════════════════════════════════════════════════════════════════

/// CLI error types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CliError {
    /// Engine rejected an operation or configuration
    #[error("engine error: {0}")]
    Engine(#[from] crate::error::Error),

    /// Scenario file could not be parsed or written
    #[error("scenario error: {0}")]
    Scenario(String),

    /// Invalid argument
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error
    #[error("io error: {0}")]
    Io(String),
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_cli_error_display() {
        let err = CliError::Scenario("missing field `steps`".into());
        assert!(err.to_string().contains("scenario error"));

        let err: CliError = Error::NonPositiveAmount.into();
        assert!(matches!(err, CliError::Engine(Error::NonPositiveAmount)));
    }
}
