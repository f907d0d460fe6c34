//! CLI-specific error types

use std::io;

use thiserror::Error;

use crate::errors::DocsError;

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

/// CLI error
#[derive(Debug, Error)]
pub enum CliError {
    /// stdin/stdout or docs file failure
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Output could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Async runtime could not start
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// Failure reported by the engine
    #[error(transparent)]
    Docs(#[from] DocsError),
}

impl CliError {
    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        match self {
            Self::Io(_) => "DOCS_CLI_IO_ERROR",
            Self::Json(_) => "DOCS_CLI_IO_ERROR",
            Self::Runtime(_) => "DOCS_CLI_RUNTIME_ERROR",
            Self::Docs(e) => e.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_codes_pass_through() {
        let err = CliError::from(DocsError::invalid_filter("bad"));
        assert_eq!(err.code_str(), "DOCS_INVALID_FILTER");
        assert_eq!(err.to_string(), "Invalid filter: bad");
    }

    #[test]
    fn test_io_code() {
        let err = CliError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.code_str(), "DOCS_CLI_IO_ERROR");
    }
}
