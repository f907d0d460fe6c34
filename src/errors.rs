//! # Document Engine Errors
//!
//! Error taxonomy shared by every engine operation.
//!
//! Client errors (bad input, missing permission) are always detected before
//! any row-store call. Server errors are either invariant violations found in
//! stored rows or failures propagated from the row store.

use thiserror::Error;

use crate::auth::AuthError;
use crate::store::StoreError;

/// Result type for engine operations
pub type DocsResult<T> = Result<T, DocsError>;

/// Engine errors
#[derive(Debug, Clone, Error)]
pub enum DocsError {
    // ==================
    // Client Errors
    // ==================
    /// Path too deep, index beyond encoding capacity, or reserved characters
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// Malformed JSON payload or a payload the requested write cannot accept
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Malformed filter, fields list, or page state
    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    /// Caller lacks the required scope
    #[error("{0}")]
    Unauthorized(#[from] AuthError),

    // ==================
    // Server Errors
    // ==================
    /// Stored rows violate the document well-formedness invariant
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Transport or backing store failure
    #[error("Row store unavailable: {0}")]
    RowStoreUnavailable(#[from] StoreError),
}

impl DocsError {
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    pub fn invalid_filter(msg: impl Into<String>) -> Self {
        Self::InvalidFilter(msg.into())
    }

    pub fn corrupt_row(msg: impl Into<String>) -> Self {
        Self::CorruptRow(msg.into())
    }

    /// Stable error code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPath(_) => "DOCS_INVALID_PATH",
            Self::InvalidDocument(_) => "DOCS_INVALID_DOCUMENT",
            Self::InvalidFilter(_) => "DOCS_INVALID_FILTER",
            Self::Unauthorized(_) => "DOCS_UNAUTHORIZED",
            Self::CorruptRow(_) => "DOCS_CORRUPT_ROW",
            Self::RowStoreUnavailable(_) => "DOCS_ROW_STORE_UNAVAILABLE",
        }
    }

    /// Returns true if the caller caused the error
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidPath(_)
                | Self::InvalidDocument(_)
                | Self::InvalidFilter(_)
                | Self::Unauthorized(_)
        )
    }

    /// Returns true if the error may go away on retry
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RowStoreUnavailable(err) if err.is_transient())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            DocsError::invalid_path("too deep").code(),
            "DOCS_INVALID_PATH"
        );
        assert_eq!(
            DocsError::invalid_filter("bad op").code(),
            "DOCS_INVALID_FILTER"
        );
        assert_eq!(
            DocsError::corrupt_row("mixed kinds").code(),
            "DOCS_CORRUPT_ROW"
        );
    }

    #[test]
    fn test_client_classification() {
        assert!(DocsError::invalid_document("dup key").is_client_error());
        assert!(DocsError::from(AuthError::denied("no read")).is_client_error());
        assert!(!DocsError::corrupt_row("x").is_client_error());
        assert!(!DocsError::from(StoreError::unavailable("down")).is_client_error());
    }

    #[test]
    fn test_auth_errors_never_retried() {
        let err = DocsError::from(AuthError::denied("test1"));
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "Access denied: test1");

        let err = DocsError::from(StoreError::unavailable("connection reset"));
        assert!(err.is_retryable());
    }
}
