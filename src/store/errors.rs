//! # Row Store Errors

use thiserror::Error;

/// Result type for row-store calls
pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a [`RowStore`](super::RowStore) implementation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Backing store cannot be reached or rejected the request for load reasons
    #[error("{0}")]
    Unavailable(String),

    /// Request exceeded the store's deadline
    #[error("timed out: {0}")]
    Timeout(String),

    /// Statement the store refuses to execute
    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Returns true if the same request may succeed later
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_) | StoreError::Timeout(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StoreError::unavailable("down").is_transient());
        assert!(StoreError::Timeout("read".into()).is_transient());
        assert!(!StoreError::invalid_query("no partition key").is_transient());
    }
}
