//! # Authorization Errors

use thiserror::Error;

/// Result type for authorization checks
pub type AuthResult<T> = Result<T, AuthError>;

/// Authorization errors raised by an [`Authorizer`](super::Authorizer)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Caller is not authenticated
    #[error("Authentication required")]
    AuthenticationRequired,

    /// Caller lacks the required scope on the table
    #[error("Access denied: {0}")]
    Denied(String),
}

impl AuthError {
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::Denied(reason.into())
    }

    /// Returns the HTTP status code a front end should map this error to
    pub fn status_code(&self) -> u16 {
        match self {
            AuthError::AuthenticationRequired => 401,
            AuthError::Denied(_) => 403,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(AuthError::AuthenticationRequired.status_code(), 401);
        assert_eq!(AuthError::denied("x").status_code(), 403);
    }

    #[test]
    fn test_denied_message_keeps_reason() {
        assert_eq!(AuthError::denied("test1").to_string(), "Access denied: test1");
    }
}
