//! Authorizer trait and the request subject

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::AuthResult;

/// Write scopes checked before a mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Insert or overwrite rows
    Modify,
    /// Remove rows
    Delete,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Modify => "MODIFY",
            Scope::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated caller, resolved by the front end
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Token the caller presented
    pub token: String,
    /// Role or user name the token resolved to
    pub role: String,
}

impl Subject {
    pub fn new(token: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            role: role.into(),
        }
    }
}

/// Authorization collaborator consulted before every row-store access
pub trait Authorizer: Send + Sync {
    /// Check that the subject may read the table
    fn authorize_read(&self, subject: &Subject, keyspace: &str, table: &str) -> AuthResult<()>;

    /// Check that the subject holds `scope` on the table
    fn authorize_write(
        &self,
        subject: &Subject,
        keyspace: &str,
        table: &str,
        scope: Scope,
    ) -> AuthResult<()>;
}

/// Authorizer that accepts every request (embedded use and tooling)
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn authorize_read(&self, _subject: &Subject, _keyspace: &str, _table: &str) -> AuthResult<()> {
        Ok(())
    }

    fn authorize_write(
        &self,
        _subject: &Subject,
        _keyspace: &str,
        _table: &str,
        _scope: Scope,
    ) -> AuthResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all_accepts_everything() {
        let subject = Subject::new("token", "user1");
        assert!(AllowAll.authorize_read(&subject, "ks", "docs").is_ok());
        assert!(AllowAll
            .authorize_write(&subject, "ks", "docs", Scope::Delete)
            .is_ok());
    }

    #[test]
    fn test_scope_names() {
        assert_eq!(Scope::Modify.to_string(), "MODIFY");
        assert_eq!(Scope::Delete.as_str(), "DELETE");
    }
}
