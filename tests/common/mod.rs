//! Shared fixtures for service-level tests

#![allow(dead_code)]

use std::sync::Arc;

use docgate::auth::{AuthError, AuthResult, Authorizer, Scope, Subject};
use docgate::store::{MemoryRowStore, TableRef};
use docgate::time::ManualTimeSource;
use docgate::{DocsConfig, DocumentService};

pub const START_TIME: i64 = 1_000;

pub struct Harness {
    pub store: Arc<MemoryRowStore>,
    pub clock: Arc<ManualTimeSource>,
    pub service: DocumentService,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(DocsConfig::default())
    }

    pub fn with_config(config: DocsConfig) -> Self {
        Self::build(config, Arc::new(docgate::auth::AllowAll))
    }

    pub fn denying(denied: Vec<Scope>, deny_read: bool) -> Self {
        Self::build(
            DocsConfig::default(),
            Arc::new(ScriptedAuthorizer { denied, deny_read }),
        )
    }

    fn build(config: DocsConfig, authorizer: Arc<dyn Authorizer>) -> Self {
        let store = Arc::new(MemoryRowStore::new());
        let clock = Arc::new(ManualTimeSource::new(START_TIME));
        let service =
            DocumentService::new(store.clone(), authorizer, clock.clone(), config).unwrap();
        Self {
            store,
            clock,
            service,
        }
    }

    /// Move the clock so the next write gets a fresh timestamp
    pub fn tick(&self) -> i64 {
        self.clock.advance(10)
    }
}

pub fn subject() -> Subject {
    Subject::new("token-1", "writer")
}

pub fn table() -> TableRef {
    TableRef::new("ks", "docs")
}

/// Denies the listed write scopes and, optionally, reads
pub struct ScriptedAuthorizer {
    pub denied: Vec<Scope>,
    pub deny_read: bool,
}

impl Authorizer for ScriptedAuthorizer {
    fn authorize_read(&self, _subject: &Subject, _keyspace: &str, table: &str) -> AuthResult<()> {
        if self.deny_read {
            return Err(AuthError::denied(format!("no SELECT on {}", table)));
        }
        Ok(())
    }

    fn authorize_write(
        &self,
        _subject: &Subject,
        _keyspace: &str,
        table: &str,
        scope: Scope,
    ) -> AuthResult<()> {
        if self.denied.contains(&scope) {
            return Err(AuthError::denied(format!("no {} on {}", scope, table)));
        }
        Ok(())
    }
}
