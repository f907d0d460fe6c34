//! docgate - schemaless JSON documents over a wide-column row store
//!
//! Each document is shredded into one row per scalar leaf, clustered by
//! path segments, and reassembled on read. Searches push what they can
//! down to the row store and re-check the full filter in memory.

pub mod assemble;
pub mod auth;
pub mod cli;
pub mod config;
pub mod errors;
pub mod path;
pub mod query;
pub mod service;
pub mod store;
pub mod time;
pub mod write;

pub use config::DocsConfig;
pub use errors::{DocsError, DocsResult};
pub use service::DocumentService;
