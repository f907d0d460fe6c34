//! # Document Service
//!
//! Front-end-facing surface of the engine: writes, reads, searches and
//! plan descriptions over one keyspace-qualified table.

mod documents;
mod request;
mod response;

pub use documents::DocumentService;
pub use request::{GetRequest, SearchRequest};
pub use response::{DocumentResponse, SearchResponse};
