//! # Write Decomposer
//!
//! JSON value + target path → deletes and inserts under one write time.

mod batch;
mod decomposer;
mod json;

pub use batch::WriteBatch;
pub use decomposer::Decomposer;
pub use json::parse_document;
