//! Path/Value model
//!
//! Canonical representation of a document path and of the leaf value stored
//! in one row.
//!
//! # Encoding
//!
//! - A path is at most `max_depth` segments (64 segment columns by default)
//! - Field segments are stored verbatim; field names may not be empty or
//!   contain `[`, `]`, `.` or `*`
//! - Array indexes are stored as `[000000]`..`[999999]` so that column order
//!   equals numeric order
//! - Unused trailing segment columns hold "", which sorts before any segment
//!
//! Everything here is pure: no I/O and no shared state.

mod doc_path;
mod segment;
mod value;

pub use doc_path::DocPath;
pub use segment::{
    Segment, INDEX_RANGE_END, INDEX_RANGE_START, MAX_ENCODABLE_INDEX, RESERVED_CHARS,
};
pub use value::{LeafValue, ValueKind, EMPTY_ARRAY_MARKER, EMPTY_OBJECT_MARKER};

/// Number of segment columns in the document table
pub const MAX_SUPPORTED_DEPTH: usize = 64;
