//! # Row Store
//!
//! Physical row layout of the document table and the adapter contract the
//! engine uses to read and write it.
//!
//! Table shape, with `N` = configured maximum depth:
//!
//! ```text
//! key TEXT, p0..p{N-1} TEXT, leaf TEXT,
//! text_value TEXT, dbl_value DOUBLE, bool_value BOOLEAN,
//! PRIMARY KEY ((key), p0, ..., p{N-1})
//! ```

mod backend;
mod errors;
mod memory;
mod row;
mod statement;

pub use backend::{RowStore, StoreFuture};
pub use errors::{StoreError, StoreResult};
pub use memory::MemoryRowStore;
pub use row::{Leaf, Row};
pub use statement::{
    ColumnLiteral, Columns, CompareOp, Consistency, Mutation, PagingState, RowPage,
    SegmentCondition, SegmentPredicate, SegmentRange, Select, TableRef, ValuePredicate,
    WriteOptions,
};
