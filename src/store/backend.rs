//! Row Store Adapter contract
//!
//! The gateway never talks to a wide-column cluster directly. Everything it
//! needs is two calls: a paged select with clustering-column predicates and
//! an atomic batch of row mutations.

use std::future::Future;
use std::pin::Pin;

use super::errors::StoreResult;
use super::statement::{Mutation, RowPage, Select, TableRef, WriteOptions};

/// Boxed future returned by [`RowStore`] calls
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = StoreResult<T>> + Send + 'a>>;

/// Access to the document table of a wide-column store
///
/// Ordering contract for `select`: rows of one document are returned
/// together, in ascending order of their padded segment columns. Documents
/// are returned in ascending id order. A page never splits that order.
///
/// `apply` is atomic per call: either every mutation lands or none does.
/// Mutations carry their own write times and the store resolves conflicts
/// last-write-wins, deletes winning ties against inserts with an equal or
/// earlier time.
pub trait RowStore: Send + Sync {
    /// Execute one page of a select
    fn select<'a>(&'a self, table: &'a TableRef, select: &'a Select) -> StoreFuture<'a, RowPage>;

    /// Apply a batch of mutations as one logged batch
    fn apply<'a>(
        &'a self,
        table: &'a TableRef,
        mutations: &'a [Mutation],
        options: WriteOptions,
    ) -> StoreFuture<'a, ()>;
}
