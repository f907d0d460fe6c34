//! In-process row store
//!
//! Keeps every table in ordered maps and resolves writes last-write-wins,
//! including range tombstones. Used by the CLI and by tests; it also records
//! the statements it executes so callers can assert on query plans.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, RwLock};

use tracing::debug;

use super::backend::{RowStore, StoreFuture};
use super::errors::{StoreError, StoreResult};
use super::row::Row;
use super::statement::{
    Columns, Mutation, PagingState, RowPage, Select, SegmentCondition, SegmentRange, TableRef,
    WriteOptions,
};

#[derive(Debug, Clone)]
enum TombstoneScope {
    Subtree,
    Range(SegmentRange),
    Keys(Vec<String>),
}

#[derive(Debug, Clone)]
struct Tombstone {
    prefix: Vec<String>,
    scope: TombstoneScope,
    write_time: i64,
}

impl Tombstone {
    fn covers(&self, segments: &[String]) -> bool {
        if !segments.starts_with(&self.prefix) {
            return false;
        }
        let next = segments
            .get(self.prefix.len())
            .map(String::as_str)
            .unwrap_or("");
        match &self.scope {
            TombstoneScope::Subtree => true,
            TombstoneScope::Range(range) => range.contains_segment(next),
            TombstoneScope::Keys(keys) => keys.iter().any(|k| k == next),
        }
    }

    fn shadows(&self, row: &Row) -> bool {
        self.write_time >= row.write_time && self.covers(&row.segments)
    }
}

#[derive(Debug, Default)]
struct Partition {
    rows: BTreeMap<Vec<String>, Row>,
    tombstones: Vec<Tombstone>,
}

impl Partition {
    fn insert(&mut self, row: Row) {
        if self.tombstones.iter().any(|t| t.shadows(&row)) {
            return;
        }
        match self.rows.get(&row.segments) {
            Some(existing) if existing.write_time > row.write_time => {}
            _ => {
                self.rows.insert(row.segments.clone(), row);
            }
        }
    }

    fn delete(&mut self, tombstone: Tombstone) {
        self.rows.retain(|_, row| !tombstone.shadows(row));
        self.tombstones.push(tombstone);
    }
}

type Tables = HashMap<TableRef, BTreeMap<String, Partition>>;

/// Row store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    tables: RwLock<Tables>,
    selects: Mutex<Vec<Select>>,
    batches: Mutex<Vec<Vec<Mutation>>>,
    injected_failure: Mutex<Option<StoreError>>,
}

impl MemoryRowStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write a row bypassing tombstones and batching
    pub fn insert_raw(&self, table: &TableRef, row: Row) -> StoreResult<()> {
        let mut tables = self.tables.write().map_err(poisoned)?;
        tables
            .entry(table.clone())
            .or_default()
            .entry(row.document_id.clone())
            .or_default()
            .rows
            .insert(row.segments.clone(), row);
        Ok(())
    }

    /// Fail the next select or apply with `error`
    pub fn fail_next(&self, error: StoreError) {
        if let Ok(mut slot) = self.injected_failure.lock() {
            *slot = Some(error);
        }
    }

    /// Every select executed so far, in order
    pub fn executed_selects(&self) -> Vec<Select> {
        self.selects.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Every batch applied so far, in order
    pub fn applied_batches(&self) -> Vec<Vec<Mutation>> {
        self.batches.lock().map(|b| b.clone()).unwrap_or_default()
    }

    pub fn clear_log(&self) {
        if let Ok(mut selects) = self.selects.lock() {
            selects.clear();
        }
        if let Ok(mut batches) = self.batches.lock() {
            batches.clear();
        }
    }

    /// Live rows of one document, in clustering order
    pub fn rows(&self, table: &TableRef, document_id: &str) -> Vec<Row> {
        self.tables
            .read()
            .ok()
            .and_then(|tables| {
                tables
                    .get(table)
                    .and_then(|docs| docs.get(document_id))
                    .map(|p| p.rows.values().cloned().collect())
            })
            .unwrap_or_default()
    }

    fn take_failure(&self) -> StoreResult<()> {
        let mut slot = self.injected_failure.lock().map_err(poisoned)?;
        match slot.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn select_now(&self, table: &TableRef, select: &Select) -> StoreResult<RowPage> {
        self.take_failure()?;
        if needs_filtering(select) && !select.allow_filtering {
            return Err(StoreError::invalid_query(
                "statement restricts non-key columns and requires ALLOW FILTERING",
            ));
        }
        if let Ok(mut log) = self.selects.lock() {
            log.push(select.clone());
        }

        let resume = select
            .paging_state
            .as_ref()
            .map(decode_paging_state)
            .transpose()?;
        let page_size = select.page_size.unwrap_or(usize::MAX).max(1);

        let tables = self.tables.read().map_err(poisoned)?;
        let Some(docs) = tables.get(table) else {
            return Ok(RowPage::default());
        };

        let mut rows = Vec::new();
        let mut last: Option<(String, Vec<String>)> = None;
        let mut more = false;

        'docs: for (document_id, partition) in docs.iter() {
            if let Some(id) = &select.document_id {
                if document_id != id {
                    continue;
                }
            }
            if let Some(after) = &select.start_after_document {
                if document_id <= after {
                    continue;
                }
            }
            for (key, row) in partition.rows.iter() {
                if let Some((resume_doc, resume_key)) = &resume {
                    if (document_id, key) <= (resume_doc, resume_key) {
                        continue;
                    }
                }
                if !select.matches(row) {
                    continue;
                }
                if rows.len() == page_size {
                    more = true;
                    break 'docs;
                }
                last = Some((document_id.clone(), key.clone()));
                rows.push(project(row, select.columns));
            }
        }

        let paging_state = match (more, last) {
            (true, Some(last)) => Some(encode_paging_state(&last)?),
            _ => None,
        };
        debug!(
            target: "docgate::store",
            table = %table,
            rows = rows.len(),
            more = paging_state.is_some(),
            "MEMORY_STORE_SELECT"
        );
        Ok(RowPage { rows, paging_state })
    }

    fn apply_now(&self, table: &TableRef, mutations: &[Mutation]) -> StoreResult<()> {
        self.take_failure()?;
        let mut tables = self.tables.write().map_err(poisoned)?;
        let docs = tables.entry(table.clone()).or_default();

        for mutation in mutations {
            let partition = docs.entry(mutation.document_id().to_string()).or_default();
            match mutation {
                Mutation::Insert { row } => partition.insert(row.clone()),
                Mutation::DeleteRange {
                    prefix,
                    range,
                    write_time,
                    ..
                } => partition.delete(Tombstone {
                    prefix: encode_prefix(prefix),
                    scope: range
                        .clone()
                        .map_or(TombstoneScope::Subtree, TombstoneScope::Range),
                    write_time: *write_time,
                }),
                Mutation::DeleteKeys {
                    prefix,
                    keys,
                    write_time,
                    ..
                } => partition.delete(Tombstone {
                    prefix: encode_prefix(prefix),
                    scope: TombstoneScope::Keys(keys.clone()),
                    write_time: *write_time,
                }),
            }
        }
        drop(tables);

        if let Ok(mut log) = self.batches.lock() {
            log.push(mutations.to_vec());
        }
        Ok(())
    }
}

impl RowStore for MemoryRowStore {
    fn select<'a>(&'a self, table: &'a TableRef, select: &'a Select) -> StoreFuture<'a, RowPage> {
        Box::pin(async move { self.select_now(table, select) })
    }

    fn apply<'a>(
        &'a self,
        table: &'a TableRef,
        mutations: &'a [Mutation],
        _options: WriteOptions,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move { self.apply_now(table, mutations) })
    }
}

/// True unless the statement names a partition and restricts only a
/// leading run of clustering columns by equality
fn needs_filtering(select: &Select) -> bool {
    if select.document_id.is_none() || select.leaf.is_some() || select.value.is_some() {
        return true;
    }
    let mut positions: Vec<usize> = Vec::with_capacity(select.segments.len());
    for predicate in &select.segments {
        if !matches!(predicate.condition, SegmentCondition::Eq(_)) {
            return true;
        }
        positions.push(predicate.position);
    }
    positions.sort_unstable();
    positions.iter().enumerate().any(|(i, p)| i != *p)
}

fn encode_prefix(prefix: &crate::path::DocPath) -> Vec<String> {
    prefix
        .segments()
        .iter()
        .map(|s| s.encode().into_owned())
        .collect()
}

fn project(row: &Row, columns: Columns) -> Row {
    match columns {
        Columns::Full => row.clone(),
        Columns::KeyAndLeaf => Row {
            document_id: row.document_id.clone(),
            segments: Vec::new(),
            leaf: row.leaf.clone(),
            text_value: None,
            dbl_value: None,
            bool_value: None,
            write_time: row.write_time,
        },
    }
}

fn encode_paging_state(last: &(String, Vec<String>)) -> StoreResult<PagingState> {
    serde_json::to_vec(last)
        .map(PagingState)
        .map_err(|e| StoreError::invalid_query(format!("paging state: {}", e)))
}

fn decode_paging_state(state: &PagingState) -> StoreResult<(String, Vec<String>)> {
    serde_json::from_slice(&state.0)
        .map_err(|e| StoreError::invalid_query(format!("paging state: {}", e)))
}

fn poisoned<T>(e: std::sync::PoisonError<T>) -> StoreError {
    StoreError::unavailable(format!("lock poisoned: {}", e))
}
