//! Search execution
//!
//! Runs candidate queries against the row store, intersects their id sets,
//! then fetches and re-checks each surviving document in id order. When no
//! condition can narrow the candidates, the whole table is scanned and every
//! document is evaluated in memory.

use std::collections::BTreeSet;
use std::sync::Arc;

use futures_util::stream::{self, StreamExt, TryStreamExt};
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::filter::Filter;
use super::page_state::{decode_page_state, encode_page_state};
use super::pattern::PatternSegment;
use super::planner::{QueryPlanner, SearchPlan};
use crate::assemble::{Assembler, Projection};
use crate::config::DocsConfig;
use crate::errors::{DocsError, DocsResult};
use crate::path::DocPath;
use crate::store::{Leaf, Row, RowStore, Select, TableRef};

/// One page of search results
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPage {
    /// Matched documents in id order
    pub documents: Vec<(String, Value)>,
    /// Present when more documents may match
    pub page_state: Option<String>,
}

/// One page of subdocuments matched inside a single document
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchPage {
    /// One value per matched parent path, in path order
    pub results: Vec<Value>,
    pub page_state: Option<String>,
}

/// Executes planned searches against a row store
pub struct QueryExecutor {
    store: Arc<dyn RowStore>,
    planner: QueryPlanner,
    config: DocsConfig,
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn RowStore>, config: DocsConfig) -> Self {
        Self {
            store,
            planner: QueryPlanner::new(config.max_depth),
            config,
        }
    }

    pub fn planner(&self) -> &QueryPlanner {
        &self.planner
    }

    /// Every row of a select, following store paging
    pub async fn select_all(&self, table: &TableRef, select: Select) -> DocsResult<Vec<Row>> {
        let mut rows = Vec::new();
        let mut paging_state = None;
        loop {
            let paged = select
                .clone()
                .with_page(self.config.store_page_size, paging_state.take());
            let page = self.store.select(table, &paged).await?;
            rows.extend(page.rows);
            match page.paging_state {
                Some(state) => paging_state = Some(state),
                None => return Ok(rows),
            }
        }
    }

    /// Rows of one document under `base`
    pub async fn fetch_rows(
        &self,
        table: &TableRef,
        document_id: &str,
        base: &DocPath,
    ) -> DocsResult<Vec<Row>> {
        self.select_all(table, Select::document(document_id).with_prefix(base))
            .await
    }

    /// Documents matching `filter`, one page at a time
    pub async fn search(
        &self,
        table: &TableRef,
        filter: &Filter,
        projection: Option<&Projection>,
        page_size: usize,
        page_state: Option<&str>,
    ) -> DocsResult<SearchPage> {
        let after = page_state.map(decode_page_state).transpose()?;
        let plan = self.planner.plan(filter);
        let collector = PageCollector::new(filter, projection, page_size);

        debug!(
            target: "docgate::query",
            table = %table,
            conditions = plan.conditions.len(),
            candidate_queries = plan.candidate_selects().count(),
            "SEARCH_PLANNED"
        );

        if plan.is_full_scan() {
            self.full_scan(table, after, collector).await
        } else {
            self.candidate_search(table, &plan, after, collector).await
        }
    }

    async fn candidate_search(
        &self,
        table: &TableRef,
        plan: &SearchPlan,
        after: Option<String>,
        mut collector: PageCollector<'_>,
    ) -> DocsResult<SearchPage> {
        let id_sets: Vec<BTreeSet<String>> = stream::iter(plan.candidate_selects())
            .map(|select| self.candidate_ids(table, select))
            .buffer_unordered(self.config.max_concurrency)
            .try_collect()
            .await?;

        let mut sets = id_sets.into_iter();
        let mut candidates = sets.next().unwrap_or_default();
        for set in sets {
            candidates.retain(|id| set.contains(id));
        }
        if let Some(after) = &after {
            candidates.retain(|id| id.as_str() > after.as_str());
        }

        debug!(
            target: "docgate::query",
            table = %table,
            candidates = candidates.len(),
            "SEARCH_CANDIDATES_INTERSECTED"
        );

        let root = &DocPath::root();
        let fetches = stream::iter(candidates)
            .map(|id| async move {
                let rows = self.fetch_rows(table, &id, root).await?;
                Ok::<_, DocsError>((id, rows))
            })
            .buffered(self.config.max_concurrency);
        futures_util::pin_mut!(fetches);

        while let Some(fetched) = fetches.next().await {
            let (id, rows) = fetched?;
            let leaves = decode_rows(&rows)?;
            if !collector.offer(id, leaves)? {
                break;
            }
        }
        Ok(collector.finish())
    }

    async fn candidate_ids(&self, table: &TableRef, select: &Select) -> DocsResult<BTreeSet<String>> {
        let rows = self.select_all(table, select.clone()).await?;
        Ok(rows.into_iter().map(|r| r.document_id).collect())
    }

    async fn full_scan(
        &self,
        table: &TableRef,
        after: Option<String>,
        mut collector: PageCollector<'_>,
    ) -> DocsResult<SearchPage> {
        info!(target: "docgate::query", table = %table, "SEARCH_FULL_SCAN");

        let mut paging_state = None;
        let mut current: Option<(String, Vec<Leaf>)> = None;
        let mut scanned = 0usize;

        'scan: loop {
            let select = Select::scan()
                .after_document(after.clone())
                .with_page(self.config.store_page_size, paging_state.take());
            let page = self.store.select(table, &select).await?;

            for row in page.rows {
                let leaf = row.decode()?;
                if let Some((id, leaves)) = current.as_mut() {
                    if *id == leaf.document_id {
                        leaves.push(leaf);
                        continue;
                    }
                }
                let next = (leaf.document_id.clone(), vec![leaf]);
                if let Some((id, leaves)) = current.replace(next) {
                    scanned += 1;
                    if !collector.offer(id, leaves)? {
                        current = None;
                        break 'scan;
                    }
                }
            }

            match page.paging_state {
                Some(state) => paging_state = Some(state),
                None => break,
            }
        }

        if let Some((id, leaves)) = current.take() {
            scanned += 1;
            collector.offer(id, leaves)?;
        }

        debug!(
            target: "docgate::query",
            table = %table,
            scanned,
            matched = collector.documents.len(),
            "SEARCH_FULL_SCAN_COMPLETE"
        );
        Ok(collector.finish())
    }

    /// Subdocuments of one document whose leaves satisfy `filter`
    ///
    /// Filter paths are relative to `base`, and every condition must share
    /// one parent pattern. Each result holds the matched leaves, or with a
    /// projection the matched parent's projected children, rooted at `base`.
    #[allow(clippy::too_many_arguments)]
    pub async fn get_matches(
        &self,
        table: &TableRef,
        document_id: &str,
        base: &DocPath,
        filter: &Filter,
        projection: Option<&Projection>,
        page_size: usize,
        page_state: Option<&str>,
    ) -> DocsResult<MatchPage> {
        let after = match page_state.map(decode_page_state).transpose()? {
            Some(raw) => Some(DocPath::parse_dotted(&raw).map_err(|e| {
                DocsError::invalid_filter(format!("malformed page state: {}", e))
            })?),
            None => None,
        };

        let filter = filter.under(base);
        let conditions = filter.conditions();
        let parent_pattern = conditions
            .first()
            .map(|c| c.pattern.parent())
            .ok_or_else(|| DocsError::invalid_filter("filter must contain at least one condition"))?;
        if conditions.iter().any(|c| c.pattern.parent() != parent_pattern) {
            return Err(DocsError::invalid_filter(
                "all filter paths of a document get must share one parent path",
            ));
        }

        let mut select = Select::document(document_id).with_prefix(&parent_pattern.fixed_prefix());
        if let ([condition], None) = (conditions, projection) {
            if let Some(PatternSegment::Exact(last)) = condition.pattern.last() {
                select = select.with_leaf(last.encode().into_owned());
            }
            if let Some(predicate) = condition.operators.iter().find_map(|op| op.pushdown()) {
                select = select.with_value(predicate);
            }
        }

        let rows = self.select_all(table, select).await?;
        let leaves = decode_rows(&rows)?;

        let mut matched: Option<BTreeSet<DocPath>> = None;
        for condition in conditions {
            let parents: BTreeSet<DocPath> = leaves
                .iter()
                .filter(|leaf| condition.accepts(leaf))
                .map(|leaf| leaf.path.parent())
                .collect();
            matched = Some(match matched {
                None => parents,
                Some(previous) => previous.intersection(&parents).cloned().collect(),
            });
        }

        let assembler = Assembler::at(base.clone());
        let mut page = MatchPage::default();
        let mut last: Option<DocPath> = None;
        for parent in matched.unwrap_or_default() {
            if after.as_ref().map_or(false, |a| &parent <= a) {
                continue;
            }
            if page.results.len() == page_size {
                page.page_state = last.as_ref().map(|p| encode_page_state(&p.to_dotted()));
                break;
            }

            let selected: Vec<Leaf> = leaves
                .iter()
                .filter(|leaf| match projection {
                    Some(projection) => leaf
                        .path
                        .strip_prefix(&parent)
                        .map_or(false, |relative| projection.includes(&relative)),
                    None => {
                        leaf.path.parent() == parent && conditions.iter().any(|c| c.accepts(leaf))
                    }
                })
                .cloned()
                .collect();
            let value = assembler
                .assemble_leaves(selected)?
                .unwrap_or_else(|| Value::Object(Map::new()));
            page.results.push(value);
            last = Some(parent);
        }

        debug!(
            target: "docgate::query",
            table = %table,
            document_id,
            results = page.results.len(),
            more = page.page_state.is_some(),
            "DOC_GET_FILTERED"
        );
        Ok(page)
    }
}

/// Accumulates matching documents up to a page
struct PageCollector<'a> {
    filter: &'a Filter,
    assembler: Assembler,
    page_size: usize,
    documents: Vec<(String, Value)>,
    more: bool,
}

impl<'a> PageCollector<'a> {
    fn new(filter: &'a Filter, projection: Option<&Projection>, page_size: usize) -> Self {
        Self {
            filter,
            assembler: Assembler::new().with_projection(projection.cloned()),
            page_size,
            documents: Vec::new(),
            more: false,
        }
    }

    /// Evaluate one document; returns false once a match past the page end
    /// was seen
    fn offer(&mut self, document_id: String, leaves: Vec<Leaf>) -> DocsResult<bool> {
        if leaves.is_empty() || !self.filter.matches(&leaves) {
            return Ok(true);
        }
        if self.documents.len() == self.page_size {
            self.more = true;
            return Ok(false);
        }
        let value = self
            .assembler
            .assemble_leaves(leaves)?
            .unwrap_or_else(|| Value::Object(Map::new()));
        self.documents.push((document_id, value));
        Ok(true)
    }

    fn finish(self) -> SearchPage {
        let page_state = if self.more {
            self.documents
                .last()
                .map(|(id, _)| encode_page_state(id))
        } else {
            None
        };
        SearchPage {
            documents: self.documents,
            page_state,
        }
    }
}

fn decode_rows(rows: &[Row]) -> DocsResult<Vec<Leaf>> {
    rows.iter().map(Row::decode).collect()
}
