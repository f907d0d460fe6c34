//! Document service: authorization, validation and orchestration

use std::collections::BTreeMap;
use std::sync::Arc;

use futures_util::stream::{self, Stream, TryStreamExt};
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::request::{GetRequest, SearchRequest};
use super::response::{DocumentResponse, SearchResponse};
use crate::assemble::{Assembler, Projection};
use crate::auth::{Authorizer, Scope, Subject};
use crate::config::DocsConfig;
use crate::errors::{DocsError, DocsResult};
use crate::path::DocPath;
use crate::query::{ExplainPlan, Filter, QueryExecutor};
use crate::store::{RowStore, TableRef, WriteOptions};
use crate::time::TimeSource;
use crate::write::{parse_document, Decomposer, WriteBatch};

/// Engine surface used by every front end
///
/// Each call authorizes first, validates its input next, and only then
/// touches the row store.
pub struct DocumentService {
    store: Arc<dyn RowStore>,
    authorizer: Arc<dyn Authorizer>,
    clock: Arc<dyn TimeSource>,
    config: DocsConfig,
    decomposer: Decomposer,
    executor: QueryExecutor,
}

enum Cursor {
    Start(Option<String>),
    Next(String),
    Done,
}

impl DocumentService {
    pub fn new(
        store: Arc<dyn RowStore>,
        authorizer: Arc<dyn Authorizer>,
        clock: Arc<dyn TimeSource>,
        config: DocsConfig,
    ) -> DocsResult<Self> {
        config.validate()?;
        Ok(Self {
            decomposer: Decomposer::new(&config),
            executor: QueryExecutor::new(Arc::clone(&store), config.clone()),
            store,
            authorizer,
            clock,
            config,
        })
    }

    pub fn config(&self) -> &DocsConfig {
        &self.config
    }

    /// Replace the value at `sub_path`; returns the write time
    pub async fn put(
        &self,
        subject: &Subject,
        table: &TableRef,
        document_id: &str,
        sub_path: &DocPath,
        payload: &str,
        options: WriteOptions,
    ) -> DocsResult<i64> {
        self.write(subject, table, document_id, sub_path, payload, false, options)
            .instrument(request_span("put", table))
            .await
    }

    /// Merge an object into the value at `sub_path`; returns the write time
    pub async fn patch(
        &self,
        subject: &Subject,
        table: &TableRef,
        document_id: &str,
        sub_path: &DocPath,
        payload: &str,
        options: WriteOptions,
    ) -> DocsResult<i64> {
        self.write(subject, table, document_id, sub_path, payload, true, options)
            .instrument(request_span("patch", table))
            .await
    }

    /// Remove the subtree at `sub_path`; returns the write time
    pub async fn delete(
        &self,
        subject: &Subject,
        table: &TableRef,
        document_id: &str,
        sub_path: &DocPath,
        options: WriteOptions,
    ) -> DocsResult<i64> {
        self.remove(subject, table, document_id, sub_path, options)
            .instrument(request_span("delete", table))
            .await
    }

    async fn remove(
        &self,
        subject: &Subject,
        table: &TableRef,
        document_id: &str,
        sub_path: &DocPath,
        options: WriteOptions,
    ) -> DocsResult<i64> {
        self.authorize_write(subject, table, Scope::Delete)?;
        check_document_id(document_id)?;

        let write_time = self.clock.current_time_micros();
        let batch = self.decomposer.delete(document_id, sub_path, write_time)?;
        self.apply(table, &batch, options).await?;
        Ok(write_time)
    }

    #[allow(clippy::too_many_arguments)]
    async fn write(
        &self,
        subject: &Subject,
        table: &TableRef,
        document_id: &str,
        sub_path: &DocPath,
        payload: &str,
        patching: bool,
        options: WriteOptions,
    ) -> DocsResult<i64> {
        self.authorize_write(subject, table, Scope::Delete)?;
        self.authorize_write(subject, table, Scope::Modify)?;
        check_document_id(document_id)?;

        let value = parse_document(payload)?;
        let write_time = self.clock.current_time_micros();
        let batch = self
            .decomposer
            .put(document_id, sub_path, &value, patching, write_time)?;
        self.apply(table, &batch, options).await?;
        Ok(write_time)
    }

    async fn apply(&self, table: &TableRef, batch: &WriteBatch, options: WriteOptions) -> DocsResult<()> {
        let mutations = batch.mutations();
        self.store.apply(table, &mutations, options).await?;
        info!(
            target: "docgate::service",
            table = %table,
            document_id = %batch.document_id,
            write_time = batch.write_time,
            deletes = batch.deletes.len(),
            inserts = batch.inserts.len(),
            "DOC_WRITE_APPLIED"
        );
        Ok(())
    }

    /// Read one document, a subtree of it, or the subdocuments matching a
    /// filter; `None` when nothing is stored there
    pub async fn get(
        &self,
        subject: &Subject,
        table: &TableRef,
        document_id: &str,
        request: GetRequest,
    ) -> DocsResult<Option<DocumentResponse>> {
        self.read(subject, table, document_id, request)
            .instrument(request_span("get", table))
            .await
    }

    async fn read(
        &self,
        subject: &Subject,
        table: &TableRef,
        document_id: &str,
        request: GetRequest,
    ) -> DocsResult<Option<DocumentResponse>> {
        self.authorize_read(subject, table)?;
        check_document_id(document_id)?;
        request.sub_path.check_depth(self.config.max_depth)?;

        let filter = self.parse_filter(request.filter.as_deref())?;
        let projection = parse_fields(request.fields.as_deref())?;

        match filter {
            Some(filter) if !filter.is_empty() => {
                let page = self
                    .executor
                    .get_matches(
                        table,
                        document_id,
                        &request.sub_path,
                        &filter,
                        projection.as_ref(),
                        self.config.page_size(request.page_size),
                        request.page_state.as_deref(),
                    )
                    .await?;
                if page.results.is_empty() {
                    return Ok(None);
                }
                let mut response = DocumentResponse::new(document_id, Value::Array(page.results));
                response.page_state = page.page_state;
                Ok(Some(response))
            }
            _ => {
                let rows = self
                    .executor
                    .fetch_rows(table, document_id, &request.sub_path)
                    .await?;
                let write_time = rows.iter().map(|r| r.write_time).max();
                let data = Assembler::at(request.sub_path.clone())
                    .with_projection(projection)
                    .assemble(&rows)?;
                debug!(
                    target: "docgate::service",
                    table = %table,
                    document_id,
                    rows = rows.len(),
                    found = data.is_some(),
                    "DOC_READ"
                );
                Ok(data.map(|data| {
                    let mut response = DocumentResponse::new(document_id, data);
                    response.write_time = write_time;
                    response
                }))
            }
        }
    }

    /// One page of documents matching the request filter
    pub async fn search(
        &self,
        subject: &Subject,
        table: &TableRef,
        request: SearchRequest,
    ) -> DocsResult<SearchResponse> {
        self.search_page(subject, table, request)
            .instrument(request_span("search", table))
            .await
    }

    async fn search_page(
        &self,
        subject: &Subject,
        table: &TableRef,
        request: SearchRequest,
    ) -> DocsResult<SearchResponse> {
        self.authorize_read(subject, table)?;
        let filter = self.parse_filter(request.filter.as_deref())?.unwrap_or_default();
        let projection = parse_fields(request.fields.as_deref())?;

        let page = self
            .executor
            .search(
                table,
                &filter,
                projection.as_ref(),
                self.config.page_size(request.page_size),
                request.page_state.as_deref(),
            )
            .await?;
        Ok(SearchResponse {
            documents: page.documents,
            page_state: page.page_state,
        })
    }

    /// Every matching document, following page states lazily
    pub fn search_stream<'a>(
        &'a self,
        subject: &'a Subject,
        table: &'a TableRef,
        request: SearchRequest,
    ) -> impl Stream<Item = DocsResult<(String, Value)>> + 'a {
        let start = Cursor::Start(request.page_state.clone());
        stream::try_unfold(start, move |cursor| {
            let request = request.clone();
            async move {
                let page_state = match cursor {
                    Cursor::Done => return Ok(None),
                    Cursor::Start(state) => state,
                    Cursor::Next(state) => Some(state),
                };
                let response = self
                    .search(subject, table, SearchRequest { page_state, ..request })
                    .await?;
                let next = match response.page_state {
                    Some(state) => Cursor::Next(state),
                    None => Cursor::Done,
                };
                Ok::<_, DocsError>(Some((response.documents, next)))
            }
        })
        .map_ok(|documents| stream::iter(documents.into_iter().map(Ok::<_, DocsError>)))
        .try_flatten()
    }

    /// Write time of every leaf under `sub_path`, keyed by dotted path
    pub async fn write_times(
        &self,
        subject: &Subject,
        table: &TableRef,
        document_id: &str,
        sub_path: &DocPath,
    ) -> DocsResult<BTreeMap<String, i64>> {
        self.leaf_write_times(subject, table, document_id, sub_path)
            .instrument(request_span("write_times", table))
            .await
    }

    async fn leaf_write_times(
        &self,
        subject: &Subject,
        table: &TableRef,
        document_id: &str,
        sub_path: &DocPath,
    ) -> DocsResult<BTreeMap<String, i64>> {
        self.authorize_read(subject, table)?;
        check_document_id(document_id)?;
        let rows = self.executor.fetch_rows(table, document_id, sub_path).await?;
        rows.iter()
            .map(|row| {
                let leaf = row.decode()?;
                Ok((leaf.path.to_dotted(), leaf.write_time))
            })
            .collect()
    }

    /// Describe how a filter would be executed
    pub fn explain(&self, filter: &str) -> DocsResult<ExplainPlan> {
        let filter = Filter::parse(filter, self.config.max_depth)?;
        Ok(self.executor.planner().explain(&filter))
    }

    fn parse_filter(&self, raw: Option<&str>) -> DocsResult<Option<Filter>> {
        raw.map(|raw| Filter::parse(raw, self.config.max_depth))
            .transpose()
    }

    fn authorize_read(&self, subject: &Subject, table: &TableRef) -> DocsResult<()> {
        self.authorizer
            .authorize_read(subject, &table.keyspace, &table.table)
            .map_err(|e| {
                warn!(
                    target: "docgate::service",
                    role = %subject.role,
                    table = %table,
                    error = %e,
                    "AUTHZ_DENIED"
                );
                DocsError::from(e)
            })
    }

    fn authorize_write(&self, subject: &Subject, table: &TableRef, scope: Scope) -> DocsResult<()> {
        self.authorizer
            .authorize_write(subject, &table.keyspace, &table.table, scope)
            .map_err(|e| {
                warn!(
                    target: "docgate::service",
                    role = %subject.role,
                    table = %table,
                    scope = %scope,
                    error = %e,
                    "AUTHZ_DENIED"
                );
                DocsError::from(e)
            })
    }
}

fn request_span(operation: &'static str, table: &TableRef) -> tracing::Span {
    info_span!(
        "docs_request",
        request_id = %Uuid::new_v4(),
        operation,
        table = %table
    )
}

fn parse_fields(raw: Option<&str>) -> DocsResult<Option<Projection>> {
    match raw {
        Some(raw) => Projection::parse(raw),
        None => Ok(None),
    }
}

fn check_document_id(document_id: &str) -> DocsResult<()> {
    if document_id.is_empty() {
        return Err(DocsError::invalid_path("document id cannot be empty"));
    }
    Ok(())
}
