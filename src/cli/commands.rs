//! CLI command implementations
//!
//! Each command builds its result as a JSON value; `run_command` owns the
//! stdin/stdout side.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::{json, Value};
use tracing::debug;

use crate::auth::{AllowAll, Subject};
use crate::config::DocsConfig;
use crate::errors::DocsError;
use crate::path::DocPath;
use crate::service::{DocumentService, SearchRequest};
use crate::store::{MemoryRowStore, TableRef, WriteOptions};
use crate::time::{SystemTimeSource, TimeSource};
use crate::write::{parse_document, Decomposer};

use super::args::{Cli, Command};
use super::errors::{CliError, CliResult};
use super::io::{read_input, write_error, write_response};

const CLI_KEYSPACE: &str = "docgate";
const CLI_TABLE: &str = "documents";

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse_args();
    let result = load_config(cli.config.as_deref()).and_then(|config| run_command(&config, cli.command));
    if let Err(e) = &result {
        write_error(e.code_str(), &e.to_string())?;
    }
    result
}

/// Run the appropriate command based on CLI args
pub fn run_command(config: &DocsConfig, cmd: Command) -> CliResult<()> {
    let data = match cmd {
        Command::Decompose { id, path, patch } => {
            let input = read_input()?;
            let write_time = SystemTimeSource::new().current_time_micros();
            decompose(config, &id, path.as_deref(), patch, &input, write_time)?
        }
        Command::Search {
            docs,
            filter,
            fields,
            page_size,
            page_state,
            raw,
        } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(|e| CliError::Runtime(e.to_string()))?;
            let mut request = SearchRequest::new();
            request.filter = filter;
            request.fields = fields;
            request.page_size = page_size;
            request.page_state = page_state;
            runtime.block_on(search(config, &docs, request, raw))?
        }
        Command::Explain { filter } => explain(config, &filter)?,
    };
    write_response(data)
}

fn load_config(path: Option<&Path>) -> CliResult<DocsConfig> {
    match path {
        Some(path) => Ok(DocsConfig::load(path)?),
        None => Ok(DocsConfig::default()),
    }
}

/// Row mutations a write of `input` would apply
pub fn decompose(
    config: &DocsConfig,
    document_id: &str,
    path: Option<&str>,
    patching: bool,
    input: &str,
    write_time: i64,
) -> CliResult<Value> {
    let target = match path {
        Some(raw) => DocPath::parse_dotted(raw)?,
        None => DocPath::root(),
    };
    let value = parse_document(input)?;
    let batch = Decomposer::new(config).put(document_id, &target, &value, patching, write_time)?;
    debug!(
        target: "docgate::cli",
        document_id,
        mutations = batch.len(),
        "CLI_DECOMPOSED"
    );
    Ok(json!({
        "documentId": batch.document_id,
        "writeTime": batch.write_time,
        "mutations": batch.describe(),
    }))
}

/// Load `docs_file` into a memory store and run one search page over it
pub async fn search(
    config: &DocsConfig,
    docs_file: &Path,
    request: SearchRequest,
    raw: bool,
) -> CliResult<Value> {
    let documents = match parse_document(&fs::read_to_string(docs_file)?)? {
        Value::Object(documents) => documents,
        _ => {
            return Err(CliError::Docs(DocsError::invalid_document(
                "docs file must hold an object of id to document",
            )))
        }
    };

    let service = DocumentService::new(
        Arc::new(MemoryRowStore::new()),
        Arc::new(AllowAll),
        Arc::new(SystemTimeSource::new()),
        config.clone(),
    )?;
    let subject = Subject::new("cli", "cli");
    let table = TableRef::new(CLI_KEYSPACE, CLI_TABLE);

    for (id, document) in &documents {
        service
            .put(
                &subject,
                &table,
                id,
                &DocPath::root(),
                &document.to_string(),
                WriteOptions::default(),
            )
            .await?;
    }
    debug!(
        target: "docgate::cli",
        documents = documents.len(),
        "CLI_DOCS_LOADED"
    );

    let response = service.search(&subject, &table, request).await?;
    Ok(response.render(raw))
}

/// Plan description for a filter
pub fn explain(config: &DocsConfig, filter: &str) -> CliResult<Value> {
    let service = DocumentService::new(
        Arc::new(MemoryRowStore::new()),
        Arc::new(AllowAll),
        Arc::new(SystemTimeSource::new()),
        config.clone(),
    )?;
    let plan = service.explain(filter)?;
    Ok(serde_json::to_value(&plan)?)
}
