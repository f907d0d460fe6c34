//! CLI argument definitions using clap
//!
//! Commands:
//! - docgate decompose --id <id> [--path a.b] [--patch]
//! - docgate search --docs <file> [--where <filter>] [--fields <fields>]
//! - docgate explain --where <filter>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// docgate - JSON documents over a wide-column row store
#[derive(Parser, Debug)]
#[command(name = "docgate")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to an engine configuration file; defaults apply when absent
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read a JSON document from stdin and print its row mutations
    Decompose {
        /// Document id the rows belong to
        #[arg(long, default_value = "doc")]
        id: String,

        /// Dotted sub-path the document is written at
        #[arg(long)]
        path: Option<String>,

        /// Merge into the existing value instead of replacing it
        #[arg(long)]
        patch: bool,
    },

    /// Load documents into a memory store and run one search page
    Search {
        /// JSON file holding an object of id to document
        #[arg(long)]
        docs: PathBuf,

        /// JSON filter
        #[arg(long = "where")]
        filter: Option<String>,

        /// JSON array of dotted field paths
        #[arg(long)]
        fields: Option<String>,

        #[arg(long)]
        page_size: Option<usize>,

        #[arg(long)]
        page_state: Option<String>,

        /// Print the bare documents instead of the envelope
        #[arg(long)]
        raw: bool,
    },

    /// Describe how a filter would be executed
    Explain {
        /// JSON filter
        #[arg(long = "where")]
        filter: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
