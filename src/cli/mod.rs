//! CLI module for docgate
//!
//! Provides command-line access to:
//! - decompose: show the row mutations of a write
//! - search: run a search over documents loaded into memory
//! - explain: show the plan for a filter

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{decompose, explain, run, run_command, search};
pub use errors::{CliError, CliResult};
pub use io::{read_input, write_error, write_response};
