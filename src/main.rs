//! docgate CLI entry point
//!
//! Parsing, dispatch and output all live in the CLI module; this only maps
//! failure to a non-zero exit.

use docgate::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
