//! # Document Assembler
//!
//! Rebuilds JSON documents from clustered rows, with optional projection.

mod assembler;
mod projection;

pub use assembler::Assembler;
pub use projection::Projection;
