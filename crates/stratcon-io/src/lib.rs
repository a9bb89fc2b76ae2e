//! StratCon IO - the CSV boundary
//!
//! Two thin wrappers around the core:
//! - Reading the header row of an objective file into raw variable names
//! - Flattening compiled constraint groups into a solver-ready matrix
//!
//! Everything between those two edges stays in `stratcon-core`; nothing
//! here inspects or validates constraint semantics.

mod columns;
mod export;

pub use columns::read_variable_columns;
pub use export::write_matrix;

use thiserror::Error;

/// Failure at the CSV boundary.
#[derive(Debug, Error)]
pub enum IoError {
    /// The objective file could not be opened or parsed as delimited text.
    #[error("Unable to read objective file: {0}")]
    Read(csv::Error),

    /// A matrix row could not be written.
    #[error("Unable to write export file: {0}")]
    Write(csv::Error),

    /// Flushing the finished export to disk failed.
    #[error("Unable to finish export file: {0}")]
    Flush(std::io::Error),
}
