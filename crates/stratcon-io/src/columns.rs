//! Objective-file column ingestion.

use std::path::Path;

use tracing::debug;

use crate::IoError;

/// Reads the header row of an objective CSV into raw variable names.
///
/// The first column cell names a variable just like the rest; rows below
/// the header are coefficient data the builder never looks at. Cells are
/// trimmed and empty ones (stray trailing separators) are dropped. Nothing
/// is validated here: the result is meant to flow through
/// `stratcon_core::lint` before a space is built from it.
pub fn read_variable_columns(path: impl AsRef<Path>) -> Result<Vec<String>, IoError> {
    let mut reader = csv::ReaderBuilder::new()
        .from_path(path.as_ref())
        .map_err(IoError::Read)?;

    let header = reader.headers().map_err(IoError::Read)?;
    let names: Vec<String> = header
        .iter()
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .map(str::to_owned)
        .collect();

    debug!(
        event = "columns_read",
        path = %path.as_ref().display(),
        count = names.len(),
    );
    Ok(names)
}
