//! CSV writing operations.

use std::{fs::File, path::Path};

use polars::{frame::DataFrame, io::SerWriter, prelude::CsvWriter};

use crate::{Error, Result};

/// Write a DataFrame to a CSV file.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("[io::csv::write] Failed to create CSV file {}: {e}", path.display()))))?;
    CsvWriter::new(file)
        .finish(df)
        .map_err(|e| Error::Table(format!("[io::csv::write] Failed to write CSV to {}: {e}", path.display())))
}

/// Write a DataFrame to CSV bytes (for cache entries).
pub(crate) fn write_csv_bytes(df: &mut DataFrame) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    CsvWriter::new(&mut out)
        .finish(df)
        .map_err(|e| Error::Table(format!("[io::csv::write] Failed to write CSV to bytes: {e}")))?;
    Ok(out)
}
