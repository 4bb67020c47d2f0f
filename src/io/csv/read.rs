//! CSV reading operations.

use std::{fs::File, io::Cursor, path::Path};

use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReader, DataType}};

use crate::{Error, Result};

/// Reads a CSV file from `path` into a Polars DataFrame.
pub(crate) fn read_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .map_err(|e| Error::Io(std::io::Error::new(e.kind(), format!("[io::csv::read] Failed to open CSV file {}: {e}", path.display()))))?;
    CsvReader::new(file)
        .finish()
        .map_err(|e| Error::Table(format!("[io::csv::read] Failed to read CSV from {}: {e}", path.display())))
}

/// Read DataFrame from CSV bytes (for cache entries).
pub(crate) fn read_csv_bytes(bytes: &[u8]) -> Result<DataFrame> {
    CsvReader::new(Cursor::new(bytes))
        .finish()
        .map_err(|e| Error::Table(format!("[io::csv::read] Failed to read CSV from bytes: {e}")))
}

/// Read a named column as `u64` values, rejecting nulls.
pub(crate) fn column_u64(df: &DataFrame, name: &str) -> Result<Vec<u64>> {
    let column = df.column(name)
        .map_err(|_| Error::Table(format!("[io::csv::read] missing column {name}")))?
        .cast(&DataType::UInt64)?;
    let values = column.u64()?;
    if values.null_count() > 0 {
        return Err(Error::Table(format!("[io::csv::read] column {name} has null or non-integer values")))
    }
    Ok(values.into_no_null_iter().collect())
}

/// Read a named column as strings, rejecting nulls.
pub(crate) fn column_str(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name)
        .map_err(|_| Error::Table(format!("[io::csv::read] missing column {name}")))?
        .cast(&DataType::String)?;
    let values = column.str()?;
    if values.null_count() > 0 {
        return Err(Error::Table(format!("[io::csv::read] column {name} has null values")))
    }
    Ok(values.into_no_null_iter().map(str::to_string).collect())
}
