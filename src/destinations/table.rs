use std::path::Path;

use h3o::CellIndex;
use polars::prelude::*;

use crate::{
    common::ensure_parent_exists,
    io::csv::{column_str, column_u64, read_csv, read_csv_bytes, write_csv, write_csv_bytes},
    Error, Result,
};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DestinationRow {
    pub cell: CellIndex,
    pub category: String,
}

/// `h3_index,category`. A cell may appear many times.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DestinationsTable {
    rows: Vec<DestinationRow>,
}

impl DestinationsTable {
    pub const COLUMNS: [&'static str; 2] = ["h3_index", "category"];

    pub fn new(rows: Vec<DestinationRow>) -> Self { Self { rows } }

    pub fn rows(&self) -> &[DestinationRow] { &self.rows }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn push(&mut self, cell: CellIndex, category: impl Into<String>) {
        self.rows.push(DestinationRow { cell, category: category.into() });
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        Ok(df![
            "h3_index" => self.rows.iter().map(|row| u64::from(row.cell)).collect::<Vec<_>>(),
            "category" => self.rows.iter().map(|row| row.category.as_str()).collect::<Vec<_>>(),
        ]?)
    }

    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let cells = column_u64(df, "h3_index")?;
        let categories = column_str(df, "category")?;
        let rows = cells.into_iter().zip(categories)
            .map(|(cell, category)| {
                let cell = CellIndex::try_from(cell)
                    .map_err(|e| Error::Table(format!("[destinations::table] bad h3_index {cell}: {e}")))?;
                Ok(DestinationRow { cell, category })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { rows })
    }

    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        write_csv_bytes(&mut self.to_dataframe()?)
    }

    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_dataframe(&read_csv_bytes(bytes)?)
    }

    pub fn write_csv(&self, path: &Path) -> Result<()> {
        ensure_parent_exists(path)?;
        write_csv(&mut self.to_dataframe()?, path)
    }

    pub fn read_csv(path: &Path) -> Result<Self> {
        Self::from_dataframe(&read_csv(path)?)
    }
}

impl<'a> IntoIterator for &'a DestinationsTable {
    type Item = &'a DestinationRow;
    type IntoIter = std::slice::Iter<'a, DestinationRow>;

    fn into_iter(self) -> Self::IntoIter { self.rows.iter() }
}
