use std::path::Path;

use h3o::CellIndex;
use polars::prelude::*;

use crate::{
    common::ensure_parent_exists,
    hex::BoundaryCells,
    io::csv::{column_u64, read_csv, read_csv_bytes, write_csv, write_csv_bytes},
    origins::GhslClass,
    Error, Result,
};

/// One origin: a cell and the winning GHSL class inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OriginRow {
    pub cell: CellIndex,
    pub class: GhslClass,
}

impl OriginRow {
    pub fn residential(&self) -> u8 { self.class.residential() }
}

/// `h3_index,ghsl_code,residential_bool`, one row per cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginsTable {
    rows: Vec<OriginRow>,
}

impl OriginsTable {
    pub const COLUMNS: [&'static str; 3] = ["h3_index", "ghsl_code", "residential_bool"];

    /// Rows must have unique cells.
    pub fn new(rows: Vec<OriginRow>) -> Result<Self> {
        let mut cells = rows.iter().map(|row| row.cell).collect::<Vec<_>>();
        cells.sort_unstable();
        if let Some(dup) = cells.windows(2).find(|w| w[0] == w[1]) {
            return Err(Error::Table(format!("[origins::table] duplicate h3_index {}", dup[0])))
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[OriginRow] { &self.rows }

    pub fn len(&self) -> usize { self.rows.len() }

    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn get(&self, cell: CellIndex) -> Option<&OriginRow> {
        self.rows.iter().find(|row| row.cell == cell)
    }

    /// Keep the rows whose cell lies in `boundary`, comparing at the coarser
    /// of the two resolutions.
    pub fn filter_to_boundary(&self, boundary: &BoundaryCells) -> Self {
        let boundary = match self.rows.first() {
            Some(row) if row.cell.resolution() < boundary.resolution() => boundary.coarsened(row.cell.resolution()),
            _ => boundary.clone(),
        };
        let rows = self.rows.iter()
            .filter(|row| boundary.contains(row.cell))
            .copied()
            .collect();
        Self { rows }
    }

    pub fn to_dataframe(&self) -> Result<DataFrame> {
        Ok(df![
            "h3_index" => self.rows.iter().map(|row| u64::from(row.cell)).collect::<Vec<_>>(),
            "ghsl_code" => self.rows.iter().map(|row| row.class.code() as u32).collect::<Vec<_>>(),
            "residential_bool" => self.rows.iter().map(|row| row.residential() as u32).collect::<Vec<_>>(),
        ]?)
    }

    /// Parse a table; `residential_bool` must agree with `ghsl_code`.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let cells = column_u64(df, "h3_index")?;
        let codes = column_u64(df, "ghsl_code")?;
        let flags = column_u64(df, "residential_bool")?;

        let rows = cells.into_iter().zip(codes).zip(flags)
            .map(|((cell, code), flag)| {
                let cell = CellIndex::try_from(cell)
                    .map_err(|e| Error::Table(format!("[origins::table] bad h3_index {cell}: {e}")))?;
                let class = u8::try_from(code).ok()
                    .and_then(GhslClass::relevant)
                    .ok_or_else(|| Error::Table(format!("[origins::table] ghsl_code {code} is not a built-up class")))?;
                if u64::from(class.residential()) != flag {
                    return Err(Error::Table(format!("[origins::table] residential_bool {flag} disagrees with ghsl_code {code}")))
                }
                Ok(OriginRow { cell, class })
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(rows)
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

impl<'a> IntoIterator for &'a OriginsTable {
    type Item = &'a OriginRow;
    type IntoIter = std::slice::Iter<'a, OriginRow>;

    fn into_iter(self) -> Self::IntoIter { self.rows.iter() }
}
