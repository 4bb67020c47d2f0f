use h3o::Resolution;
use log::debug;

use crate::{
    destinations::{Category, CategoryMap, CategorySet, DestinationsTable, PoiRecord},
    hex::{cover_geometry, LineCoverage},
    Result,
};

/// Free-text fallback searched after the healthcare terms.
const SPORT: &str = "sport";

/// Maps POI records to categories and explodes them to one row per cell.
#[derive(Debug, Clone, Default)]
pub struct Categorizer {
    mapping: CategoryMap,
    healthcare: Vec<String>,
}

impl Categorizer {
    pub fn new(mapping: CategoryMap, healthcare: Vec<String>) -> Self {
        Self { mapping, healthcare }
    }

    pub fn mapping(&self) -> &CategoryMap { &self.mapping }

    pub fn healthcare(&self) -> &[String] { &self.healthcare }

    /// First of `amenity`, `shop`, `leisure` that is set; failing that, the
    /// first healthcare term found in the tag text, then `"sport"`.
    pub fn raw_type<'a>(&'a self, record: &'a PoiRecord) -> Option<&'a str> {
        ["amenity", "shop", "leisure"].into_iter()
            .find_map(|key| record.column(key))
            .or_else(|| {
                let tags = record.tags.as_deref()?;
                self.healthcare.iter()
                    .map(String::as_str)
                    .find(|term| tags.contains(term))
                    .or_else(|| tags.contains(SPORT).then_some(SPORT))
            })
    }

    pub fn categorize(&self, record: &PoiRecord) -> Option<Category> {
        self.raw_type(record).map(|raw| self.mapping.resolve(raw))
    }

    /// One row per (record, covering cell) whose category is in `keep`.
    /// Records with no category, no geometry, or an unsupported geometry
    /// contribute nothing. Rows are not deduplicated.
    pub fn explode(
        &self,
        records: &[PoiRecord],
        resolution: Resolution,
        lines: LineCoverage,
        keep: &CategorySet,
    ) -> Result<DestinationsTable> {
        let mut table = DestinationsTable::default();
        let (mut dropped, mut uncategorized) = (0usize, 0usize);

        for record in records {
            let Some(category) = self.categorize(record) else {
                uncategorized += 1;
                continue
            };
            if !keep.retains(&category) {
                dropped += 1;
                continue
            }
            let Some(geometry) = &record.geometry else { continue };
            for cell in cover_geometry(geometry, resolution, lines)? {
                table.push(cell, category.name());
            }
        }

        debug!("[destinations::categorize] {} records -> {} rows ({uncategorized} uncategorized, {dropped} outside the category set)",
            records.len(), table.len());
        Ok(table)
    }
}
