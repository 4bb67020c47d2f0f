use std::path::Path;

use geo::{BoundingRect, Intersects};
use log::info;

use crate::{
    assemble::{city_boundaries, CityArea, CityGeocoder, PoiSource},
    cache::{CacheCategory, CachePaths, Stage, TableCache},
    config::PipelineConfig,
    destinations::{Categorizer, DestinationsTable},
    Result,
};

/// Builds the destinations table for a set of cities: query POIs around
/// the cities, categorize, and explode to cells.
pub struct DestinationsAssembler<'a, C: TableCache> {
    config: &'a PipelineConfig,
    cache: C,
    categorizer: Categorizer,
}

impl<'a, C: TableCache> DestinationsAssembler<'a, C> {
    pub fn new(config: &'a PipelineConfig, cache: C) -> Result<Self> {
        config.validate_destinations()?;
        let categorizer = Categorizer::new(config.tag_mapping.clone(), config.healthcare.clone());
        Ok(Self { config, cache, categorizer })
    }

    pub fn cache(&self) -> &C { &self.cache }

    pub fn categorizer(&self) -> &Categorizer { &self.categorizer }

    pub fn paths(&self, cities: &[String]) -> Result<CachePaths> {
        let paths = CachePaths::new(CacheCategory::Destinations, cities);
        Ok(match self.config.fingerprint_cache {
            true => paths.with_fingerprint(&self.config.fingerprint()?),
            false => paths,
        })
    }

    pub fn cached(&self, cities: &[String]) -> Result<Option<DestinationsTable>> {
        let paths = self.paths(cities)?;
        match self.cache.get(&paths.key(Stage::Clean))? {
            Some(bytes) => {
                info!("[assemble::destinations] file already exists for {}", paths.stem());
                Ok(Some(DestinationsTable::from_csv_bytes(&bytes)?))
            }
            None => Ok(None),
        }
    }

    pub fn assemble(
        &mut self,
        geocoder: &dyn CityGeocoder,
        source: &dyn PoiSource,
        extract: &Path,
        cities: &[String],
    ) -> Result<DestinationsTable> {
        if let Some(table) = self.cached(cities)? {
            return Ok(table)
        }
        let area = city_boundaries(
            &geocoder.geocode(cities)?,
            self.config.boundary_resolution()?,
            self.config.poi_bbox_buffer,
        )?;
        self.assemble_area(source, extract, cities, &area)
    }

    /// POIs whose geometry touches `area.bbox_pois` are kept.
    pub fn assemble_area(
        &mut self,
        source: &dyn PoiSource,
        extract: &Path,
        cities: &[String],
        area: &CityArea,
    ) -> Result<DestinationsTable> {
        if let Some(table) = self.cached(cities)? {
            return Ok(table)
        }
        let paths = self.paths(cities)?;

        let query_rect = area.bbox_pois.to_rect();
        let mut records = source.query(extract, &self.config.tag_filter)?;
        records.retain(|record| record.geometry.as_ref()
            .and_then(|geometry| geometry.bounding_rect())
            .is_some_and(|rect| rect.intersects(&query_rect)));

        let table = self.categorizer.explode(
            &records,
            self.config.resolution()?,
            self.config.line_coverage,
            &self.config.category_set,
        )?;
        self.cache.put(&paths.key(Stage::Clean), &table.to_csv_bytes()?)?;
        info!("[assemble::destinations] {} destination rows from {} POIs for {}", table.len(), records.len(), paths.stem());
        Ok(table)
    }
}
