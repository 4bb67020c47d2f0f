use log::info;

use crate::{
    assemble::{city_boundaries, CityArea, CityGeocoder},
    cache::{CacheCategory, CachePaths, Stage, TableCache},
    common::{ensure_parent_exists, require_file_exists},
    config::PipelineConfig,
    crs::Crs,
    io::geotiff::GeoTiffInfo,
    origins::{aggregate_raster_file, OriginsTable},
    raster::{crop_raster, reproject_raster},
    Error, Result,
};

/// Builds the origins table for a set of cities: crop, reproject, aggregate,
/// and keep the cells inside the city boundary.
///
/// Raster stages are written under `resources_root`; the final table goes
/// through the cache and is returned verbatim on later calls.
pub struct OriginsAssembler<'a, C: TableCache> {
    config: &'a PipelineConfig,
    cache: C,
}

impl<'a, C: TableCache> OriginsAssembler<'a, C> {
    pub fn new(config: &'a PipelineConfig, cache: C) -> Result<Self> {
        config.validate_origins()?;
        Ok(Self { config, cache })
    }

    pub fn cache(&self) -> &C { &self.cache }

    pub fn paths(&self, cities: &[String]) -> Result<CachePaths> {
        let paths = CachePaths::new(CacheCategory::Origins, cities);
        Ok(match self.config.fingerprint_cache {
            true => paths.with_fingerprint(&self.config.fingerprint()?),
            false => paths,
        })
    }

    /// The cached table for `cities`, if one was stored.
    pub fn cached(&self, cities: &[String]) -> Result<Option<OriginsTable>> {
        let paths = self.paths(cities)?;
        match self.cache.get(&paths.key(Stage::Clean))? {
            Some(bytes) => {
                info!("[assemble::origins] file already exists for {}", paths.stem());
                Ok(Some(OriginsTable::from_csv_bytes(&bytes)?))
            }
            None => Ok(None),
        }
    }

    /// Cached table, or geocode the cities and run the pipeline.
    pub fn assemble(&mut self, geocoder: &dyn CityGeocoder, cities: &[String]) -> Result<OriginsTable> {
        if let Some(table) = self.cached(cities)? {
            return Ok(table)
        }
        let area = city_boundaries(
            &geocoder.geocode(cities)?,
            self.config.boundary_resolution()?,
            self.config.poi_bbox_buffer,
        )?;
        self.assemble_area(cities, &area)
    }

    /// Cached table, or run the pipeline over an already resolved area.
    pub fn assemble_area(&mut self, cities: &[String], area: &CityArea) -> Result<OriginsTable> {
        if let Some(table) = self.cached(cities)? {
            return Ok(table)
        }
        let paths = self.paths(cities)?;
        let table = self.build(&paths, area)?;
        self.cache.put(&paths.key(Stage::Clean), &table.to_csv_bytes()?)?;
        info!("[assemble::origins] {} origin cells for {}", table.len(), paths.stem());
        Ok(table)
    }

    /// CRS the raster is stored in: the one the file declares, else `raster_crs`.
    pub fn native_crs(&self) -> Result<Crs> {
        let config = self.config;
        require_file_exists(&config.raster_path)?;
        GeoTiffInfo::read(&config.raster_path)?.crs
            .or_else(|| config.raster_crs.clone())
            .ok_or_else(|| Error::Crs(format!(
                "[assemble::origins] {} declares no CRS and raster_crs is not set",
                config.raster_path.display(),
            )))
    }

    fn build(&self, paths: &CachePaths, area: &CityArea) -> Result<OriginsTable> {
        let config = self.config;
        let root = &config.resources_root;
        let native_crs = self.native_crs()?;

        let subset = paths.path(root, Stage::Subset);
        ensure_parent_exists(&subset)?;
        crop_raster(&config.raster_path, &subset, &area.bbox, &config.target_crs, &native_crs)?;

        let reprojected = paths.path(root, Stage::Reprojected);
        let transform = reproject_raster(&subset, &config.target_crs, &reprojected)?;

        let mut rng = config.rng();
        let codes = aggregate_raster_file(
            &reprojected, &transform, Some(&config.target_crs),
            config.resolution()?, config.tie_break, &mut rng,
        )?;
        codes.write_csv(&paths.path(root, Stage::Codes))?;

        Ok(codes.filter_to_boundary(&area.cells))
    }
}
