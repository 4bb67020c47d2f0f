use std::path::{Path, PathBuf};

use h3o::Resolution;
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::{
    common::sha256_bytes,
    crs::Crs,
    destinations::{CategoryMap, CategorySet, TagFilter},
    hex::LineCoverage,
    origins::TieBreak,
    Error, Result,
};

/// Settings for both pipelines, read from a JSON file. Every field has a
/// default, so a config file only names what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Root of the stage cache (`<root>/origins`, `<root>/destinations`).
    pub resources_root: PathBuf,
    pub h3_resolution: u8,
    /// Resolution of the city boundary cells.
    pub boundary_resolution: u8,
    /// GHSL built-up classification raster.
    pub raster_path: PathBuf,
    /// CRS of the raster, used when the file does not declare one.
    /// `null` requires the file to declare its CRS.
    pub raster_crs: Option<Crs>,
    /// CRS of bounding boxes and of the aggregated raster.
    pub target_crs: Crs,
    pub tie_break: TieBreak,
    /// Seed for tie-breaking; random when unset.
    pub seed: Option<u64>,
    pub line_coverage: LineCoverage,
    pub category_set: CategorySet,
    pub tag_mapping: CategoryMap,
    /// Substrings searched in the tag text of POIs without a structured tag.
    pub healthcare: Vec<String>,
    pub tag_filter: TagFilter,
    /// Degrees added on every side of the city box for the POI query.
    pub poi_bbox_buffer: f64,
    /// Append a hash of this config to cache file names.
    pub fingerprint_cache: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            resources_root: PathBuf::from("resources"),
            h3_resolution: 9,
            boundary_resolution: 12,
            raster_path: PathBuf::new(),
            raster_crs: Some(Crs::mollweide()),
            target_crs: Crs::wgs84(),
            tie_break: TieBreak::default(),
            seed: None,
            line_coverage: LineCoverage::default(),
            category_set: CategorySet::default(),
            tag_mapping: CategoryMap::default(),
            healthcare: Vec::new(),
            tag_filter: TagFilter::default(),
            poi_bbox_buffer: 0.03,
            fingerprint_cache: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(bytes)
            .map_err(|e| Error::Config(format!("[config] Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_json(&bytes)
            .map_err(|e| Error::Config(format!("{} ({})", e, path.display())))
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|e| Error::Config(format!("[config] Failed to serialize config: {e}")))
    }

    /// Resolutions within 0-15, a finite non-negative POI buffer.
    pub fn validate(&self) -> Result<()> {
        self.resolution()?;
        self.boundary_resolution()?;
        if !self.poi_bbox_buffer.is_finite() || self.poi_bbox_buffer < 0.0 {
            return Err(Error::Config(format!("[config] poi_bbox_buffer must be >= 0, got {}", self.poi_bbox_buffer)))
        }
        Ok(())
    }

    /// What the destinations pipeline needs on top of [`validate`](Self::validate).
    pub fn validate_destinations(&self) -> Result<()> {
        self.validate()?;
        if self.category_set.is_empty() {
            return Err(Error::Config("[config] category_set must not be empty".into()))
        }
        Ok(())
    }

    /// What the origins pipeline needs on top of [`validate`](Self::validate).
    pub fn validate_origins(&self) -> Result<()> {
        self.validate()?;
        if self.raster_path.as_os_str().is_empty() {
            return Err(Error::Config("[config] raster_path is not set".into()))
        }
        Ok(())
    }

    pub fn resolution(&self) -> Result<Resolution> {
        Resolution::try_from(self.h3_resolution)
            .map_err(|_| Error::Config(format!("[config] h3_resolution must be 0-15, got {}", self.h3_resolution)))
    }

    pub fn boundary_resolution(&self) -> Result<Resolution> {
        Resolution::try_from(self.boundary_resolution)
            .map_err(|_| Error::Config(format!("[config] boundary_resolution must be 0-15, got {}", self.boundary_resolution)))
    }

    /// Tie-break RNG: seeded when `seed` is set.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// SHA-256 of the serialized config, which includes the input paths.
    pub fn fingerprint(&self) -> Result<String> {
        Ok(sha256_bytes(&serde_json::to_vec(self)
            .map_err(|e| Error::Config(format!("[config] Failed to serialize config: {e}")))?))
    }
}
