//! Format-specific reading and writing.
//!
//! - `csv` - origins/destinations tables
//! - `geotiff` - single-band classification rasters
//! - `geojson` - city boundaries, POI features, and cell outlines

pub(crate) mod csv;
pub mod geojson;
pub mod geotiff;
