#![doc = "odhex public API"]
mod common;
mod error;
mod io;

pub mod assemble;
pub mod cache;
pub mod config;
pub mod crs;
pub mod destinations;
pub mod hex;
pub mod origins;
pub mod raster;

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use config::PipelineConfig;

#[doc(inline)]
pub use assemble::{CityArea, DestinationsAssembler, OriginsAssembler};

#[doc(inline)]
pub use io::geotiff::{read_geotiff, read_geotiff_window, write_geotiff, GeoTiffInfo};

#[doc(inline)]
pub use io::geojson::{read_features, Feature};
