//! Per-city orchestration of the origins and destinations pipelines.

mod boundary;
mod collab;
mod destinations;
mod origins;

pub use boundary::{city_boundaries, CityArea};
pub use collab::{CityBoundary, CityGeocoder, GeoJsonGeocoder, GeoJsonPoiSource, PoiSource};
pub use destinations::DestinationsAssembler;
pub use origins::OriginsAssembler;
