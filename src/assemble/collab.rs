use std::path::{Path, PathBuf};

use geo::Geometry;
use log::debug;

use crate::{
    destinations::{PoiRecord, TagFilter},
    io::geojson::{read_features, Feature},
    Error, Result,
};

/// A named city outline in (lng, lat) degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct CityBoundary {
    pub name: String,
    pub geometry: Geometry<f64>,
}

/// Resolves city names to their outlines.
pub trait CityGeocoder {
    fn geocode(&self, cities: &[String]) -> Result<Vec<CityBoundary>>;
}

/// Extracts points of interest from a map-data extract.
pub trait PoiSource {
    fn query(&self, extract: &Path, filter: &TagFilter) -> Result<Vec<PoiRecord>>;
}

/// Geocoder over a GeoJSON file of city features with a `name` property.
#[derive(Debug, Clone)]
pub struct GeoJsonGeocoder {
    path: PathBuf,
}

impl GeoJsonGeocoder {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }

    pub fn path(&self) -> &Path { &self.path }
}

impl CityGeocoder for GeoJsonGeocoder {
    /// One boundary per requested city, in request order. Names compare
    /// case-insensitively; a missing city is an error.
    fn geocode(&self, cities: &[String]) -> Result<Vec<CityBoundary>> {
        let features = read_features(&std::fs::read(&self.path)?)?;
        cities.iter().map(|city| {
            features.iter()
                .find_map(|feature| {
                    let name = feature.property_str("name")?;
                    let geometry = feature.geometry.clone()?;
                    name.eq_ignore_ascii_case(city.trim()).then(|| CityBoundary { name, geometry })
                })
                .ok_or_else(|| Error::Table(format!("[assemble::collab] city {city:?} not found in {}", self.path.display())))
        }).collect()
    }
}

/// POI source over GeoJSON extracts whose features carry `amenity`,
/// `shop`, `leisure`, and `tags` properties.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoJsonPoiSource;

impl GeoJsonPoiSource {
    fn record(feature: Feature) -> PoiRecord {
        PoiRecord {
            amenity: feature.property_str("amenity"),
            shop: feature.property_str("shop"),
            leisure: feature.property_str("leisure"),
            tags: feature.property_str("tags"),
            geometry: feature.geometry,
        }
    }
}

impl PoiSource for GeoJsonPoiSource {
    fn query(&self, extract: &Path, filter: &TagFilter) -> Result<Vec<PoiRecord>> {
        let features = read_features(&std::fs::read(extract)?)?;
        let total = features.len();
        let records = features.into_iter()
            .map(Self::record)
            .filter(|record| filter.matches(record))
            .collect::<Vec<_>>();
        debug!("[assemble::collab] {} of {total} features in {} match the tag filter", records.len(), extract.display());
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CITIES: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"name": "Copenhagen"},
         "geometry": {"type": "Polygon", "coordinates": [[[12.5, 55.6], [12.6, 55.6], [12.6, 55.7], [12.5, 55.6]]]}},
        {"type": "Feature", "properties": {"name": "Aarhus"},
         "geometry": {"type": "Point", "coordinates": [10.2, 56.15]}}
    ]}"#;

    const POIS: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"amenity": "cafe"}, "geometry": {"type": "Point", "coordinates": [12.55, 55.65]}},
        {"type": "Feature", "properties": {"amenity": "bench"}, "geometry": {"type": "Point", "coordinates": [12.56, 55.66]}},
        {"type": "Feature", "properties": {"tags": {"healthcare": "doctor"}}, "geometry": {"type": "Point", "coordinates": [12.57, 55.67]}}
    ]}"#;

    #[test]
    fn geocoder_matches_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cities.geojson");
        std::fs::write(&path, CITIES).unwrap();

        let geocoder = GeoJsonGeocoder::new(&path);
        let found = geocoder.geocode(&["aarhus".into(), "Copenhagen".into()]).unwrap();
        assert_eq!(found.iter().map(|b| b.name.as_str()).collect::<Vec<_>>(), ["Aarhus", "Copenhagen"]);
        assert!(geocoder.geocode(&["Odense".into()]).is_err());
    }

    #[test]
    fn poi_source_applies_the_filter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pois.geojson");
        std::fs::write(&path, POIS).unwrap();

        let filter = TagFilter::new().with("amenity", ["cafe"]).with("healthcare", Vec::<String>::new());
        let records = GeoJsonPoiSource.query(&path, &filter).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].amenity.as_deref(), Some("cafe"));
        assert!(records[1].tags.as_deref().is_some_and(|t| t.contains("doctor")));
    }
}
