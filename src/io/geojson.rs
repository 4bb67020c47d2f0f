use geo::{Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde_json::{json, Map, Value};

use crate::{Error, Result};

/// One GeoJSON feature: its geometry (if parseable) and its properties.
#[derive(Debug, Clone)]
pub struct Feature {
    pub geometry: Option<Geometry<f64>>,
    pub properties: Map<String, Value>,
}

impl Feature {
    /// A property as text; numbers and booleans are stringified, objects are serialized.
    pub fn property_str(&self, key: &str) -> Option<String> {
        match self.properties.get(key)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

/// Read all features from GeoJSON bytes (a FeatureCollection, a single
/// Feature, or a bare geometry).
pub fn read_features(bytes: &[u8]) -> Result<Vec<Feature>> {
    let value: Value = serde_json::from_slice(bytes)
        .map_err(|e| Error::Table(format!("[io::geojson] Failed to parse GeoJSON: {e}")))?;

    match value["type"].as_str() {
        Some("FeatureCollection") => value["features"].as_array()
            .ok_or_else(|| Error::Table("[io::geojson] FeatureCollection without features".into()))?
            .iter()
            .map(parse_feature)
            .collect(),
        Some("Feature") => Ok(vec![parse_feature(&value)?]),
        Some(_) => Ok(vec![Feature { geometry: Some(parse_geometry(&value)?), properties: Map::new() }]),
        None => Err(Error::Table("[io::geojson] missing \"type\" member".into())),
    }
}

fn parse_feature(feature: &Value) -> Result<Feature> {
    let geometry = match &feature["geometry"] {
        Value::Null => None,
        geometry => Some(parse_geometry(geometry)?),
    };
    let properties = feature["properties"].as_object().cloned().unwrap_or_default();
    Ok(Feature { geometry, properties })
}

/// Parse a GeoJSON geometry object into a `geo::Geometry`.
pub fn parse_geometry(geometry: &Value) -> Result<Geometry<f64>> {
    let kind = geometry["type"].as_str()
        .ok_or_else(|| Error::Table("[io::geojson] geometry without \"type\"".into()))?;
    if kind == "GeometryCollection" {
        let parts = geometry["geometries"].as_array()
            .ok_or_else(|| Error::Table("[io::geojson] GeometryCollection without geometries".into()))?
            .iter()
            .map(parse_geometry)
            .collect::<Result<Vec<_>>>()?;
        return Ok(Geometry::GeometryCollection(GeometryCollection(parts)))
    }

    let coords = &geometry["coordinates"];
    Ok(match kind {
        "Point" => Geometry::Point(Point(parse_coord(coords)?)),
        "MultiPoint" => Geometry::MultiPoint(MultiPoint(parse_array(coords, |c| parse_coord(c).map(Point))?)),
        "LineString" => Geometry::LineString(parse_line(coords)?),
        "MultiLineString" => Geometry::MultiLineString(MultiLineString(parse_array(coords, parse_line)?)),
        "Polygon" => Geometry::Polygon(parse_polygon(coords)?),
        "MultiPolygon" => Geometry::MultiPolygon(MultiPolygon(parse_array(coords, parse_polygon)?)),
        other => return Err(Error::Table(format!("[io::geojson] unknown geometry type {other}"))),
    })
}

fn parse_array<T>(value: &Value, parse: impl Fn(&Value) -> Result<T>) -> Result<Vec<T>> {
    value.as_array()
        .ok_or_else(|| Error::Table("[io::geojson] expected a coordinate array".into()))?
        .iter()
        .map(parse)
        .collect()
}

fn parse_coord(value: &Value) -> Result<Coord<f64>> {
    match value.as_array().map(Vec::as_slice) {
        Some([x, y, ..]) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => Ok(Coord { x, y }),
            _ => Err(Error::Table("[io::geojson] non-numeric coordinate".into())),
        },
        _ => Err(Error::Table("[io::geojson] coordinate needs two values".into())),
    }
}

fn parse_line(value: &Value) -> Result<LineString<f64>> {
    Ok(LineString(parse_array(value, parse_coord)?))
}

/// `[exterior, hole, hole, ...]`
fn parse_polygon(value: &Value) -> Result<Polygon<f64>> {
    let mut rings = parse_array(value, parse_line)?.into_iter();
    let exterior = rings.next()
        .ok_or_else(|| Error::Table("[io::geojson] polygon without exterior ring".into()))?;
    Ok(Polygon::new(exterior, rings.collect()))
}

/// Write polygons (e.g. hex cell outlines) to GeoJSON bytes, one feature
/// per polygon with the given properties.
pub fn write_polygons(polygons: &[(Polygon<f64>, Map<String, Value>)]) -> Result<Vec<u8>> {
    let ring = |ls: &LineString<f64>| ls.coords().map(|c| vec![c.x, c.y]).collect::<Vec<_>>();
    let features = polygons.iter().map(|(polygon, properties)| {
        let mut rings = vec![ring(polygon.exterior())];
        rings.extend(polygon.interiors().iter().map(ring));
        json!({
            "type": "Feature",
            "geometry": { "type": "Polygon", "coordinates": rings },
            "properties": properties,
        })
    }).collect::<Vec<_>>();

    serde_json::to_vec(&json!({ "type": "FeatureCollection", "features": features }))
        .map_err(|e| Error::Table(format!("[io::geojson] Failed to serialize GeoJSON: {e}")))
}
