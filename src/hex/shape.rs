use geo::{Coord, Geometry, LineString, MapCoords, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};

use crate::Error;

/// The geometry variants the cell coverer handles.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Point(Point<f64>),
    LineString(LineString<f64>),
    Polygon(Polygon<f64>),
    MultiPoint(MultiPoint<f64>),
    MultiLineString(MultiLineString<f64>),
    MultiPolygon(MultiPolygon<f64>),
}

impl Shape {
    pub fn kind(&self) -> &'static str {
        match self {
            Shape::Point(_) => "Point",
            Shape::LineString(_) => "LineString",
            Shape::Polygon(_) => "Polygon",
            Shape::MultiPoint(_) => "MultiPoint",
            Shape::MultiLineString(_) => "MultiLineString",
            Shape::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Swap the x and y of every coordinate, through every ring and part.
    /// Geometry type, ring order, and holes are preserved.
    pub fn swap_xy(&self) -> Shape {
        let swap = |c: Coord<f64>| Coord { x: c.y, y: c.x };
        match self {
            Shape::Point(p) => Shape::Point(p.map_coords(swap)),
            Shape::LineString(ls) => Shape::LineString(ls.map_coords(swap)),
            Shape::Polygon(p) => Shape::Polygon(p.map_coords(swap)),
            Shape::MultiPoint(mp) => Shape::MultiPoint(mp.map_coords(swap)),
            Shape::MultiLineString(ml) => Shape::MultiLineString(ml.map_coords(swap)),
            Shape::MultiPolygon(mp) => Shape::MultiPolygon(mp.map_coords(swap)),
        }
    }
}

/// Name of a geometry variant, for log lines.
pub(crate) fn geometry_kind(geometry: &Geometry<f64>) -> &'static str {
    match geometry {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

impl TryFrom<Geometry<f64>> for Shape {
    type Error = Error;

    fn try_from(geometry: Geometry<f64>) -> Result<Self, Error> {
        match geometry {
            Geometry::Point(p) => Ok(Shape::Point(p)),
            Geometry::LineString(ls) => Ok(Shape::LineString(ls)),
            Geometry::Polygon(p) => Ok(Shape::Polygon(p)),
            Geometry::MultiPoint(mp) => Ok(Shape::MultiPoint(mp)),
            Geometry::MultiLineString(ml) => Ok(Shape::MultiLineString(ml)),
            Geometry::MultiPolygon(mp) => Ok(Shape::MultiPolygon(mp)),
            other => Err(Error::UnsupportedGeometry(geometry_kind(&other))),
        }
    }
}

impl TryFrom<&Geometry<f64>> for Shape {
    type Error = Error;

    fn try_from(geometry: &Geometry<f64>) -> Result<Self, Error> {
        match geometry {
            Geometry::Point(_) | Geometry::LineString(_) | Geometry::Polygon(_)
            | Geometry::MultiPoint(_) | Geometry::MultiLineString(_) | Geometry::MultiPolygon(_) => {
                Shape::try_from(geometry.clone())
            }
            other => Err(Error::UnsupportedGeometry(geometry_kind(other))),
        }
    }
}

impl From<Shape> for Geometry<f64> {
    fn from(shape: Shape) -> Self {
        match shape {
            Shape::Point(p) => p.into(),
            Shape::LineString(ls) => ls.into(),
            Shape::Polygon(p) => p.into(),
            Shape::MultiPoint(mp) => mp.into(),
            Shape::MultiLineString(ml) => ml.into(),
            Shape::MultiPolygon(mp) => mp.into(),
        }
    }
}
