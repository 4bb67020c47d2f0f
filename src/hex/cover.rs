use geo::{Coord, Geometry, LineString, Polygon};
use h3o::{geom::{ContainmentMode, TilerBuilder}, CellIndex, LatLng, Resolution};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{hex::Shape, Error, Result};

/// How a line string is turned into cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCoverage {
    /// Grid path from the first vertex's cell to the last vertex's cell.
    #[default]
    Endpoints,
    /// Grid paths chained through every vertex.
    Vertices,
}

/// Cells covering `shape`, whose coordinates are in (lng, lat) order.
///
/// Axes are swapped once up front; after that every coordinate reads
/// `x = lat, y = lng`, the order the grid library takes.
pub fn cover(shape: &Shape, resolution: Resolution, lines: LineCoverage) -> Result<Vec<CellIndex>> {
    match shape.swap_xy() {
        Shape::Point(p) => Ok(vec![cell_at(p.0, resolution)?]),
        Shape::MultiPoint(mp) => mp.iter().map(|p| cell_at(p.0, resolution)).collect(),
        Shape::LineString(ls) => line_cells(&ls, resolution, lines),
        Shape::MultiLineString(ml) => flatten(ml.iter().map(|ls| line_cells(ls, resolution, lines))),
        Shape::Polygon(poly) => polygon_cells(&poly, resolution),
        Shape::MultiPolygon(mp) => flatten(mp.iter().map(|poly| polygon_cells(poly, resolution))),
    }
}

/// Batch entry point over arbitrary geometries: unsupported variants are
/// logged and produce no cells.
pub fn cover_geometry(geometry: &Geometry<f64>, resolution: Resolution, lines: LineCoverage) -> Result<Vec<CellIndex>> {
    match Shape::try_from(geometry) {
        Ok(shape) => cover(&shape, resolution, lines),
        Err(Error::UnsupportedGeometry(kind)) => {
            warn!("[hex::cover] unimplemented geom type: {kind}, skipping");
            Ok(Vec::new())
        }
        Err(e) => Err(e),
    }
}

fn flatten(parts: impl Iterator<Item = Result<Vec<CellIndex>>>) -> Result<Vec<CellIndex>> {
    let mut cells = Vec::new();
    for part in parts {
        cells.extend(part?);
    }
    Ok(cells)
}

/// `c` is already swapped: `x = lat, y = lng`.
fn lat_lng(c: Coord<f64>) -> Result<LatLng> {
    LatLng::new(c.x, c.y)
        .map_err(|e| Error::Coordinate(format!("[hex::cover] ({}, {}): {e}", c.x, c.y)))
}

fn cell_at(c: Coord<f64>, resolution: Resolution) -> Result<CellIndex> {
    Ok(lat_lng(c)?.to_cell(resolution))
}

/// Grid path between two cells, inclusive. Falls back to the endpoints when
/// no path can be computed (pentagons, or cells too far apart).
fn grid_path(from: CellIndex, to: CellIndex) -> Vec<CellIndex> {
    let path = from.grid_path_cells(to)
        .and_then(|cells| cells.collect::<std::result::Result<Vec<_>, _>>());
    match path {
        Ok(cells) => cells,
        Err(e) => {
            warn!("[hex::cover] no grid path from {from} to {to} ({e}), keeping endpoints");
            if from == to { vec![from] } else { vec![from, to] }
        }
    }
}

fn line_cells(line: &LineString<f64>, resolution: Resolution, policy: LineCoverage) -> Result<Vec<CellIndex>> {
    let (Some(&first), Some(&last)) = (line.0.first(), line.0.last()) else { return Ok(Vec::new()) };

    match policy {
        LineCoverage::Endpoints => Ok(grid_path(cell_at(first, resolution)?, cell_at(last, resolution)?)),
        LineCoverage::Vertices => {
            let mut vertices = line.coords()
                .map(|&c| cell_at(c, resolution))
                .collect::<Result<Vec<_>>>()?;
            vertices.dedup();

            let mut cells = vec![vertices[0]];
            for pair in vertices.windows(2) {
                // each path starts on the previous path's last cell
                cells.extend(grid_path(pair[0], pair[1]).into_iter().skip(1));
            }
            Ok(cells)
        }
    }
}

/// Polyfill with centroid containment. The tiler wants (lng, lat) degrees,
/// so the already swapped ring coordinates are validated and put back.
fn polygon_cells(polygon: &Polygon<f64>, resolution: Resolution) -> Result<Vec<CellIndex>> {
    if polygon.exterior().0.is_empty() {
        return Ok(Vec::new())
    }

    let ring = |ls: &LineString<f64>| -> Result<LineString<f64>> {
        ls.coords()
            .map(|&c| lat_lng(c).map(|ll| Coord { x: ll.lng(), y: ll.lat() }))
            .collect::<Result<Vec<_>>>()
            .map(LineString)
    };
    let polygon = Polygon::new(
        ring(polygon.exterior())?,
        polygon.interiors().iter().map(ring).collect::<Result<_>>()?,
    );

    let mut tiler = TilerBuilder::new(resolution)
        .containment_mode(ContainmentMode::ContainsCentroid)
        .build();
    tiler.add(polygon)
        .map_err(|e| Error::Coordinate(format!("[hex::cover] invalid polygon: {e}")))?;
    Ok(tiler.into_coverage().collect())
}

#[cfg(test)]
mod tests {
    use geo::{line_string, point, polygon, Contains, GeometryCollection, MultiPoint, MultiPolygon, Point};

    use super::*;

    const RES: Resolution = Resolution::Nine;

    fn centre(cell: CellIndex) -> Point<f64> {
        let ll = LatLng::from(cell);
        Point::new(ll.lng(), ll.lat())
    }

    fn square() -> Polygon<f64> {
        polygon![
            (x: 12.50, y: 55.65), (x: 12.60, y: 55.65), (x: 12.60, y: 55.72), (x: 12.50, y: 55.72), (x: 12.50, y: 55.65),
        ]
    }

    #[test]
    fn point_is_one_cell() {
        let cells = cover(&Shape::Point(point!(x: 12.5683, y: 55.6761)), RES, LineCoverage::default()).unwrap();
        let expected = LatLng::new(55.6761, 12.5683).unwrap().to_cell(RES);
        assert_eq!(cells, vec![expected]);
    }

    #[test]
    fn polygon_cell_centres_are_inside() {
        let poly = square();
        let cells = cover(&Shape::Polygon(poly.clone()), RES, LineCoverage::default()).unwrap();
        assert!(cells.len() > 10);
        for cell in &cells {
            assert!(poly.contains(&centre(*cell)), "centre of {cell} outside polygon");
        }
    }

    #[test]
    fn holes_are_excluded() {
        let hole = line_string![
            (x: 12.53, y: 55.67), (x: 12.57, y: 55.67), (x: 12.57, y: 55.70), (x: 12.53, y: 55.70), (x: 12.53, y: 55.67),
        ];
        let donut = Polygon::new(square().exterior().clone(), vec![hole.clone()]);
        let full = cover(&Shape::Polygon(square()), RES, LineCoverage::default()).unwrap();
        let cells = cover(&Shape::Polygon(donut.clone()), RES, LineCoverage::default()).unwrap();

        assert!(cells.len() < full.len());
        let hole = Polygon::new(hole, vec![]);
        assert!(cells.iter().all(|c| !hole.contains(&centre(*c))));
    }

    #[test]
    fn line_is_a_grid_path_between_endpoints() {
        let line = line_string![(x: 12.50, y: 55.65), (x: 12.70, y: 55.90), (x: 12.55, y: 55.68)];
        let cells = cover(&Shape::LineString(line), RES, LineCoverage::Endpoints).unwrap();

        let a = LatLng::new(55.65, 12.50).unwrap().to_cell(RES);
        let b = LatLng::new(55.68, 12.55).unwrap().to_cell(RES);
        assert_eq!(cells.first(), Some(&a));
        assert_eq!(cells.last(), Some(&b));
        assert_eq!(cells.len() as i32, a.grid_distance(b).unwrap() + 1);
    }

    #[test]
    fn vertex_coverage_passes_through_every_vertex() {
        let line = line_string![(x: 12.50, y: 55.65), (x: 12.60, y: 55.75), (x: 12.55, y: 55.68)];
        let cells = cover(&Shape::LineString(line.clone()), RES, LineCoverage::Vertices).unwrap();
        let endpoints = cover(&Shape::LineString(line), RES, LineCoverage::Endpoints).unwrap();

        let detour = LatLng::new(55.75, 12.60).unwrap().to_cell(RES);
        assert!(cells.contains(&detour));
        assert!(cells.len() > endpoints.len());
        assert!(cells.windows(2).all(|w| w[0] != w[1]));
    }

    #[test]
    fn multi_parts_are_concatenated() {
        let mp = MultiPoint(vec![point!(x: 12.5, y: 55.7), point!(x: 12.5, y: 55.7)]);
        let cells = cover(&Shape::MultiPoint(mp), RES, LineCoverage::default()).unwrap();
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0], cells[1]);

        let single = cover(&Shape::Polygon(square()), RES, LineCoverage::default()).unwrap();
        let double = cover(&Shape::MultiPolygon(MultiPolygon(vec![square(), square()])), RES, LineCoverage::default()).unwrap();
        assert_eq!(double.len(), 2 * single.len());
    }

    #[test]
    fn unsupported_geometry_yields_nothing() {
        let gc = Geometry::GeometryCollection(GeometryCollection(vec![Geometry::Point(point!(x: 12.5, y: 55.7))]));
        assert!(cover_geometry(&gc, RES, LineCoverage::default()).unwrap().is_empty());
    }

    #[test]
    fn invalid_coordinates_fail() {
        let bad = Shape::Point(point!(x: f64::NAN, y: 55.7));
        assert!(matches!(cover(&bad, RES, LineCoverage::default()), Err(Error::Coordinate(_))));
    }
}
