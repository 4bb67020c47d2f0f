use ahash::AHashSet;
use geo::{Coord, LineString, Polygon};
use h3o::{CellIndex, Resolution};
use serde_json::{Map, Value};

use crate::{io::geojson::write_polygons, Result};

/// The cells covering a city, with a membership test across resolutions.
#[derive(Debug, Clone)]
pub struct BoundaryCells {
    resolution: Resolution,
    cells: AHashSet<CellIndex>,
}

impl BoundaryCells {
    /// Build from cells at `resolution`. Finer cells are replaced by their
    /// parent at `resolution`; coarser cells are dropped.
    pub fn new(resolution: Resolution, cells: impl IntoIterator<Item = CellIndex>) -> Self {
        let cells = cells.into_iter()
            .filter_map(|cell| cell.parent(resolution))
            .collect();
        Self { resolution, cells }
    }

    pub fn resolution(&self) -> Resolution { self.resolution }

    pub fn len(&self) -> usize { self.cells.len() }

    pub fn is_empty(&self) -> bool { self.cells.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = &CellIndex> { self.cells.iter() }

    /// The same boundary at a coarser resolution: the set of parents.
    /// Returns a clone when `resolution` is not coarser.
    pub fn coarsened(&self, resolution: Resolution) -> Self {
        if resolution >= self.resolution {
            return self.clone()
        }
        Self::new(resolution, self.cells.iter().copied())
    }

    /// Membership compared at the coarser of the two resolutions.
    ///
    /// A finer `cell` is tested through its parent. A coarser `cell` is a
    /// member when any boundary cell descends from it; for repeated coarse
    /// lookups call [`BoundaryCells::coarsened`] once instead.
    pub fn contains(&self, cell: CellIndex) -> bool {
        let res = cell.resolution();
        if res == self.resolution {
            self.cells.contains(&cell)
        } else if res > self.resolution {
            cell.parent(self.resolution).is_some_and(|parent| self.cells.contains(&parent))
        } else {
            self.cells.iter().any(|c| c.parent(res) == Some(cell))
        }
    }
}

impl FromIterator<CellIndex> for BoundaryCells {
    /// Uses the resolution of the first cell; an empty iterator gives an
    /// empty set at resolution 0.
    fn from_iter<I: IntoIterator<Item = CellIndex>>(iter: I) -> Self {
        let mut iter = iter.into_iter().peekable();
        let resolution = iter.peek().map_or(Resolution::Zero, |c| c.resolution());
        Self::new(resolution, iter)
    }
}

/// Outline of one cell as a closed (lng, lat) polygon.
pub fn cell_polygon(cell: CellIndex) -> Polygon<f64> {
    let mut ring = cell.boundary().iter()
        .map(|ll| Coord { x: ll.lng(), y: ll.lat() })
        .collect::<Vec<_>>();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    Polygon::new(LineString(ring), vec![])
}

/// Cell outlines as a GeoJSON FeatureCollection with an `h3_index`
/// property (hex string) per feature.
pub fn boundary_geojson<'a>(cells: impl IntoIterator<Item = &'a CellIndex>) -> Result<Vec<u8>> {
    let mut cells = cells.into_iter().copied().collect::<Vec<_>>();
    cells.sort_unstable();
    cells.dedup();

    let polygons = cells.into_iter().map(|cell| {
        let mut properties = Map::new();
        properties.insert("h3_index".into(), Value::String(cell.to_string()));
        properties.insert("resolution".into(), Value::from(u8::from(cell.resolution())));
        (cell_polygon(cell), properties)
    }).collect::<Vec<_>>();
    write_polygons(&polygons)
}
