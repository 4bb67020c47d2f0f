//! H3 cell coverage of vector geometries.

mod cells;
mod cover;
mod shape;

pub use cells::{boundary_geojson, cell_polygon, BoundaryCells};
pub use cover::{cover, cover_geometry, LineCoverage};
pub use shape::Shape;

#[doc(no_inline)]
pub use h3o::{CellIndex, Resolution};
