mod affine;
mod grid;
mod reproject;
mod window;

pub use affine::GeoTransform;
pub use grid::RasterGrid;
pub use reproject::{default_warp_grid, reproject, reproject_raster, warp, WarpGrid};
pub use window::{crop_raster, Window};
