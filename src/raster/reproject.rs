use std::path::Path;

use log::{debug, info};
use ndarray::Array2;

use crate::{
    crs::{Crs, CrsTransformer},
    io::geotiff::{read_geotiff, write_geotiff},
    raster::{GeoTransform, RasterGrid},
    Error, Result,
};

/// Points sampled along each edge of the source outline.
const EDGE_SAMPLES: usize = 21;

/// Destination grid covering a whole source raster in another CRS.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WarpGrid {
    pub transform: GeoTransform,
    pub width: usize,
    pub height: usize,
}

/// Suggest the destination grid for warping `grid` into `dst`.
///
/// The source outline is projected, the destination pixels are square and
/// sized so that the extent diagonal keeps the source's diagonal pixel
/// count, and the size is rounded to whole pixels.
pub fn default_warp_grid(grid: &RasterGrid, dst: &Crs) -> Result<WarpGrid> {
    let fwd = CrsTransformer::new(grid.crs(), dst)?;
    let (w, h) = (grid.width() as f64, grid.height() as f64);

    let steps = (0..EDGE_SAMPLES).map(|i| i as f64 / (EDGE_SAMPLES - 1) as f64);
    let outline = steps.flat_map(|t| [(t * w, 0.0), (t * w, h), (0.0, t * h), (w, t * h)]);

    let (mut xmin, mut ymin) = (f64::INFINITY, f64::INFINITY);
    let (mut xmax, mut ymax) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (col, row) in outline {
        let (x, y) = grid.transform().apply(col, row);
        let Ok((px, py)) = fwd.transform_point(x, y) else { continue };
        xmin = xmin.min(px);
        ymin = ymin.min(py);
        xmax = xmax.max(px);
        ymax = ymax.max(py);
    }

    if !(xmin < xmax && ymin < ymax) {
        return Err(Error::Crs(format!("[raster::reproject] raster outline does not project into {dst}")))
    }

    let diagonal = ((xmax - xmin).powi(2) + (ymax - ymin).powi(2)).sqrt();
    let res = diagonal / (w * w + h * h).sqrt();
    let width = (((xmax - xmin) / res) + 0.5).floor().max(1.0) as usize;
    let height = (((ymax - ymin) / res) + 0.5).floor().max(1.0) as usize;

    Ok(WarpGrid { transform: GeoTransform::north_up(xmin, ymax, res, res), width, height })
}

/// Warp `grid` onto `target` in `dst` with nearest-neighbour sampling.
/// Destination pixels with no source pixel get the nodata value (0 if unset).
pub fn warp(grid: &RasterGrid, dst: &Crs, target: &WarpGrid) -> Result<RasterGrid> {
    let inv = CrsTransformer::new(dst, grid.crs())?;
    let fill = grid.nodata().unwrap_or(0);
    let (src_w, src_h) = (grid.width() as i64, grid.height() as i64);

    let mut data = Array2::from_elem((target.height, target.width), fill);
    for ((row, col), value) in data.indexed_iter_mut() {
        let (x, y) = target.transform.xy(row, col);
        let Ok((sx, sy)) = inv.transform_point(x, y) else { continue };
        let Some((r, c)) = grid.transform().rowcol(sx, sy) else { continue };
        if (0..src_h).contains(&r) && (0..src_w).contains(&c) {
            *value = grid.data()[(r as usize, c as usize)];
        }
    }

    Ok(RasterGrid::new(data, dst.clone(), target.transform, grid.nodata()))
}

/// Reproject a whole raster into `dst` (nearest neighbour; codes are categorical).
pub fn reproject(grid: &RasterGrid, dst: &Crs) -> Result<RasterGrid> {
    let target = default_warp_grid(grid, dst)?;
    debug!("[raster::reproject] {} -> {}: {}x{} pixels", grid.crs(), dst, target.width, target.height);
    warp(grid, dst, &target)
}

/// Reproject the raster at `src` into `dst`, write it to `out`, and return
/// the destination transform for mapping pixels to coordinates.
pub fn reproject_raster(src: &Path, dst: &Crs, out: &Path) -> Result<GeoTransform> {
    let grid = read_geotiff(src, None)?;
    let warped = reproject(&grid, dst)?;
    write_geotiff(&warped, out)?;
    info!("[raster::reproject] {} -> {} ({}) {}x{}", src.display(), out.display(), dst, warped.width(), warped.height());
    Ok(*warped.transform())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wgs84_grid() -> RasterGrid {
        // 4 x 4 pixels of 0.01 degrees over Copenhagen
        let values = vec![
            11, 11, 21, 21,
            11, 11, 21, 21,
            12, 12, 22, 22,
            12, 12, 22, 22,
        ];
        RasterGrid::from_vec(4, 4, values, Crs::wgs84(), GeoTransform::north_up(12.50, 55.70, 0.01, 0.01), Some(0)).unwrap()
    }

    #[test]
    fn reprojected_grid_is_consistent() {
        let merc = Crs::from_epsg(3857).unwrap();
        let out = reproject(&wgs84_grid(), &merc).unwrap();
        assert_eq!(out.crs(), &merc);
        assert_eq!(out.data().dim(), (out.height(), out.width()));
        assert!(out.transform().is_north_up());
    }

    #[test]
    fn nearest_neighbour_keeps_codes() {
        let merc = Crs::from_epsg(3857).unwrap();
        let out = reproject(&wgs84_grid(), &merc).unwrap();
        assert!(out.data().iter().all(|v| [0, 11, 12, 21, 22].contains(v)));
        assert_eq!(out.get(0, 0), Some(11));
        assert_eq!(out.get(out.height() - 1, out.width() - 1), Some(22));
    }

    #[test]
    fn round_trip_footprint_within_one_pixel() {
        let grid = wgs84_grid();
        let merc = Crs::from_epsg(3857).unwrap();
        let back = reproject(&reproject(&grid, &merc).unwrap(), &Crs::wgs84()).unwrap();

        let (a, b) = (grid.bounds(), back.bounds());
        let (px, py) = (back.transform().a.abs(), back.transform().e.abs());
        assert!((a.xmin - b.xmin).abs() <= px && (a.xmax - b.xmax).abs() <= px);
        assert!((a.ymin - b.ymin).abs() <= py && (a.ymax - b.ymax).abs() <= py);
    }
}
