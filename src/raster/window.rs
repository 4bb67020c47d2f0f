use std::path::Path;

use log::{debug, info};

use crate::{
    crs::{reproject_bbox, BoundingBox, Crs},
    io::geotiff::{read_geotiff_window, write_geotiff, GeoTiffInfo},
    raster::GeoTransform,
    Error, Result,
};

/// A rectangular block of pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub col_off: usize,
    pub row_off: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    pub fn col_end(&self) -> usize { self.col_off + self.width }

    pub fn row_end(&self) -> usize { self.row_off + self.height }

    pub fn is_empty(&self) -> bool { self.width == 0 || self.height == 0 }

    /// Overlap of two windows, `None` if they share no pixel.
    pub fn intersection(&self, other: &Window) -> Option<Window> {
        let col_off = self.col_off.max(other.col_off);
        let row_off = self.row_off.max(other.row_off);
        let col_end = self.col_end().min(other.col_end());
        let row_end = self.row_end().min(other.row_end());
        (col_end > col_off && row_end > row_off)
            .then(|| Window { col_off, row_off, width: col_end - col_off, height: row_end - row_off })
    }

    /// Pixel window covering `bbox` (already in the raster's CRS), clipped to
    /// a `width x height` raster. Offsets are floored and far edges ceiled,
    /// so the window covers the box to within one pixel per side.
    pub fn from_bounds(bbox: &BoundingBox, transform: &GeoTransform, width: usize, height: usize) -> Result<Window> {
        let b = bbox.normalized();
        let corners = [(b.xmin, b.ymin), (b.xmin, b.ymax), (b.xmax, b.ymin), (b.xmax, b.ymax)];

        let (mut col_min, mut row_min) = (f64::INFINITY, f64::INFINITY);
        let (mut col_max, mut row_max) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (x, y) in corners {
            let (col, row) = transform.invert(x, y)
                .ok_or_else(|| Error::Raster("[raster::window] raster transform is not invertible".into()))?;
            col_min = col_min.min(col);
            row_min = row_min.min(row);
            col_max = col_max.max(col);
            row_max = row_max.max(row);
        }

        // Snap values that are integral up to float noise before rounding outward.
        let snap = |v: f64| if (v - v.round()).abs() < 1e-6 { v.round() } else { v };
        let col_start = snap(col_min).floor().max(0.0);
        let row_start = snap(row_min).floor().max(0.0);
        let col_stop = snap(col_max).ceil().min(width as f64);
        let row_stop = snap(row_max).ceil().min(height as f64);

        if col_stop <= col_start || row_stop <= row_start {
            return Err(Error::Bounds(format!(
                "[raster::window] bounding box ({}, {}, {}, {}) in {} lies outside the {width}x{height} raster",
                b.xmin, b.ymin, b.xmax, b.ymax, b.crs,
            )))
        }

        Ok(Window {
            col_off: col_start as usize,
            row_off: row_start as usize,
            width: (col_stop - col_start) as usize,
            height: (row_stop - row_start) as usize,
        })
    }
}

/// Crop the raster at `src` to `bbox` (given in `bbox_crs`) and write the
/// subset to `out`. `native_crs` is the CRS the raster is stored in.
/// Only the strips or tiles overlapping the window are decoded.
pub fn crop_raster(src: &Path, out: &Path, bbox: &BoundingBox, bbox_crs: &Crs, native_crs: &Crs) -> Result<Window> {
    let bbox = BoundingBox { crs: bbox_crs.clone(), ..bbox.clone() };
    let native_bbox = reproject_bbox(&bbox, native_crs)?;

    let info = GeoTiffInfo::read(src)?;
    let window = Window::from_bounds(&native_bbox, &info.transform, info.width, info.height)?;
    debug!("[raster::window] {} -> window {:?}", src.display(), window);

    let subset = read_geotiff_window(src, &window, Some(native_crs))?;
    write_geotiff(&subset, out)?;

    info!("[raster::window] cropped {} to {}x{} pixels -> {}", src.display(), window.width, window.height, out.display());
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform() -> GeoTransform { GeoTransform::north_up(0.0, 100.0, 10.0, 10.0) }

    #[test]
    fn window_from_exact_bounds() {
        let bbox = BoundingBox::new(20.0, 50.0, 60.0, 80.0, Crs::wgs84());
        let w = Window::from_bounds(&bbox, &transform(), 10, 10).unwrap();
        assert_eq!(w, Window { col_off: 2, row_off: 2, width: 4, height: 3 });
    }

    #[test]
    fn window_rounds_outward() {
        let bbox = BoundingBox::new(25.0, 55.0, 55.0, 75.0, Crs::wgs84());
        let w = Window::from_bounds(&bbox, &transform(), 10, 10).unwrap();
        assert_eq!(w, Window { col_off: 2, row_off: 2, width: 4, height: 3 });
    }

    #[test]
    fn window_is_clipped() {
        let bbox = BoundingBox::new(-50.0, 50.0, 30.0, 150.0, Crs::wgs84());
        let w = Window::from_bounds(&bbox, &transform(), 10, 10).unwrap();
        assert_eq!(w, Window { col_off: 0, row_off: 0, width: 3, height: 5 });
    }

    #[test]
    fn window_outside_is_bounds_error() {
        let bbox = BoundingBox::new(200.0, 50.0, 300.0, 80.0, Crs::wgs84());
        assert!(matches!(Window::from_bounds(&bbox, &transform(), 10, 10), Err(Error::Bounds(msg)) if msg.starts_with("[raster::window]")));
    }

    #[test]
    fn intersection() {
        let a = Window { col_off: 0, row_off: 0, width: 4, height: 4 };
        let b = Window { col_off: 2, row_off: 3, width: 4, height: 4 };
        assert_eq!(a.intersection(&b), Some(Window { col_off: 2, row_off: 3, width: 2, height: 1 }));
        let c = Window { col_off: 4, row_off: 0, width: 1, height: 1 };
        assert_eq!(a.intersection(&c), None);
    }
}
