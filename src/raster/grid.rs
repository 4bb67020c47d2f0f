use ndarray::{s, Array2};

use crate::{crs::{BoundingBox, Crs}, raster::{GeoTransform, Window}, Error, Result};

/// A single-band raster of classification codes.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterGrid {
    data: Array2<u8>, // rows x cols
    crs: Crs,
    transform: GeoTransform,
    nodata: Option<u8>,
}

impl RasterGrid {
    pub fn new(data: Array2<u8>, crs: Crs, transform: GeoTransform, nodata: Option<u8>) -> Self {
        Self { data, crs, transform, nodata }
    }

    /// Build from a row-major buffer.
    pub fn from_vec(width: usize, height: usize, values: Vec<u8>, crs: Crs, transform: GeoTransform, nodata: Option<u8>) -> Result<Self> {
        let data = Array2::from_shape_vec((height, width), values)
            .map_err(|e| Error::Raster(format!("[raster::grid] buffer does not match {width}x{height}: {e}")))?;
        Ok(Self::new(data, crs, transform, nodata))
    }

    pub fn data(&self) -> &Array2<u8> { &self.data }

    pub fn crs(&self) -> &Crs { &self.crs }

    pub fn transform(&self) -> &GeoTransform { &self.transform }

    pub fn nodata(&self) -> Option<u8> { self.nodata }

    pub fn width(&self) -> usize { self.data.ncols() }

    pub fn height(&self) -> usize { self.data.nrows() }

    pub fn get(&self, row: usize, col: usize) -> Option<u8> { self.data.get((row, col)).copied() }

    /// Replace the transform, e.g. with one computed by the reprojector.
    pub fn with_transform(mut self, transform: GeoTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Geographic footprint in the raster's own CRS.
    pub fn bounds(&self) -> BoundingBox {
        let (w, s, e, n) = self.transform.bounds(self.width(), self.height());
        BoundingBox::new(w, s, e, n, self.crs.clone())
    }

    /// Whole-raster window, for intersecting requested windows against.
    pub fn extent(&self) -> Window {
        Window { col_off: 0, row_off: 0, width: self.width(), height: self.height() }
    }

    /// Copy of the pixels inside `window` with the window's transform.
    /// CRS and nodata are inherited.
    pub fn crop(&self, window: &Window) -> Result<Self> {
        let window = window.intersection(&self.extent())
            .ok_or_else(|| Error::Bounds(format!("[raster::grid] window {window:?} lies outside the {}x{} raster", self.width(), self.height())))?;
        let data = self.data
            .slice(s![window.row_off..window.row_end(), window.col_off..window.col_end()])
            .to_owned();
        Ok(Self::new(data, self.crs.clone(), self.transform.window_transform(&window), self.nodata))
    }
}
